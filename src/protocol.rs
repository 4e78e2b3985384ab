//! TPI wire vocabulary
//!
//! Opcodes, register addresses and fixed constants defined by the
//! target's Tiny Programming Interface specification. These are literal
//! protocol values, not discovered at runtime.

use bitflags::bitflags;

// Serial memory access opcodes
/// Load data byte, pointer unchanged
pub const SLD: u8 = 0x20;
/// Load data byte, post-increment pointer
pub const SLD_PI: u8 = 0x24;
/// Store data byte, pointer unchanged
pub const SST: u8 = 0x60;
/// Store data byte, post-increment pointer
pub const SST_PI: u8 = 0x64;
/// Serial key: unlocks NVM programming, followed by the 8-byte key
pub const SKEY: u8 = 0xE0;

/// Store to pointer register byte `idx` (0 = low, 1 = high)
pub const fn sstpr(idx: u8) -> u8 {
    0x68 | (idx & 0x01)
}

/// Serial in: load from I/O space address `addr`
pub const fn sin(addr: u8) -> u8 {
    0x10 | ((addr << 1) & 0x60) | (addr & 0x0F)
}

/// Serial out: store to I/O space address `addr`
pub const fn sout(addr: u8) -> u8 {
    0x90 | ((addr << 1) & 0x60) | (addr & 0x0F)
}

/// Load from control/status space register `reg`
pub const fn sldcs(reg: u8) -> u8 {
    0x80 | (reg & 0x0F)
}

/// Store to control/status space register `reg`
pub const fn sstcs(reg: u8) -> u8 {
    0xC0 | (reg & 0x0F)
}

/// Control/status space registers (`SLDCS`/`SSTCS` address space)
pub mod reg {
    /// Status register
    pub const TPISR: u8 = 0x00;
    /// Physical layer control register (guard time)
    pub const TPIPCR: u8 = 0x02;
    /// Identification register
    pub const TPIIR: u8 = 0x0F;
}

/// I/O space registers (`SIN`/`SOUT` address space)
pub mod io {
    /// NVM control and status register
    pub const NVMCSR: u8 = 0x32;
    /// NVM command register
    pub const NVMCMD: u8 = 0x33;
}

/// NVM command register values
pub mod nvm_cmd {
    /// No operation
    pub const NOP: u8 = 0x00;
    /// Erase the entire NVM
    pub const CHIP_ERASE: u8 = 0x10;
    /// Erase one section
    pub const SECTION_ERASE: u8 = 0x14;
    /// Write one word
    pub const WORD_WRITE: u8 = 0x1D;
}

/// Guard time selections for TPIPCR
///
/// The value picks how many idle bits the target inserts when the line
/// changes direction.
pub mod guard_time {
    /// 128 idle bits (reset default)
    pub const GT_128B: u8 = 0x00;
    /// 64 idle bits
    pub const GT_64B: u8 = 0x01;
    /// 32 idle bits
    pub const GT_32B: u8 = 0x02;
    /// 16 idle bits
    pub const GT_16B: u8 = 0x03;
    /// 8 idle bits
    pub const GT_8B: u8 = 0x04;
    /// 4 idle bits
    pub const GT_4B: u8 = 0x05;
    /// 2 idle bits
    pub const GT_2B: u8 = 0x06;
    /// No additional idle bits
    pub const GT_0B: u8 = 0x07;
}

/// Value read from TPIIR on a functional link
pub const IDENT_CODE: u8 = 0x80;

/// The fixed NVM unlock key, in wire order, as sent after [`SKEY`]
pub const SKEY_VALUE: [u8; 8] = [0xFF, 0x88, 0xD8, 0xCD, 0x45, 0xAB, 0x89, 0x12];

/// Maximum identification/status attempts during program enable
pub const MAX_CONNECT_ATTEMPTS: u32 = 10;

/// Maximum NVMCSR reads while waiting for an NVM operation to finish
pub const MAX_BUSY_POLLS: u32 = 50;

bitflags! {
    /// TPI status register (TPISR) bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct TpiStatus: u8 {
        /// NVM programming is enabled
        const NVMEN = 0x02;
    }
}

bitflags! {
    /// NVM control/status register (NVMCSR) bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct NvmStatus: u8 {
        /// An NVM operation is in progress
        const BUSY = 0x80;
    }
}

/// Fixed protocol constants used by the handshake and NVM operations
///
/// The defaults are the values from the target's protocol specification;
/// tests and unusual targets can substitute their own table. The engine
/// never mutates it.
#[derive(Debug, Clone)]
pub struct TpiConstants {
    /// Expected TPIIR contents
    pub ident_code: u8,
    /// NVM unlock key, transmitted after the SKEY opcode
    pub skey: [u8; 8],
    /// Guard time selection stored to TPIPCR during program enable
    pub guard_time: u8,
}

impl Default for TpiConstants {
    fn default() -> Self {
        Self {
            ident_code: IDENT_CODE,
            skey: SKEY_VALUE,
            guard_time: guard_time::GT_2B,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opcode_encodings_match_wire_values() {
        assert_eq!(sin(io::NVMCSR), 0x72);
        assert_eq!(sout(io::NVMCMD), 0xF3);
        assert_eq!(sldcs(reg::TPIIR), 0x8F);
        assert_eq!(sldcs(reg::TPISR), 0x80);
        assert_eq!(sstcs(reg::TPIPCR), 0xC2);
        assert_eq!(sstpr(0), 0x68);
        assert_eq!(sstpr(1), 0x69);
    }

    #[test]
    fn default_constants() {
        let c = TpiConstants::default();
        assert_eq!(c.ident_code, 0x80);
        assert_eq!(c.guard_time, 0x06);
        assert_eq!(c.skey, [0xFF, 0x88, 0xD8, 0xCD, 0x45, 0xAB, 0x89, 0x12]);
    }
}
