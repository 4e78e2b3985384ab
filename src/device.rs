//! TPI device engine
//!
//! Owns a [`Transport`] and drives the whole programming session over
//! it: link bring-up, the generic command channel, the program-enable
//! handshake with break recovery, and NVM chip erase. All state is
//! transient and scoped to one session; nothing is shared between
//! sessions.

use std::time::Duration;

use crate::error::{Result, TpiError};
use crate::frame;
use crate::protocol::{
    io, nvm_cmd, reg, sin, sldcs, sout, sstcs, sstpr, NvmStatus, TpiConstants, TpiStatus,
    MAX_BUSY_POLLS, MAX_CONNECT_ATTEMPTS, SKEY, SST_PI,
};
use crate::transport::{Pin, Transport};

/// Settle time after changing /RESET, before any protocol traffic.
const RESET_SETTLE: Duration = Duration::from_millis(20);

/// Worst-case target power-up is 128 ms; wait twice that.
const POWER_UP: Duration = Duration::from_millis(256);

/// TPI protocol engine
///
/// The engine assumes exclusive, non-reentrant ownership of the link.
/// Serializing access across logical sessions is the caller's job.
pub struct Tpi<T: Transport> {
    transport: T,
    constants: TpiConstants,
}

impl<T: Transport> Tpi<T> {
    /// Create an engine with the standard protocol constants.
    pub fn new(transport: T) -> Self {
        Self::with_constants(transport, TpiConstants::default())
    }

    /// Create an engine with a caller-supplied constants table.
    pub fn with_constants(transport: T, constants: TpiConstants) -> Self {
        Self {
            transport,
            constants,
        }
    }

    /// Release the underlying transport.
    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Bring the link up.
    ///
    /// Runs the power-on reset sequence on the discrete pins, then sends
    /// 16 idle bit times in one write to synchronize the target's
    /// receiver before the first frame. Each step is required, in this
    /// order; failures abort without retry.
    pub fn initialize(&mut self) -> Result<()> {
        log::info!("tpi: using TPI interface");

        log::debug!("tpi: driving /RESET low");
        self.transport.set_pin(Pin::Reset, false)?;
        self.transport.set_pin(Pin::Clock, false)?;
        self.transport.set_pin(Pin::Data, true)?;
        self.transport.sleep(RESET_SETTLE);

        self.transport.set_pin(Pin::Reset, true)?;
        self.transport.sleep(POWER_UP);

        self.transport.set_pin(Pin::Reset, false)?;
        self.transport.sleep(RESET_SETTLE);

        log::debug!("tpi: sending 16 init clock cycles");
        self.write_all_bits(&[0xFF, 0xFF])
    }

    /// Execute one TPI command.
    ///
    /// Transmits every byte of `cmd` as one frame each, then reads
    /// `response.len()` frames back, in strict order. Fails on the
    /// first transport error or parity mismatch; `response` is only
    /// meaningful on success.
    pub fn command(&mut self, cmd: &[u8], response: &mut [u8]) -> Result<()> {
        for &byte in cmd {
            self.write_byte(byte)?;
        }
        for slot in response.iter_mut() {
            *slot = self.read_byte()?;
        }
        Ok(())
    }

    /// Execute a command and return the response in a fixed-size array.
    pub fn command_ret<const N: usize>(&mut self, cmd: &[u8]) -> Result<[u8; N]> {
        let mut buf = [0u8; N];
        self.command(cmd, &mut buf)?;
        Ok(buf)
    }

    /// Unlock the target for NVM programming.
    ///
    /// Sets the guard time, sends the serial key, then polls the
    /// identification and status registers until the target reports NVM
    /// enabled. Each failed check sends two breaks to resynchronize the
    /// line and costs one of the bounded attempts.
    pub fn program_enable(&mut self) -> Result<()> {
        log::info!("tpi: program enable");

        self.command(&[sstcs(reg::TPIPCR), self.constants.guard_time], &mut [])?;

        let mut skey_cmd = [0u8; 9];
        skey_cmd[0] = SKEY;
        skey_cmd[1..].copy_from_slice(&self.constants.skey);
        self.command(&skey_cmd, &mut [])?;

        for attempt in 1..=MAX_CONNECT_ATTEMPTS {
            log::debug!("tpi: connection attempt {attempt}");
            if self.probe_enabled()? {
                log::info!("tpi: NVM enabled after {attempt} attempt(s)");
                return Ok(());
            }
            log::warn!("tpi: check failed, sending break");
            self.send_break()?;
            self.send_break()?;
        }

        log::error!("tpi: error connecting to target");
        Err(TpiError::Protocol {
            attempts: MAX_CONNECT_ATTEMPTS,
        })
    }

    /// Transmit a break (at least 12 low bit times), no response
    /// expected. Resynchronizes the target receiver after a failed
    /// exchange.
    pub fn send_break(&mut self) -> Result<()> {
        log::trace!("tpi: break");
        self.write_all_bits(&frame::BREAK_FRAME.to_le_bytes())
    }

    /// Erase the entire NVM.
    ///
    /// `erase_delay` is the device-specific erase time from the part
    /// description; it is waited out even when the busy flag clears
    /// early. Exhausting the busy-poll bound is reported as
    /// [`TpiError::Timeout`], after the delay.
    pub fn chip_erase(&mut self, erase_delay: Duration) -> Result<()> {
        log::info!("tpi: chip erase");

        // Point at the NVM lock bits + 1 (0x4001), select the erase
        // command, then trigger it with a post-increment store.
        let cmd = [
            sstpr(0),
            0x01,
            sstpr(1),
            0x40,
            sout(io::NVMCMD),
            nvm_cmd::CHIP_ERASE,
            SST_PI,
            0x00,
        ];
        self.command(&cmd, &mut [])?;

        let idle = self.wait_nvm_idle()?;
        self.transport.sleep(erase_delay);

        if !idle {
            log::error!("tpi: NVM busy flag did not clear");
            return Err(TpiError::Timeout {
                polls: MAX_BUSY_POLLS,
            });
        }
        Ok(())
    }

    /// Leave programming mode by clearing the guard time register. No
    /// pin changes; the caller owns the reset line from here.
    pub fn disable(&mut self) -> Result<()> {
        self.command(&[sstcs(reg::TPIPCR), 0x00], &mut [])?;
        log::info!("tpi: leaving programming mode");
        Ok(())
    }

    /// One identification-plus-status probe.
    ///
    /// `Ok(false)` is a retryable failure: a wrong register value or a
    /// parity error. Transport failures propagate.
    fn probe_enabled(&mut self) -> Result<bool> {
        log::debug!("tpi: reading identification register");
        let ident = match self.command_ret::<1>(&[sldcs(reg::TPIIR)]) {
            Ok([value]) => value,
            Err(err) => return demote_framing(err),
        };
        if ident != self.constants.ident_code {
            log::warn!(
                "tpi: identification 0x{ident:02X}, expected 0x{:02X}",
                self.constants.ident_code
            );
            return Ok(false);
        }

        log::debug!("tpi: reading status register");
        let status = match self.command_ret::<1>(&[sldcs(reg::TPISR)]) {
            Ok([value]) => value,
            Err(err) => return demote_framing(err),
        };
        Ok(TpiStatus::from_bits_retain(status).contains(TpiStatus::NVMEN))
    }

    /// Poll NVMCSR until the busy flag clears or the bound is spent.
    /// `Ok(false)` means the bound ran out with the target still busy.
    fn wait_nvm_idle(&mut self) -> Result<bool> {
        for _ in 0..MAX_BUSY_POLLS {
            let status = match self.command_ret::<1>(&[sin(io::NVMCSR)]) {
                Ok([value]) => value,
                // A garbled status read costs one poll and nothing else.
                Err(TpiError::Framing { .. }) => continue,
                Err(other) => return Err(other),
            };
            if !NvmStatus::from_bits_retain(status).contains(NvmStatus::BUSY) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn write_byte(&mut self, byte: u8) -> Result<()> {
        let frame = frame::encode(byte);
        log::trace!("tpi: write byte 0x{byte:02X} frame 0x{frame:04X}");
        self.write_all_bits(&frame.to_le_bytes())
    }

    /// Read one response frame.
    ///
    /// The window is one byte wider than the frame: two guard bits and
    /// two idle bits of line padding plus alignment slack. The frame
    /// sits in the low 16 bits.
    fn read_byte(&mut self) -> Result<u8> {
        let mut window = [0u8; 3];
        self.transport.read_bits(&mut window)?;

        let frame = u16::from_le_bytes([window[0], window[1]]);
        let (byte, parity_ok) = frame::decode(frame);
        log::trace!("tpi: read frame 0x{frame:04X} byte 0x{byte:02X}");

        if !parity_ok {
            return Err(TpiError::Framing { frame, byte });
        }
        Ok(byte)
    }

    fn write_all_bits(&mut self, samples: &[u8]) -> Result<()> {
        let accepted = self.transport.write_bits(samples)?;
        if accepted != samples.len() {
            return Err(TpiError::Transport(format!(
                "short write: {accepted} of {} sample bytes accepted",
                samples.len()
            )));
        }
        Ok(())
    }
}

/// Framing errors are recoverable via break; anything else aborts.
fn demote_framing(err: TpiError) -> Result<bool> {
    match err {
        TpiError::Framing { .. } => {
            log::warn!("tpi: {err}");
            Ok(false)
        }
        other => Err(other),
    }
}
