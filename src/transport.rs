//! Transport abstraction for the physical TPI link
//!
//! The engine never talks to an adapter directly; it relies on the four
//! capabilities below. Any bit-bang capable interface (FTDI MPSSE,
//! GPIO, a microcontroller bridge) can implement them. No concrete
//! adapter ships in this crate.

use std::time::Duration;

use crate::error::Result;

/// Discrete lines the engine drives during reset and link bring-up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pin {
    /// Target /RESET
    Reset,
    /// TPI clock (TPICLK)
    Clock,
    /// TPI data, output direction (TPIDATA)
    Data,
}

/// Capabilities the protocol engine requires from the physical adapter
///
/// Bit-samples are grouped into bytes of eight, shifted out and in LSB
/// first at the fixed, adapter-configured TPI bit rate. The engine is
/// strictly synchronous: every call blocks until it completes or fails.
pub trait Transport {
    /// Shift out `samples.len() * 8` bit-samples, LSB first.
    ///
    /// Returns the number of sample bytes the adapter actually accepted.
    fn write_bits(&mut self, samples: &[u8]) -> Result<usize>;

    /// Shift in exactly `buf.len() * 8` bit-samples, LSB first,
    /// blocking until the buffer is full or an I/O error occurs.
    fn read_bits(&mut self, buf: &mut [u8]) -> Result<()>;

    /// Drive a discrete pin to the given level.
    fn set_pin(&mut self, pin: Pin, high: bool) -> Result<()>;

    /// Block for `duration`. Millisecond granularity is sufficient.
    fn sleep(&mut self, duration: Duration);
}
