//! tpiprog - Tiny Programming Interface (TPI) protocol engine
//!
//! TPI is the single-wire, framed serial protocol used to program
//! reduced-pin AVR targets (ATtiny4/5/9/10/20/40) whose packages have no
//! room for the usual SPI programming lines. This crate implements the
//! protocol engine only: frame encoding with parity, link bring-up, the
//! program-enable handshake with break recovery, a generic command
//! channel, and NVM chip erase with busy polling.
//!
//! # Architecture
//!
//! The physical adapter is abstracted behind the [`Transport`] trait:
//! shift bit-samples out, shift bit-samples in, drive the discrete
//! reset/clock/data pins, and sleep. Any bit-bang capable interface can
//! implement it; none ships here. Everything above it is strictly
//! synchronous and owns the link exclusively for the session.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use tpiprog::{Tpi, Transport};
//!
//! fn erase(adapter: impl Transport) -> tpiprog::Result<()> {
//!     let mut tpi = Tpi::new(adapter);
//!     tpi.initialize()?;
//!     tpi.program_enable()?;
//!     tpi.chip_erase(Duration::from_millis(10))?;
//!     tpi.disable()
//! }
//! ```
//!
//! Arbitrary protocol commands beyond erase go through
//! [`Tpi::command`], using the opcode vocabulary in [`protocol`].

pub mod device;
pub mod error;
pub mod frame;
pub mod protocol;
pub mod transport;

pub use device::Tpi;
pub use error::{Result, TpiError};
pub use protocol::TpiConstants;
pub use transport::{Pin, Transport};
