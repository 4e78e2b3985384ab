//! Error types for TPI operations

use thiserror::Error;

/// Errors surfaced by the TPI protocol engine
#[derive(Debug, Error)]
pub enum TpiError {
    /// Underlying link I/O failed
    ///
    /// Never retried by the engine; the in-flight operation aborts and the
    /// caller decides whether to restart the whole session.
    #[error("transport error: {0}")]
    Transport(String),

    /// A received frame's parity bit disagrees with its data bits
    #[error("bad parity in frame 0x{frame:04X} (byte 0x{byte:02X})")]
    Framing {
        /// The 16-bit frame as captured from the line
        frame: u16,
        /// Best-effort byte extracted from the frame
        byte: u8,
    },

    /// The program-enable handshake exhausted its retry bound
    #[error("failed to connect to target after {attempts} attempts")]
    Protocol {
        /// Number of identification/status attempts made
        attempts: u32,
    },

    /// The NVM busy flag never cleared within the poll bound
    #[error("NVM still busy after {polls} status reads")]
    Timeout {
        /// Number of NVMCSR reads issued
        polls: u32,
    },
}

/// Result type for TPI operations
pub type Result<T> = core::result::Result<T, TpiError>;
