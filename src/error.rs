//! Error types for address parsing, frame parsing and adapter I/O

use thiserror::Error;

/// A physical address did not have the 2-byte or 4-nibble shape
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// String is not two colon separated 2-digit hex bytes
    #[error("invalid physical address string: {0:?}")]
    InvalidString(String),

    /// Byte or nibble sequence has the wrong number of elements
    #[error("expected {expected} elements, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    /// A nibble value above 0xf
    #[error("nibble out of range: 0x{0:02x}")]
    NibbleOutOfRange(u8),
}

/// A frame string violates the hex-colon token grammar
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MalformedFrameError {
    /// No header byte
    #[error("empty frame")]
    Empty,

    /// A token that is not exactly two hex digits
    #[error("invalid token: {0:?}")]
    InvalidToken(String),
}

/// Failures reported by the adapter that talks to the bus
#[derive(Debug, Error)]
pub enum AdapterError {
    /// Nobody acknowledged the frame
    #[error("frame not acknowledged")]
    NotAcknowledged,

    /// The driver reported a failed transmission
    #[error("transmit failed: {0}")]
    Transmit(String),

    /// The frame does not fit into a single CEC message
    #[error("frame too long: {0} bytes")]
    FrameTooLong(usize),

    /// No result within the allowed time
    #[error("timeout after {0}ms")]
    Timeout(u64),

    /// The adapter connection is gone
    #[error("adapter closed")]
    Closed,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
