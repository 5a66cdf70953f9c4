//! Error types for the handshake codec.

use thiserror::Error;

/// Result type for packet decoding and encoding.
pub type Result<T> = core::result::Result<T, Error>;

/// Error type for the handshake codec.
///
/// None of these are fatal to the process; the caller decides whether to
/// drop the connection attempt.
#[derive(Debug, Error)]
pub enum Error {
    /// The greeting announces a protocol version other than 10.
    #[error("unsupported protocol version: {0}")]
    UnsupportedProtocolVersion(u8),

    /// Length accounting went negative or a declared length is inconsistent.
    #[error("malformed packet: {0}")]
    MalformedPacket(String),

    /// I/O error from the underlying reader or writer
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Payload does not fit into its length field.
    #[error("encoding overflow: length {len} exceeds {max}")]
    EncodingOverflow { len: usize, max: usize },
}

impl Error {
    /// Returns true if the error came from the transport rather than the peer's bytes.
    pub fn is_io(&self) -> bool {
        matches!(self, Error::Io(_))
    }
}
