//! Compression Error Types

use derive_more::{Display, Error};

/// A compression error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for compression operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// A decoder could not be set up.
    #[display("unable to initialise decoder")]
    Decoder,
    /// Reading or decoding the stream failed. Don't retry with the same input.
    #[display("invalid or corrupted data")]
    InvalidData,
    /// The layer is recognised but its decoder isn't compiled in.
    #[display("disabled format: {_0}")]
    DisabledFormat(#[error(not(source))] String),
    /// The raw stream could not be read.
    #[display("I/O error")]
    Io,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorKind::Io)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        assert_eq!(ErrorKind::InvalidData.to_string(), "invalid or corrupted data");
        assert_eq!(ErrorKind::DisabledFormat("zstd".to_string()).to_string(), "disabled format: zstd");
        assert!(ErrorKind::Io.is_retryable());
        assert!(!ErrorKind::Decoder.is_retryable());
    }
}
