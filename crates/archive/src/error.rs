//! Archive Error Types

use derive_more::{Display, Error};

/// An archive error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for archive operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The content is not an archive format this crate can read.
    #[display("not a recognised archive")]
    Unrecognized,
    /// The archive format is recognised but this variant can't be read.
    #[display("unsupported archive: {_0}")]
    Unsupported(#[error(not(source))] String),
    /// The archive structure is broken or truncated.
    #[display("corrupt archive: {_0}")]
    Corrupt(#[error(not(source))] String),
    /// The compression layer could not be set up.
    #[display("compression layer failed")]
    Compression,
    /// Reading the underlying stream failed.
    #[display("I/O error while reading archive")]
    Io,
}

impl ErrorKind {
    pub(crate) fn corrupt(reason: impl Into<String>) -> Self {
        Self::Corrupt(reason.into())
    }

    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kind_display() {
        assert_eq!(ErrorKind::Unrecognized.to_string(), "not a recognised archive");
        assert_eq!(ErrorKind::Unsupported("binary cpio".into()).to_string(), "unsupported archive: binary cpio");
        assert_eq!(ErrorKind::corrupt("bad header").to_string(), "corrupt archive: bad header");
    }

    #[test]
    fn error_kind_retryable() {
        assert!(ErrorKind::Io.is_retryable());
        assert!(!ErrorKind::Unrecognized.is_retryable());
        assert!(!ErrorKind::Compression.is_retryable());
    }
}
