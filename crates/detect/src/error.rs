//! Detection Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction.

use derive_more::{Display, Error};

/// A detection or parsing error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for detection operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Reading the input stream failed.
    #[display("I/O error while reading input")]
    Io,
    /// The content claims to be a format but its structure is broken or
    /// truncated.
    #[display("malformed {format} content: {reason}")]
    Malformed {
        /// Short format name, e.g. `png`.
        format: &'static str,
        /// What was wrong.
        reason: String,
    },
    /// A media type string could not be parsed.
    #[display("invalid media type: {_0}")]
    InvalidMediaType(#[error(not(source))] String),
}

impl ErrorKind {
    pub(crate) fn malformed(format: &'static str, reason: impl Into<String>) -> Self {
        Self::Malformed { format, reason: reason.into() }
    }

    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        // Content is either well-formed or it isn't; only I/O can be flaky.
        matches!(self, Self::Io)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kind_display() {
        assert_eq!(
            ErrorKind::malformed("png", "missing IHDR chunk").to_string(),
            "malformed png content: missing IHDR chunk"
        );
        assert_eq!(ErrorKind::InvalidMediaType("text".to_string()).to_string(), "invalid media type: text");
    }

    #[test]
    fn error_kind_retryable() {
        assert!(ErrorKind::Io.is_retryable());
        assert!(!ErrorKind::malformed("pdf", "truncated").is_retryable());
    }
}
