//! Configuration Error Types

use derive_more::{Display, Error};

/// A configuration error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for configuration operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// An explicitly requested configuration file does not exist.
    #[display("configuration file not found: {_0}")]
    NotFound(#[error(not(source))] String),
    /// The file extension doesn't name a supported format.
    #[display("unsupported configuration format: {_0}")]
    UnsupportedFormat(#[error(not(source))] String),
    /// A source could not be parsed or a value has the wrong shape.
    #[display("invalid configuration")]
    Invalid,
    /// A value parsed but is out of range.
    #[display("invalid configuration value for {key}: {reason}")]
    Value {
        #[error(not(source))]
        key: &'static str,
        #[error(not(source))]
        reason: String,
    },
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    ///
    /// Configuration problems need a human to fix them.
    pub fn is_retryable(&self) -> bool {
        false
    }
}
