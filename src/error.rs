//! Binary Error Types

use derive_more::{Display, Error};

/// A fatal error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for the command line front end.
pub type Result<T> = std::result::Result<T, Error>;

/// Failures that end the run with a non-zero exit status.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    #[display("unable to load configuration")]
    Config,
    #[display("unable to scan {_0}")]
    Scan(#[error(not(source))] String),
    #[display("unable to write output")]
    Output,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Output)
    }
}
