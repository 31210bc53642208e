//! Inventory Error Types

use derive_more::{Display, Error};

/// An inventory error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for inventory operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The scan root is missing or not a directory.
    #[display("invalid scan root: {_0}")]
    Root(#[error(not(source))] String),
    /// A directory could not be listed; its branch is skipped.
    #[display("unreadable directory: {_0}")]
    Unreadable(#[error(not(source))] String),
    /// A symbolic link leads back to one of its own ancestors.
    #[display("filesystem loop at {_0}")]
    Loop(#[error(not(source))] String),
    #[display("unable to open file")]
    Open,
    #[display("unable to read file")]
    Read,
    /// The content parser rejected the file.
    #[display("content parsing failed")]
    Parse,
    /// Writing results out failed.
    #[display("unable to write results")]
    Output,
    /// The background scan thread could not be started or died.
    #[display("scan worker failed")]
    Worker,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unreadable(_) | Self::Open | Self::Read | Self::Output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable() {
        assert!(ErrorKind::Open.is_retryable());
        assert!(ErrorKind::Unreadable("/tmp".to_string()).is_retryable());
        assert!(!ErrorKind::Parse.is_retryable());
        assert!(!ErrorKind::Loop("/tmp".to_string()).is_retryable());
    }
}
