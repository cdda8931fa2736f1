//! Error types for blockmail library.

use std::io;
use thiserror::Error;

/// Result type alias for blockmail operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while editing, storing or rendering a composition.
#[derive(Error, Debug)]
pub enum Error {
    /// No block with the given id exists in the composition.
    #[error("Block not found: {0}")]
    BlockNotFound(u32),

    /// No stored composition exists under the given identifier.
    #[error("Composition not found: {0}")]
    CompositionNotFound(String),

    /// A style mutation named a field that does not exist.
    #[error("Invalid style field: {0}")]
    InvalidField(String),

    /// The composition does not have the expected shape.
    #[error("Invalid composition: {0}")]
    InvalidComposition(String),

    /// The layout template could not be supplied.
    #[error("Layout unavailable: {0}")]
    LayoutUnavailable(String),

    /// The store adapter failed for a reason other than a missing record.
    #[error("Store error: {0}")]
    Store(String),

    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Whether this error reports a missing block or a missing stored composition.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::BlockNotFound(_) | Error::CompositionNotFound(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::BlockNotFound(7);
        assert_eq!(err.to_string(), "Block not found: 7");

        let err = Error::InvalidField("fontFamily".to_string());
        assert_eq!(err.to_string(), "Invalid style field: fontFamily");
    }

    #[test]
    fn test_is_not_found() {
        assert!(Error::BlockNotFound(1).is_not_found());
        assert!(Error::CompositionNotFound("abc".into()).is_not_found());
        assert!(!Error::InvalidField("x".into()).is_not_found());
        assert!(!Error::LayoutUnavailable("x".into()).is_not_found());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
