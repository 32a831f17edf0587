//! Error handling for modeldelta-store
//!
//! Wraps modeldelta-core ExError with store-specific helpers

use modeldelta_core::errors::{ExError, ExErrorKind};
use std::path::Path;

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

/// Create an IO error
pub fn io_error(operation: &str, err: std::io::Error) -> ExError {
    ExError::new(ExErrorKind::Io)
        .with_op(operation.to_string())
        .with_message(err.to_string())
}

/// Create a JSON (de)serialization error for a file
pub fn serialization_error(operation: &str, path: &Path, err: serde_json::Error) -> ExError {
    ExError::new(ExErrorKind::Serialization)
        .with_op(operation.to_string())
        .with_message(format!("{}: {}", path.display(), err))
}

/// Create an invalid snapshot error for a file
pub fn invalid_snapshot(path: &Path, err: impl Into<ExError>) -> ExError {
    let err = err.into();
    ExError::new(ExErrorKind::InvalidSnapshot)
        .with_op("load_snapshot")
        .with_message(format!("{}: {}", path.display(), err.message()))
}

/// Create a not-found error for a file
pub fn not_found(operation: &str, path: &Path) -> ExError {
    ExError::new(ExErrorKind::NotFound)
        .with_op(operation.to_string())
        .with_message(format!("{} does not exist", path.display()))
}
