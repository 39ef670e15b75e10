//! Model error types.

use thiserror::Error;

/// Result type for model operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors raised locally, before anything reaches the catalog.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    /// A structurally invalid argument: an empty namespace, an empty
    /// property key, a malformed qualified removal key. Indicates caller
    /// misuse and is never retried.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// An entity edit is missing what the catalog needs to locate the entity.
    #[error("validation failed: {0}")]
    Validation(String),
}
