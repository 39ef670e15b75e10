//! Writer error types.

use metawriter_model::{EntityEdit, ModelError};
use metawriter_types::CommitId;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for catalog collaborator calls.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Result type for writer operations.
pub type WriterResult<T> = Result<T, WriterError>;

/// Errors reported by a catalog client or identity resolver.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The request never produced a catalog answer.
    #[error("transport error: {0}")]
    Transport(String),

    /// The catalog refused the request as a whole.
    #[error("catalog rejected request: {0}")]
    Rejected(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors loading or applying configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid log filter {filter:?}: {reason}")]
    InvalidLogFilter { filter: String, reason: String },
}

/// One batch item the catalog did not apply.
#[derive(Debug, Clone)]
pub struct ItemFailure {
    /// The edit as it was submitted.
    pub edit: EntityEdit,
    /// The catalog's error detail.
    pub detail: String,
}

/// A commit in which one or more batch items failed.
///
/// The writer's batch is already empty when this is returned. The failed
/// edits travel with the error so the caller can re-add them.
#[derive(Debug, Error)]
#[error("commit {commit_id} failed for {} item(s): {}", .failures.len(), summarize(.failures))]
pub struct RemoteError {
    pub commit_id: CommitId,
    pub failures: Vec<ItemFailure>,
}

impl RemoteError {
    /// Returns the failed edits, dropping the error details.
    pub fn into_failed_edits(self) -> Vec<EntityEdit> {
        self.failures.into_iter().map(|f| f.edit).collect()
    }
}

fn summarize(failures: &[ItemFailure]) -> String {
    failures
        .iter()
        .map(|f| format!("{} ({})", f.edit.descriptor(), f.detail))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Errors surfaced to writer callers.
#[derive(Debug, Error)]
pub enum WriterError {
    /// An edit cannot be located in the catalog. Raised before any network call.
    #[error("validation error: {0}")]
    Validation(String),

    /// Caller misuse: an empty name, an empty key.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The catalog rejected part or all of a committed batch.
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// A lookup against the catalog failed while building an edit.
    #[error("catalog lookup failed: {0}")]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl WriterError {
    /// Whether retrying the same call could succeed. Always false; recover
    /// from a failed commit by re-adding [`RemoteError::into_failed_edits`].
    pub fn is_retriable(&self) -> bool {
        false
    }

    /// The edits a failed commit gave back, if any.
    pub fn failed_edits(&self) -> Option<Vec<&EntityEdit>> {
        match self {
            WriterError::Remote(remote) => Some(remote.failures.iter().map(|f| &f.edit).collect()),
            _ => None,
        }
    }
}

impl From<ModelError> for WriterError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::InvalidArgument(msg) => WriterError::InvalidArgument(msg),
            ModelError::Validation(msg) => WriterError::Validation(msg),
        }
    }
}
