//! Core type definitions for metawriter.
//!
//! This crate defines the plain, I/O-free types shared by the model and
//! client crates:
//! - Catalog identities (`EntityIdentity`, `SourceId`) and commit ids (UUID v7)
//! - The closed managed-property value type and its namespace map aliases
//!
//! Reconciliation logic lives in `metawriter-model`; remote submission in
//! `metawriter-client`.

mod ids;
mod value;

pub use ids::{CommitId, EntityIdentity, SourceId};
pub use value::{Namespace, NamespacedProperties, PropertyKey, PropertyMap, PropertyValue};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid UUID: {0}")]
    InvalidUuid(#[from] uuid::Error),

    #[error("invalid identity: {0}")]
    InvalidIdentity(String),
}
