//! Batch writer for metawriter.
//!
//! Accumulates entity edits and commits them to a metadata catalog in one
//! call per batch.
//!
//! # Components
//!
//! - **Catalog**: the [`CatalogClient`] and [`IdentityResolver`] contracts
//!   the writer is built on, plus an in-memory [`mock`] implementation
//! - **Writer**: [`MetaWriter`] builds, validates and batches edits, then
//!   commits the batch
//! - **Registry**: [`ModelRegistry`] registers managed-property namespaces,
//!   properties and class mappings
//! - **Config**: [`WriterConfig`] loaded from TOML, and [`init_logging`]
//!
//! # Commit protocol
//!
//! 1. Edits are validated when added; invalid edits never reach the batch
//! 2. Equal edits collapse to one
//! 3. `commit` takes the whole batch and submits it
//! 4. The batch is empty afterwards, whatever the outcome
//! 5. Failed items come back in [`RemoteError`] for the caller to re-add
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use metawriter_client::mock::MockCatalog;
//! use metawriter_client::{EntityUpdate, MetaWriter};
//! use metawriter_model::{EntityDescriptor, SourceType};
//!
//! let catalog = Arc::new(
//!     MockCatalog::new()
//!         .with_source(SourceType::Hive, "hive-1")
//!         .with_identity(EntityDescriptor::hive_table("sales", "orders"), "42"),
//! );
//! let mut writer = MetaWriter::new(catalog.clone(), catalog.clone());
//!
//! writer
//!     .update_hive_table("sales", "orders", EntityUpdate::new().tags(["pii"]))
//!     .unwrap();
//! let report = writer.commit().unwrap();
//! assert_eq!(report.submitted, 1);
//! assert!(writer.pending().is_empty());
//! ```

mod batch;
mod catalog;
mod config;
mod error;
mod logging;
mod registry;
mod writer;

pub use batch::Batch;
pub use catalog::{CatalogClient, CommitResult, IdentityResolver, mock};
pub use config::WriterConfig;
pub use error::{
    CatalogError, CatalogResult, ConfigError, ItemFailure, RemoteError, WriterError, WriterResult,
};
pub use logging::init_logging;
pub use registry::{MetadataModel, ModelRegistry, NamespaceDef, PropertyDef, PropertyType};
pub use writer::{CommitReport, EntityUpdate, MetaWriter};
