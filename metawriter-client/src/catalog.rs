//! Catalog collaborator contracts.
//!
//! The writer never talks HTTP itself. A [`CatalogClient`] submits batches
//! and model definitions; an [`IdentityResolver`] looks up catalog
//! identities before an edit is created. Transport, authentication and
//! query syntax belong to the implementations.

use crate::error::CatalogResult;
use crate::registry::MetadataModel;
use metawriter_model::{EntityDescriptor, EntityEdit, SourceType};
use metawriter_types::{EntityIdentity, SourceId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Outcome of one batch submission.
///
/// Errors are keyed by the item's position in the submitted slice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitResult {
    submitted: usize,
    #[serde(default)]
    errors: BTreeMap<usize, String>,
}

impl CommitResult {
    /// A result for `submitted` items, all successful.
    pub fn new(submitted: usize) -> Self {
        Self {
            submitted,
            errors: BTreeMap::new(),
        }
    }

    /// Adds an error for the item at `index`.
    #[must_use]
    pub fn with_error(mut self, index: usize, detail: impl Into<String>) -> Self {
        self.record_error(index, detail);
        self
    }

    pub fn record_error(&mut self, index: usize, detail: impl Into<String>) {
        self.errors.insert(index, detail.into());
    }

    pub fn submitted(&self) -> usize {
        self.submitted
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn errors(&self) -> &BTreeMap<usize, String> {
        &self.errors
    }

    pub fn error_for(&self, index: usize) -> Option<&str> {
        self.errors.get(&index).map(String::as_str)
    }
}

/// Submits work to the remote catalog.
pub trait CatalogClient: Send + Sync {
    /// Writes a batch of entity edits in one call.
    ///
    /// `Err` means the call as a whole failed; per-item rejections are
    /// reported in the returned [`CommitResult`].
    fn submit(&self, batch: &[EntityEdit]) -> CatalogResult<CommitResult>;

    /// Registers namespaces, managed properties and class mappings.
    fn register_models(&self, model: &MetadataModel) -> CatalogResult<()>;
}

/// Looks up catalog identities.
pub trait IdentityResolver: Send + Sync {
    /// Finds the catalog identity of the described entity, if it exists.
    fn resolve(&self, descriptor: &EntityDescriptor) -> CatalogResult<Option<EntityIdentity>>;

    /// Finds the catalog source of the given type.
    fn source_id(&self, source_type: SourceType) -> CatalogResult<Option<SourceId>>;
}

/// An in-memory catalog for testing.
pub mod mock {
    use super::*;
    use crate::error::CatalogError;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Answers identity lookups from fixed tables and records every
    /// submission. Items can be rejected by descriptor; the whole call can
    /// be made to fail.
    #[derive(Debug, Default)]
    pub struct MockCatalog {
        sources: Mutex<HashMap<SourceType, SourceId>>,
        identities: Mutex<HashMap<EntityDescriptor, EntityIdentity>>,
        rejections: Mutex<HashMap<EntityDescriptor, String>>,
        transport_failure: Mutex<Option<String>>,
        submissions: Mutex<Vec<Vec<EntityEdit>>>,
        models: Mutex<Vec<MetadataModel>>,
    }

    impl MockCatalog {
        pub fn new() -> Self {
            Self::default()
        }

        /// Registers a source of the given type.
        pub fn with_source(self, source_type: SourceType, source_id: &str) -> Self {
            let id = SourceId::parse(source_id).expect("valid source id");
            self.sources.lock().unwrap().insert(source_type, id);
            self
        }

        /// Makes the described entity known to the catalog.
        pub fn with_identity(self, descriptor: EntityDescriptor, identity: &str) -> Self {
            let id = EntityIdentity::parse(identity).expect("valid identity");
            self.identities.lock().unwrap().insert(descriptor, id);
            self
        }

        /// Rejects every submitted edit of the described entity.
        pub fn reject(&self, descriptor: EntityDescriptor, detail: impl Into<String>) {
            self.rejections
                .lock()
                .unwrap()
                .insert(descriptor, detail.into());
        }

        /// Fails every following call with a transport error, or stops
        /// failing when `detail` is `None`.
        pub fn fail_transport(&self, detail: Option<&str>) {
            *self.transport_failure.lock().unwrap() = detail.map(String::from);
        }

        /// Every batch submitted so far, in call order.
        pub fn submissions(&self) -> Vec<Vec<EntityEdit>> {
            self.submissions.lock().unwrap().clone()
        }

        pub fn submit_count(&self) -> usize {
            self.submissions.lock().unwrap().len()
        }

        /// Every model registered so far, in call order.
        pub fn registered_models(&self) -> Vec<MetadataModel> {
            self.models.lock().unwrap().clone()
        }

        fn check_transport(&self) -> CatalogResult<()> {
            match self.transport_failure.lock().unwrap().as_ref() {
                Some(detail) => Err(CatalogError::Transport(detail.clone())),
                None => Ok(()),
            }
        }
    }

    impl CatalogClient for MockCatalog {
        fn submit(&self, batch: &[EntityEdit]) -> CatalogResult<CommitResult> {
            self.check_transport()?;
            self.submissions.lock().unwrap().push(batch.to_vec());

            let rejections = self.rejections.lock().unwrap();
            let mut result = CommitResult::new(batch.len());
            for (index, edit) in batch.iter().enumerate() {
                if let Some(detail) = rejections.get(edit.descriptor()) {
                    result.record_error(index, detail.clone());
                }
            }
            Ok(result)
        }

        fn register_models(&self, model: &MetadataModel) -> CatalogResult<()> {
            self.check_transport()?;
            self.models.lock().unwrap().push(model.clone());
            Ok(())
        }
    }

    impl IdentityResolver for MockCatalog {
        fn resolve(&self, descriptor: &EntityDescriptor) -> CatalogResult<Option<EntityIdentity>> {
            self.check_transport()?;
            Ok(self.identities.lock().unwrap().get(descriptor).cloned())
        }

        fn source_id(&self, source_type: SourceType) -> CatalogResult<Option<SourceId>> {
            self.check_transport()?;
            Ok(self.sources.lock().unwrap().get(&source_type).cloned())
        }
    }
}
