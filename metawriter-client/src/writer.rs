//! Batch writer and commit protocol.
//!
//! A [`MetaWriter`] is one caller session. Edits are built against catalog
//! identities, validated, and accumulated in a [`Batch`]. `commit` submits
//! the whole batch in one call and always leaves the batch empty, whatever
//! the catalog answers. Delivery is at most once: edits that failed come
//! back inside the error and must be re-added to be retried.

use crate::batch::Batch;
use crate::catalog::{CatalogClient, IdentityResolver};
use crate::config::WriterConfig;
use crate::error::{ItemFailure, RemoteError, WriterError, WriterResult};
use metawriter_model::{ChangeSet, EntityDescriptor, EntityEdit, ModelResult};
use metawriter_types::{CommitId, NamespacedProperties, PropertyKey};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Metadata changes for one entity, applied by [`MetaWriter::update`].
///
/// With `replace` set, tags, user properties and managed properties
/// override what the catalog holds; otherwise they are added.
#[derive(Debug, Clone, Default)]
pub struct EntityUpdate {
    pub alias: Option<String>,
    pub description: Option<String>,
    pub tags: BTreeSet<String>,
    pub properties: BTreeMap<String, String>,
    pub managed: NamespacedProperties,
    pub remove: BTreeSet<PropertyKey>,
    pub replace: bool,
}

impl EntityUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn properties(mut self, properties: BTreeMap<String, String>) -> Self {
        self.properties.extend(properties);
        self
    }

    pub fn managed(mut self, managed: NamespacedProperties) -> Self {
        for (namespace, props) in managed {
            self.managed.entry(namespace).or_default().extend(props);
        }
        self
    }

    pub fn remove<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<PropertyKey>,
    {
        self.remove.extend(keys.into_iter().map(Into::into));
        self
    }

    pub fn replace(mut self, replace: bool) -> Self {
        self.replace = replace;
        self
    }

    /// Applies the update to an edit: alias and description first, then
    /// tags and user properties, then managed properties (override or
    /// additions), then removals.
    pub fn apply_to(self, edit: &mut EntityEdit) -> ModelResult<()> {
        if let Some(alias) = self.alias {
            edit.set_alias(alias);
        }
        if let Some(description) = self.description {
            edit.set_description(description);
        }

        if self.replace {
            edit.replace_tags(self.tags);
            edit.replace_properties(self.properties);
        } else {
            edit.add_tags(self.tags);
            edit.add_properties(self.properties);
        }

        if !self.managed.is_empty() {
            if self.replace {
                edit.managed_mut().record_override(Some(self.managed))?;
            } else {
                edit.managed_mut().record_additions(self.managed)?;
            }
        }
        if !self.remove.is_empty() {
            edit.managed_mut().record_removals(self.remove)?;
        }
        Ok(())
    }
}

/// What a successful commit did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommitReport {
    /// `None` when there was nothing to submit.
    pub commit_id: Option<CommitId>,
    pub submitted: usize,
}

/// One writer session: builds entity edits, batches them, commits them.
pub struct MetaWriter {
    client: Arc<dyn CatalogClient>,
    resolver: Arc<dyn IdentityResolver>,
    config: WriterConfig,
    batch: Batch,
}

impl MetaWriter {
    /// Creates a writer with the default configuration.
    pub fn new(client: Arc<dyn CatalogClient>, resolver: Arc<dyn IdentityResolver>) -> Self {
        Self::with_config(client, resolver, WriterConfig::default())
    }

    pub fn with_config(
        client: Arc<dyn CatalogClient>,
        resolver: Arc<dyn IdentityResolver>,
        config: WriterConfig,
    ) -> Self {
        Self {
            client,
            resolver,
            config,
            batch: Batch::new(),
        }
    }

    pub fn config(&self) -> &WriterConfig {
        &self.config
    }

    /// The edits waiting for the next commit.
    pub fn pending(&self) -> &Batch {
        &self.batch
    }

    /// Starts an edit of the described entity.
    ///
    /// Looks up the owning source and the entity's identity. Fails with a
    /// validation error when the source is unknown, or when the entity is
    /// unknown and `require_identity` is set.
    pub fn edit(&self, descriptor: EntityDescriptor) -> WriterResult<EntityEdit> {
        let source_type = descriptor.source_type();
        let source_id = self.resolver.source_id(source_type)?.ok_or_else(|| {
            WriterError::Validation(format!("no {source_type} source is registered in the catalog"))
        })?;

        let identity = self.resolver.resolve(&descriptor)?;
        if identity.is_none() && self.config.require_identity {
            return Err(WriterError::Validation(format!(
                "{} {} was not found in the catalog",
                descriptor.entity_type(),
                descriptor
            )));
        }
        debug!(
            entity = %descriptor,
            identity = ?identity.as_ref().map(|id| id.as_str()),
            source = %source_id,
            "resolved entity"
        );

        let managed = ChangeSet::with_scope(self.config.removal_scope);
        let mut edit = EntityEdit::with_change_set(descriptor, managed).with_source_id(source_id);
        edit.set_identity(identity);
        Ok(edit)
    }

    /// Validates an edit and adds it to the pending batch.
    ///
    /// Returns false if an equal edit was already pending.
    pub fn add(&mut self, edit: EntityEdit) -> WriterResult<bool> {
        edit.validate()?;
        let entity = edit.descriptor().to_string();
        let added = self.batch.add(edit);
        debug!(%entity, added, pending = self.batch.len(), "batched entity edit");
        Ok(added)
    }

    /// Builds an edit from `update` and adds it to the batch.
    pub fn update(&mut self, descriptor: EntityDescriptor, update: EntityUpdate) -> WriterResult<()> {
        info!(
            entity_type = %descriptor.entity_type(),
            entity = %descriptor,
            "updating entity metadata"
        );
        let mut edit = self.edit(descriptor)?;
        update.apply_to(&mut edit)?;
        self.add(edit)?;
        Ok(())
    }

    pub fn update_hdfs_file(&mut self, path: &str, update: EntityUpdate) -> WriterResult<()> {
        self.update(EntityDescriptor::hdfs_file(path), update)
    }

    pub fn update_hdfs_directory(&mut self, path: &str, update: EntityUpdate) -> WriterResult<()> {
        self.update(EntityDescriptor::hdfs_directory(path), update)
    }

    pub fn update_hive_database(&mut self, database: &str, update: EntityUpdate) -> WriterResult<()> {
        self.update(EntityDescriptor::hive_database(database), update)
    }

    pub fn update_hive_table(
        &mut self,
        database: &str,
        table: &str,
        update: EntityUpdate,
    ) -> WriterResult<()> {
        self.update(EntityDescriptor::hive_table(database, table), update)
    }

    pub fn update_hive_view(
        &mut self,
        database: &str,
        view: &str,
        update: EntityUpdate,
    ) -> WriterResult<()> {
        self.update(EntityDescriptor::hive_view(database, view), update)
    }

    pub fn update_hive_column(
        &mut self,
        database: &str,
        table: &str,
        column: &str,
        update: EntityUpdate,
    ) -> WriterResult<()> {
        self.update(EntityDescriptor::hive_column(database, table, column), update)
    }

    /// Submits every pending edit in one call.
    ///
    /// The batch is emptied before the result is inspected. If any item
    /// failed, the error carries the failed edits.
    pub fn commit(&mut self) -> WriterResult<CommitReport> {
        if self.batch.is_empty() {
            debug!("nothing to commit");
            return Ok(CommitReport {
                commit_id: None,
                submitted: 0,
            });
        }

        let commit_id = CommitId::new();
        let batch = self.batch.take();
        info!(%commit_id, items = batch.len(), "writing metadata batch to the catalog");

        let result = match self.client.submit(&batch) {
            Ok(result) => result,
            Err(err) => {
                warn!(%commit_id, error = %err, "batch submission failed");
                let detail = err.to_string();
                let failures = batch
                    .into_iter()
                    .map(|edit| ItemFailure {
                        edit,
                        detail: detail.clone(),
                    })
                    .collect();
                return Err(RemoteError { commit_id, failures }.into());
            }
        };

        if !result.has_errors() {
            info!(%commit_id, items = batch.len(), "batch committed");
            return Ok(CommitReport {
                commit_id: Some(commit_id),
                submitted: batch.len(),
            });
        }

        for (index, detail) in result.errors().range(batch.len()..) {
            warn!(%commit_id, index, %detail, "catalog reported an error for an unknown batch item");
        }
        let failures: Vec<ItemFailure> = batch
            .into_iter()
            .enumerate()
            .filter_map(|(index, edit)| {
                result.error_for(index).map(|detail| ItemFailure {
                    edit,
                    detail: detail.to_string(),
                })
            })
            .collect();
        for failure in &failures {
            warn!(
                %commit_id,
                entity = %failure.edit.descriptor(),
                detail = %failure.detail,
                "catalog rejected entity edit"
            );
        }
        Err(RemoteError { commit_id, failures }.into())
    }
}
