//! A pending edit of one catalog entity.
//!
//! Besides managed properties (the [`ChangeSet`]), an edit can carry the
//! user-editable metadata the catalog exposes on every entity: an alias,
//! a description, free-form tags, and free-form string properties.

use crate::{ChangeSet, EntityDescriptor, ModelError, ModelResult};
use metawriter_types::{EntityIdentity, SourceId};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::{BTreeMap, BTreeSet};

/// How a collection-valued field of an entity changes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum FieldEdit<T> {
    /// Leave the remote value alone.
    #[default]
    Unchanged,
    /// Add entries to whatever exists remotely.
    Add(T),
    /// Replace the remote value with exactly these entries.
    Replace(T),
}

impl<T> FieldEdit<T> {
    pub fn is_unchanged(&self) -> bool {
        matches!(self, Self::Unchanged)
    }
}

impl<T: Serialize> Serialize for FieldEdit<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        match self {
            Self::Unchanged => {}
            Self::Add(value) => map.serialize_entry("add", value)?,
            Self::Replace(value) => map.serialize_entry("set", value)?,
        }
        map.end()
    }
}

pub type TagEdit = FieldEdit<BTreeSet<String>>;
pub type UserPropertyEdit = FieldEdit<BTreeMap<String, String>>;

/// One entity's pending metadata changes.
///
/// Two edits are equal when every field is equal; the batch uses this to
/// collapse duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityEdit {
    identity: Option<EntityIdentity>,
    source_id: Option<SourceId>,
    descriptor: EntityDescriptor,
    alias: Option<String>,
    description: Option<String>,
    tags: TagEdit,
    properties: UserPropertyEdit,
    managed: ChangeSet,
}

impl EntityEdit {
    /// Creates an edit with no changes for the described entity.
    pub fn new(descriptor: EntityDescriptor) -> Self {
        Self::with_change_set(descriptor, ChangeSet::new())
    }

    /// Creates an edit whose managed properties start from `managed`.
    pub fn with_change_set(descriptor: EntityDescriptor, managed: ChangeSet) -> Self {
        Self {
            identity: None,
            source_id: None,
            descriptor,
            alias: None,
            description: None,
            tags: FieldEdit::Unchanged,
            properties: FieldEdit::Unchanged,
            managed,
        }
    }

    pub fn with_identity(mut self, identity: EntityIdentity) -> Self {
        self.identity = Some(identity);
        self
    }

    pub fn with_source_id(mut self, source_id: SourceId) -> Self {
        self.source_id = Some(source_id);
        self
    }

    pub fn set_identity(&mut self, identity: Option<EntityIdentity>) {
        self.identity = identity;
    }

    pub fn set_source_id(&mut self, source_id: Option<SourceId>) {
        self.source_id = source_id;
    }

    /// Sets the display name. Empty strings are ignored.
    pub fn set_alias(&mut self, alias: impl Into<String>) {
        let alias = alias.into();
        if !alias.is_empty() {
            self.alias = Some(alias);
        }
    }

    /// Sets the description. Empty strings are ignored.
    pub fn set_description(&mut self, description: impl Into<String>) {
        let description = description.into();
        if !description.is_empty() {
            self.description = Some(description);
        }
    }

    /// Adds tags, keeping a pending replacement a replacement.
    pub fn add_tags<I, S>(&mut self, tags: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tags = tags.into_iter().map(Into::into);
        match &mut self.tags {
            FieldEdit::Unchanged => {
                let tags: BTreeSet<String> = tags.collect();
                if !tags.is_empty() {
                    self.tags = FieldEdit::Add(tags);
                }
            }
            FieldEdit::Add(existing) | FieldEdit::Replace(existing) => existing.extend(tags),
        }
    }

    /// Replaces the remote tag set with exactly `tags`.
    pub fn replace_tags<I, S>(&mut self, tags: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = FieldEdit::Replace(tags.into_iter().map(Into::into).collect());
    }

    /// Adds user properties, keeping a pending replacement a replacement.
    pub fn add_properties(&mut self, properties: BTreeMap<String, String>) {
        match &mut self.properties {
            FieldEdit::Unchanged => {
                if !properties.is_empty() {
                    self.properties = FieldEdit::Add(properties);
                }
            }
            FieldEdit::Add(existing) | FieldEdit::Replace(existing) => existing.extend(properties),
        }
    }

    /// Replaces the remote user properties with exactly `properties`.
    pub fn replace_properties(&mut self, properties: BTreeMap<String, String>) {
        self.properties = FieldEdit::Replace(properties);
    }

    pub fn identity(&self) -> Option<&EntityIdentity> {
        self.identity.as_ref()
    }

    pub fn source_id(&self) -> Option<&SourceId> {
        self.source_id.as_ref()
    }

    pub fn descriptor(&self) -> &EntityDescriptor {
        &self.descriptor
    }

    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn tags(&self) -> &TagEdit {
        &self.tags
    }

    pub fn properties(&self) -> &UserPropertyEdit {
        &self.properties
    }

    pub fn managed(&self) -> &ChangeSet {
        &self.managed
    }

    pub fn managed_mut(&mut self) -> &mut ChangeSet {
        &mut self.managed
    }

    /// Clears the managed-property change set once it has been written.
    pub fn reset_managed(&mut self) {
        self.managed.reset();
    }

    /// Checks that the catalog can locate this entity.
    ///
    /// Either the identity or all attributes used to derive it must be
    /// present, along with the source id.
    pub fn validate(&self) -> ModelResult<()> {
        if self.identity.is_none() && !self.descriptor.has_id_attrs() {
            return Err(ModelError::Validation(format!(
                "{} {}: either the entity identity or the attributes used to derive it must be present",
                self.descriptor.entity_type(),
                self.descriptor
            )));
        }
        if self.source_id.is_none() {
            return Err(ModelError::Validation(format!(
                "{} {}: source id is required",
                self.descriptor.entity_type(),
                self.descriptor
            )));
        }
        Ok(())
    }
}

impl Serialize for EntityEdit {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        if let Some(identity) = &self.identity {
            map.serialize_entry("identity", identity)?;
        }
        if let Some(source_id) = &self.source_id {
            map.serialize_entry("sourceId", source_id)?;
        }
        map.serialize_entry("sourceType", &self.descriptor.source_type())?;
        map.serialize_entry("entityType", &self.descriptor.entity_type())?;
        map.serialize_entry("modelClass", self.descriptor.model_class())?;
        for (name, value) in self.descriptor.id_attrs() {
            map.serialize_entry(name, value)?;
        }
        if let Some(alias) = &self.alias {
            map.serialize_entry("alias", alias)?;
        }
        if let Some(description) = &self.description {
            map.serialize_entry("description", description)?;
        }
        if !self.tags.is_unchanged() {
            map.serialize_entry("tags", &self.tags)?;
        }
        if !self.properties.is_unchanged() {
            map.serialize_entry("properties", &self.properties)?;
        }
        if !self.managed.is_empty() {
            map.serialize_entry("customProperties", &self.managed)?;
        }
        map.end()
    }
}
