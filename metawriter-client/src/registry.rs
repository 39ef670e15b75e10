//! Managed-property model registration.
//!
//! Before managed properties can be written, the catalog must know their
//! namespace, their type, and which model classes carry them. The registry
//! batches those definitions and registers them in one call.

use crate::catalog::CatalogClient;
use crate::error::{WriterError, WriterResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::{debug, info};

/// A managed-property namespace definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamespaceDef {
    pub name: String,
    pub display_name: String,
    pub description: String,
}

/// Value type of a managed property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PropertyType {
    Text,
    Integer,
    Long,
    Double,
    Boolean,
    Date,
    Enum,
}

/// A managed-property definition within a namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDef {
    pub namespace: String,
    pub name: String,
    pub property_type: PropertyType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub multi_valued: bool,
    /// Allowed values. Only meaningful for [`PropertyType::Enum`].
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u32>,
    /// Regular expression the value must match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

impl PropertyDef {
    pub fn new(
        namespace: impl Into<String>,
        name: impl Into<String>,
        property_type: PropertyType,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            property_type,
            display_name: None,
            description: None,
            multi_valued: false,
            values: Vec::new(),
            max_length: None,
            pattern: None,
        }
    }

    pub fn display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn multi_valued(mut self, multi_valued: bool) -> Self {
        self.multi_valued = multi_valued;
        self
    }

    pub fn values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.values = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn max_length(mut self, max_length: u32) -> Self {
        self.max_length = Some(max_length);
        self
    }

    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    /// `"<namespace>.<name>"`
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.namespace, self.name)
    }
}

/// Everything registered by one [`ModelRegistry::commit`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataModel {
    pub namespaces: Vec<NamespaceDef>,
    pub properties: Vec<PropertyDef>,
    /// `"<package>.<class>"` → set of `"<namespace>.<property>"`.
    pub mappings: BTreeMap<String, BTreeSet<String>>,
}

/// Accumulates model definitions and registers them in one call.
pub struct ModelRegistry {
    client: Arc<dyn CatalogClient>,
    namespaces: BTreeMap<String, NamespaceDef>,
    properties: BTreeMap<String, PropertyDef>,
    mappings: BTreeMap<String, BTreeSet<String>>,
}

impl ModelRegistry {
    pub fn new(client: Arc<dyn CatalogClient>) -> Self {
        Self {
            client,
            namespaces: BTreeMap::new(),
            properties: BTreeMap::new(),
            mappings: BTreeMap::new(),
        }
    }

    /// Adds a namespace. A later definition with the same name replaces it.
    pub fn add_namespace(
        &mut self,
        name: impl Into<String>,
        display_name: impl Into<String>,
        description: impl Into<String>,
    ) -> WriterResult<()> {
        let name = name.into();
        require("namespace name", &name)?;
        info!(namespace = %name, "adding namespace");
        self.namespaces.insert(
            name.clone(),
            NamespaceDef {
                name,
                display_name: display_name.into(),
                description: description.into(),
            },
        );
        Ok(())
    }

    /// Adds a property. A later definition with the same qualified name replaces it.
    pub fn add_property(&mut self, property: PropertyDef) -> WriterResult<()> {
        require("namespace name", &property.namespace)?;
        require("property name", &property.name)?;
        if property.property_type == PropertyType::Enum && property.values.is_empty() {
            return Err(WriterError::InvalidArgument(format!(
                "enum property {} needs at least one value",
                property.qualified_name()
            )));
        }
        info!(property = %property.qualified_name(), "adding property");
        self.properties.insert(property.qualified_name(), property);
        Ok(())
    }

    /// Maps a managed property onto a model class.
    pub fn add_mapping(
        &mut self,
        package: &str,
        class: &str,
        namespace: &str,
        property: &str,
    ) -> WriterResult<()> {
        require("package name", package)?;
        require("class name", class)?;
        require("namespace name", namespace)?;
        require("property name", property)?;
        info!("adding a mapping from {package}.{class} to {namespace}.{property}");
        self.mappings
            .entry(format!("{package}.{class}"))
            .or_default()
            .insert(format!("{namespace}.{property}"));
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.namespaces.is_empty() && self.properties.is_empty() && self.mappings.is_empty()
    }

    /// The model the next commit would register.
    pub fn model(&self) -> MetadataModel {
        MetadataModel {
            namespaces: self.namespaces.values().cloned().collect(),
            properties: self.properties.values().cloned().collect(),
            mappings: self.mappings.clone(),
        }
    }

    /// Registers the accumulated definitions.
    ///
    /// Definitions are cleared only after the catalog accepts them, so a
    /// failed registration can be committed again.
    pub fn commit(&mut self) -> WriterResult<()> {
        if self.is_empty() {
            debug!("no model definitions to register");
            return Ok(());
        }
        let model = self.model();
        info!(
            namespaces = model.namespaces.len(),
            properties = model.properties.len(),
            mappings = model.mappings.len(),
            "registering metadata models"
        );
        self.client.register_models(&model)?;
        self.clear();
        Ok(())
    }

    pub fn clear(&mut self) {
        debug!("clearing model definitions");
        self.namespaces.clear();
        self.properties.clear();
        self.mappings.clear();
    }
}

fn require(what: &str, value: &str) -> WriterResult<()> {
    if value.trim().is_empty() {
        return Err(WriterError::InvalidArgument(format!("{what} cannot be empty")));
    }
    Ok(())
}
