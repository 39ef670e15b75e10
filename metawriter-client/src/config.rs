//! Writer configuration.
//!
//! Loaded from TOML; every field has a default so an empty file is valid.
//!
//! ```toml
//! removal_scope = "namespace"
//! require_identity = false
//! log_filter = "metawriter_client=debug,info"
//! ```

use crate::error::ConfigError;
use metawriter_model::RemovalScope;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Configuration for a [`MetaWriter`](crate::MetaWriter) session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WriterConfig {
    /// How removal keys match namespaced properties in new change sets.
    pub removal_scope: RemovalScope,
    /// Reject edits whose entity the catalog does not know yet.
    pub require_identity: bool,
    /// `tracing` filter directive used by [`init_logging`](crate::init_logging).
    pub log_filter: String,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            removal_scope: RemovalScope::AnyNamespace,
            require_identity: true,
            log_filter: "info".to_string(),
        }
    }
}

impl WriterConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Reads and parses a TOML configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }
}
