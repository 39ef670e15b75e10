//! Managed property values.
//!
//! The catalog accepts three shapes of managed property value: a single
//! string, a boolean, or a set of strings. The reconciliation engine moves
//! values around without ever looking inside them.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Name of a managed-property namespace (e.g. `"Basic_Property"`).
pub type Namespace = String;

/// Name of a property, unique within its namespace.
pub type PropertyKey = String;

/// The properties of one namespace.
pub type PropertyMap = BTreeMap<PropertyKey, PropertyValue>;

/// Namespace → property name → value.
pub type NamespacedProperties = BTreeMap<Namespace, PropertyMap>;

/// A managed property value.
///
/// Serialized untagged, so the wire form is a plain JSON string, boolean,
/// or array of strings.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    /// A single text value.
    Text(String),
    /// A boolean flag.
    Boolean(bool),
    /// A multi-valued text property.
    MultiText(BTreeSet<String>),
}

impl PropertyValue {
    /// Builds a multi-valued property from any iterator of strings.
    pub fn multi<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::MultiText(values.into_iter().map(Into::into).collect())
    }

    /// Returns the text if this is a single-valued text property.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the flag if this is a boolean property.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the values if this is a multi-valued property.
    #[must_use]
    pub fn as_multi(&self) -> Option<&BTreeSet<String>> {
        match self {
            Self::MultiText(values) => Some(values),
            _ => None,
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<bool> for PropertyValue {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<BTreeSet<String>> for PropertyValue {
    fn from(values: BTreeSet<String>) -> Self {
        Self::MultiText(values)
    }
}

impl FromIterator<String> for PropertyValue {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self::MultiText(iter.into_iter().collect())
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::MultiText(values) => {
                let joined: Vec<&str> = values.iter().map(String::as_str).collect();
                write!(f, "[{}]", joined.join(", "))
            }
        }
    }
}
