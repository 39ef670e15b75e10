//! Managed-property change set.
//!
//! Callers edit managed properties incrementally: add a few values, drop a
//! key, replace a whole namespace, add again. The catalog accepts a single
//! patch per entity, so the edits are folded locally into three channels:
//!
//! - `add`: namespace → key → value, merged into whatever exists remotely
//! - `del`: property keys to remove
//! - `set`: an optional full snapshot that replaces the remote namespaces
//!
//! Folding is order-sensitive. After every operation no key is both pending
//! addition and pending removal, and no override key is pending removal.

use crate::{ModelError, ModelResult};
use metawriter_types::{NamespacedProperties, PropertyKey};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::trace;

/// Separator between namespace and key in a qualified removal key.
pub const NAMESPACE_SEPARATOR: char = '.';

/// How a removal key is matched against namespaced property keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemovalScope {
    /// A removal key matches the property of that name in every namespace.
    #[default]
    AnyNamespace,
    /// Removal keys are written `"<namespace>.<key>"` and only match that
    /// namespace. Unqualified keys still match every namespace.
    Namespace,
}

impl RemovalScope {
    /// Returns true if `removal` targets `key` inside `namespace`.
    #[must_use]
    pub fn matches(self, removal: &str, namespace: &str, key: &str) -> bool {
        match self {
            Self::AnyNamespace => removal == key,
            Self::Namespace => match removal.split_once(NAMESPACE_SEPARATOR) {
                Some((ns, k)) => ns == namespace && k == key,
                None => removal == key,
            },
        }
    }

    fn check_removal_key(self, removal: &str) -> ModelResult<()> {
        if removal.trim().is_empty() {
            return Err(ModelError::InvalidArgument("empty removal key".into()));
        }
        if self == Self::Namespace
            && let Some((ns, key)) = removal.split_once(NAMESPACE_SEPARATOR)
            && (ns.is_empty() || key.is_empty())
        {
            return Err(ModelError::InvalidArgument(format!(
                "malformed qualified removal key: {removal:?}"
            )));
        }
        Ok(())
    }
}

/// Pending additions, removals and optional override for one entity's
/// managed properties.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChangeSet {
    #[serde(rename = "add", default)]
    additions: NamespacedProperties,

    #[serde(rename = "del", default)]
    removals: BTreeSet<PropertyKey>,

    #[serde(rename = "set", default, skip_serializing_if = "Option::is_none")]
    overrides: Option<NamespacedProperties>,

    #[serde(skip)]
    scope: RemovalScope,
}

impl ChangeSet {
    /// Creates an empty change set with the default removal scope.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty change set with the given removal scope.
    #[must_use]
    pub fn with_scope(scope: RemovalScope) -> Self {
        Self {
            scope,
            ..Self::default()
        }
    }

    /// Returns an independent deep copy of `other`.
    #[must_use]
    pub fn copy_of(other: &Self) -> Self {
        other.clone()
    }

    /// Merges properties into the pending additions.
    ///
    /// A newer value for a key replaces the pending one. Each added key
    /// cancels a pending removal of that key and drops the key from the
    /// override snapshot of the same namespace.
    pub fn record_additions(&mut self, properties: NamespacedProperties) -> ModelResult<()> {
        check_properties(&properties)?;
        let scope = self.scope;

        for (namespace, props) in properties {
            for key in props.keys() {
                self.removals
                    .retain(|removal| !scope.matches(removal, &namespace, key));
            }

            if let Some(snapshot) = self
                .overrides
                .as_mut()
                .and_then(|overrides| overrides.get_mut(&namespace))
            {
                snapshot.retain(|key, _| !props.contains_key(key));
            }

            if !props.is_empty() {
                self.additions.entry(namespace).or_default().extend(props);
            }
        }

        self.trace_state("record_additions");
        Ok(())
    }

    /// Marks property keys for removal.
    ///
    /// Each key is stripped from the pending additions and from the
    /// override snapshot in every namespace it matches.
    pub fn record_removals<I, S>(&mut self, keys: I) -> ModelResult<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<PropertyKey>,
    {
        let keys: Vec<PropertyKey> = keys.into_iter().map(Into::into).collect();
        for key in &keys {
            self.scope.check_removal_key(key)?;
        }
        let scope = self.scope;

        for removal in keys {
            for (namespace, props) in self.additions.iter_mut() {
                props.retain(|key, _| !scope.matches(&removal, namespace, key));
            }
            if let Some(overrides) = self.overrides.as_mut() {
                for (namespace, props) in overrides.iter_mut() {
                    props.retain(|key, _| !scope.matches(&removal, namespace, key));
                }
            }
            self.removals.insert(removal);
        }
        self.additions.retain(|_, props| !props.is_empty());

        self.trace_state("record_removals");
        Ok(())
    }

    /// Replaces the override snapshot wholesale.
    ///
    /// `None` or an empty map clears the override. Otherwise every key in
    /// the snapshot cancels pending removals of that key and pending
    /// additions of that key in the same namespace, and any earlier
    /// snapshot is discarded entirely.
    pub fn record_override(
        &mut self,
        properties: Option<NamespacedProperties>,
    ) -> ModelResult<()> {
        let Some(properties) = properties.filter(|p| !p.is_empty()) else {
            self.overrides = None;
            self.trace_state("record_override");
            return Ok(());
        };
        check_properties(&properties)?;
        let scope = self.scope;

        for (namespace, props) in &properties {
            for key in props.keys() {
                self.removals
                    .retain(|removal| !scope.matches(removal, namespace, key));
            }
            if let Some(pending) = self.additions.get_mut(namespace) {
                pending.retain(|key, _| !props.contains_key(key));
            }
        }
        self.additions.retain(|_, props| !props.is_empty());
        self.overrides = Some(properties);

        self.trace_state("record_override");
        Ok(())
    }

    /// Clears all three channels. The removal scope is kept.
    pub fn reset(&mut self) {
        self.additions.clear();
        self.removals.clear();
        self.overrides = None;
    }

    /// Pending additions.
    #[must_use]
    pub fn additions(&self) -> &NamespacedProperties {
        &self.additions
    }

    /// Pending removal keys.
    #[must_use]
    pub fn removals(&self) -> &BTreeSet<PropertyKey> {
        &self.removals
    }

    /// The override snapshot, if one was recorded.
    #[must_use]
    pub fn override_properties(&self) -> Option<&NamespacedProperties> {
        self.overrides.as_ref()
    }

    /// Whether a full replacement must be sent.
    #[must_use]
    pub fn has_override(&self) -> bool {
        self.overrides.is_some()
    }

    /// True when nothing is pending on any channel.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.additions.is_empty() && self.removals.is_empty() && self.overrides.is_none()
    }

    /// How removal keys are matched.
    #[must_use]
    pub fn scope(&self) -> RemovalScope {
        self.scope
    }

    fn trace_state(&self, op: &'static str) {
        trace!(
            op,
            additions = self.additions.values().map(|p| p.len()).sum::<usize>(),
            removals = self.removals.len(),
            has_override = self.overrides.is_some(),
            "change set updated"
        );
    }
}

fn check_properties(properties: &NamespacedProperties) -> ModelResult<()> {
    for (namespace, props) in properties {
        if namespace.trim().is_empty() {
            return Err(ModelError::InvalidArgument("empty namespace".into()));
        }
        if let Some(key) = props.keys().find(|key| key.trim().is_empty()) {
            return Err(ModelError::InvalidArgument(format!(
                "empty property key {key:?} in namespace {namespace}"
            )));
        }
    }
    Ok(())
}
