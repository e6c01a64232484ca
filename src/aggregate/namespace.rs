use indexmap::IndexMap;
use thiserror::Error;

use super::TargetRecord;
use crate::devicetree::AddressResolver;

#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum NamespaceError {
    #[error("namespace key '{0}' is already defined")]
    DuplicateKey(String),
}

/// What happens when a key is inserted twice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CollisionPolicy {
    /// The later entry replaces the earlier one.
    #[default]
    Overwrite,
    /// A second insertion of the same key is an error.
    Reject,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NamespaceEntry {
    Target(TargetRecord),
    AddressResolver(AddressResolver),
    Value(String),
}

/// Aggregated render namespace, in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregatedNamespace {
    entries: IndexMap<String, NamespaceEntry>,
    policy: CollisionPolicy,
}

impl AggregatedNamespace {
    pub fn new(policy: CollisionPolicy) -> Self {
        Self {
            entries: IndexMap::new(),
            policy,
        }
    }

    pub fn policy(&self) -> CollisionPolicy {
        self.policy
    }

    /// Inserts an entry, honouring the collision policy.
    ///
    /// Under [`CollisionPolicy::Overwrite`] an existing entry keeps its
    /// position and takes the new value.
    pub fn insert(&mut self, key: impl Into<String>, entry: NamespaceEntry) -> Result<(), NamespaceError> {
        let key = key.into();
        if self.entries.contains_key(&key) {
            if self.policy == CollisionPolicy::Reject {
                return Err(NamespaceError::DuplicateKey(key));
            }
            tracing::debug!(key = %key, "overwriting namespace entry");
        }
        self.entries.insert(key, entry);
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&NamespaceEntry> {
        self.entries.get(key)
    }

    pub fn target(&self, key: &str) -> Option<&TargetRecord> {
        match self.get(key)? {
            NamespaceEntry::Target(record) => Some(record),
            _ => None,
        }
    }

    pub fn value(&self, key: &str) -> Option<&str> {
        match self.get(key)? {
            NamespaceEntry::Value(value) => Some(value),
            _ => None,
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &NamespaceEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
