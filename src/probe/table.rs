//! The flat metric key/value table
//!
//! A single table is built per run by merging each collector's output,
//! then handed read-only to the renderer. Keys are the external
//! contract; the category-prefixed naming scheme keeps them disjoint
//! across collectors, so a collision can only mean a collector bug.

use std::collections::BTreeMap;

/// Sparse mapping from metric key to formatted value
///
/// Backed by a `BTreeMap`, so iteration is already in case-sensitive
/// ordinal key order.
#[derive(Debug, Clone, Default)]
pub struct MetricTable {
    values: BTreeMap<String, String>,
}

impl MetricTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert one metric
    ///
    /// # Panics
    /// Panics on a duplicate key. The naming scheme guarantees
    /// disjoint keys; a collision is a programming error, not a
    /// runtime condition.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let previous = self.values.insert(key.clone(), value.into());
        assert!(
            previous.is_none(),
            "duplicate metric key: {:?} (collector naming scheme violated)",
            key
        );
    }

    /// Fold another table into this one, under the same collision rule
    pub fn merge(&mut self, other: MetricTable) {
        for (key, value) in other.values {
            self.insert(key, value);
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(|v| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// All keys in ordinal sort order
    pub fn sorted_keys(&self) -> Vec<&str> {
        self.values.keys().map(|k| k.as_str()).collect()
    }

    /// Key/value pairs in ordinal key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
