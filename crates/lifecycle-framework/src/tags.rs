//! # Tag Reconciler
//!
//! Computes the minimal edit script that turns a previously applied tag set
//! into a desired one. The two halves of a [`TagDiff`] are disjoint by key, so
//! the order of application does not affect the result; callers still remove
//! before they add because some providers reject overlapping tag operations.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Keys with this prefix are owned by the provider, not the user.
pub const SYSTEM_TAG_PREFIX: &str = "aws:";

/// A set of tags keyed by tag key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagSet(BTreeMap<String, String>);

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a set from possibly-absent values. Entries without a value are
    /// dropped, never stored as an empty string.
    pub fn from_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, Option<V>)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self(
            entries
                .into_iter()
                .filter_map(|(k, v)| v.map(|v| (k.into(), v.into())))
                .collect(),
        )
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.0.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Merges `other` into `self`; on duplicate keys `other` wins.
    pub fn extend(&mut self, other: TagSet) {
        self.0.extend(other.0);
    }

    /// The user-visible part of the set.
    pub fn without_system(&self) -> Self {
        Self(
            self.0
                .iter()
                .filter(|(k, _)| !k.starts_with(SYSTEM_TAG_PREFIX))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        )
    }

    pub fn into_inner(self) -> BTreeMap<String, String> {
        self.0
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for TagSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl IntoIterator for TagSet {
    type Item = (String, String);
    type IntoIter = std::collections::btree_map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// The three provenance layers a desired tag set is assembled from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagLayers {
    pub resource: TagSet,
    pub stack: TagSet,
    pub system: TagSet,
}

impl TagLayers {
    /// Resource tags override stack tags, which override system tags.
    pub fn merged(&self) -> TagSet {
        let mut merged = self.system.clone();
        merged.extend(self.stack.clone());
        merged.extend(self.resource.clone());
        merged
    }
}

/// The edit script produced by [`diff`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagDiff {
    pub to_add: TagSet,
    pub to_remove: BTreeSet<String>,
}

impl TagDiff {
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }

    /// Applies the script to `previous`, removals first.
    pub fn apply(&self, previous: &TagSet) -> TagSet {
        let mut result = previous.clone();
        for key in &self.to_remove {
            result.remove(key);
        }
        result.extend(self.to_add.clone());
        result
    }
}

/// Computes which tags to add (new or changed value) and which keys to remove.
pub fn diff(previous: &TagSet, desired: &TagSet) -> TagDiff {
    let to_add = desired
        .iter()
        .filter(|(k, v)| previous.get(k) != Some(*v))
        .collect();
    let to_remove = previous
        .keys()
        .filter(|k| !desired.contains_key(k))
        .map(str::to_owned)
        .collect();
    TagDiff { to_add, to_remove }
}

/// Fast-path guard: false means no tag call needs to be issued at all.
pub fn needs_reconciliation(previous: &TagSet, desired: &TagSet) -> bool {
    previous != desired
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn tags(entries: &[(&str, &str)]) -> TagSet {
        entries.iter().copied().collect()
    }

    #[test]
    fn diff_covers_new_changed_and_removed() {
        let previous = tags(&[("env", "dev"), ("team", "core"), ("old", "x")]);
        let desired = tags(&[("env", "prod"), ("team", "core"), ("new", "y")]);

        let d = diff(&previous, &desired);
        assert_eq!(d.to_add, tags(&[("env", "prod"), ("new", "y")]));
        assert_eq!(d.to_remove, BTreeSet::from(["old".to_string()]));
        assert_eq!(d.apply(&previous), desired);
    }

    #[test]
    fn absent_values_are_dropped() {
        let set = TagSet::from_entries([("a", Some("1")), ("b", None), ("c", Some(""))]);
        assert_eq!(set.len(), 2);
        assert!(!set.contains_key("b"));
        assert_eq!(set.get("c"), Some(""));
    }

    #[test]
    fn layers_merge_with_resource_precedence() {
        let layers = TagLayers {
            resource: tags(&[("owner", "alice")]),
            stack: tags(&[("owner", "stack"), ("stage", "beta")]),
            system: tags(&[("aws:cloudformation:stack-name", "s1"), ("stage", "sys")]),
        };
        let merged = layers.merged();
        assert_eq!(merged.get("owner"), Some("alice"));
        assert_eq!(merged.get("stage"), Some("beta"));
        assert_eq!(merged.len(), 3);
        assert_eq!(merged.without_system().len(), 2);
    }

    fn tag_set() -> impl Strategy<Value = TagSet> {
        prop::collection::btree_map("[a-d]{1,2}", "[x-z]{0,2}", 0..8).prop_map(TagSet)
    }

    proptest! {
        #[test]
        fn diff_is_disjoint_and_reaches_desired(previous in tag_set(), desired in tag_set()) {
            let d = diff(&previous, &desired);
            for key in d.to_add.keys() {
                prop_assert!(!d.to_remove.contains(key));
            }
            prop_assert_eq!(d.apply(&previous), desired);
        }

        #[test]
        fn reconciliation_guard_matches_diff(previous in tag_set(), desired in tag_set()) {
            prop_assert!(!needs_reconciliation(&previous, &previous));
            let d = diff(&previous, &desired);
            prop_assert_eq!(!d.is_empty(), needs_reconciliation(&previous, &desired));
        }
    }
}
