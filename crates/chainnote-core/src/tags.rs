//! Tag name normalization and association diffing.
//!
//! Tag reconciliation makes a note's tag links match a desired list of names.
//! The storage side lives in `chainnote-db`; the pure parts live here so they
//! can be tested without a database.

use std::collections::BTreeSet;

use crate::defaults::MAX_TAGS_PER_NOTE;

/// Normalize user-supplied tag names.
///
/// Names are trimmed, empty names are dropped, and only the first
/// [`MAX_TAGS_PER_NOTE`] survivors are kept. Duplicates are left in place;
/// they collapse naturally once resolved to tag ids.
pub fn normalize_tag_names<S: AsRef<str>>(names: &[S]) -> Vec<String> {
    let normalized: Vec<String> = names
        .iter()
        .map(|n| n.as_ref().trim())
        .filter(|n| !n.is_empty())
        .take(MAX_TAGS_PER_NOTE)
        .map(str::to_string)
        .collect();

    let non_empty = names
        .iter()
        .filter(|n| !n.as_ref().trim().is_empty())
        .count();
    if non_empty > normalized.len() {
        tracing::warn!(
            supplied = non_empty,
            kept = normalized.len(),
            "Tag list truncated to per-note limit"
        );
    }

    normalized
}

/// Association changes needed to move a note from `current` to `desired`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagDiff {
    /// Tag ids to link.
    pub to_add: Vec<i64>,
    /// Tag ids to unlink.
    pub to_remove: Vec<i64>,
}

impl TagDiff {
    /// Compute the minimal set of link additions and removals.
    pub fn between(current: &BTreeSet<i64>, desired: &BTreeSet<i64>) -> Self {
        Self {
            to_add: desired.difference(current).copied().collect(),
            to_remove: current.difference(desired).copied().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }
}
