//! Canonical class ordering derived from ground-truth labels.

use std::fmt::Debug;

/// Bound for values usable as class labels.
///
/// Anything totally ordered works: integer codes, strings, or small enums.
pub trait ClassLabel: Ord + Clone + Debug + Send + Sync {}

impl<T: Ord + Clone + Debug + Send + Sync> ClassLabel for T {}

/// Sorted, deduplicated set of labels.
///
/// Column `j` of a score matrix belongs to `labels()[j]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassIndex<L> {
    labels: Vec<L>,
}

impl<L: ClassLabel> ClassIndex<L> {
    /// Resolve the class index for a label array.
    pub fn resolve(labels: &[L]) -> Self {
        let mut sorted = labels.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        Self { labels: sorted }
    }

    /// Resolve the index covering every label seen in either array.
    pub fn resolve_union(first: &[L], second: &[L]) -> Self {
        let mut sorted = Vec::with_capacity(first.len() + second.len());
        sorted.extend_from_slice(first);
        sorted.extend_from_slice(second);
        sorted.sort_unstable();
        sorted.dedup();
        Self { labels: sorted }
    }

    /// Number of distinct classes.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Ordered labels.
    pub fn labels(&self) -> &[L] {
        &self.labels
    }

    /// Label stored at `position`.
    pub fn get(&self, position: usize) -> Option<&L> {
        self.labels.get(position)
    }

    /// Column position of `label`, if it is part of the index.
    pub fn position(&self, label: &L) -> Option<usize> {
        self.labels.binary_search(label).ok()
    }
}
