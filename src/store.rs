//! Shared ingestion plumbing for the attainment stores
//!
//! Both stores are flat ordered maps keyed by a composite key ending with the
//! run index. Runs are numbered per instance: the next run of an instance gets
//! the number of runs already stored for it.

use std::hash::Hash;

use rustc_hash::FxHashMap;

/// Number of stored runs per instance key.
#[derive(Debug, Clone)]
pub(crate) struct RunCounter<K> {
    counts: FxHashMap<K, usize>,
}

impl<K> Default for RunCounter<K> {
    fn default() -> Self {
        Self {
            counts: FxHashMap::default(),
        }
    }
}

impl<K: Hash + Eq> RunCounter<K> {
    /// Index the next run of `instance` will get.
    pub(crate) fn next_run(&self, instance: &K) -> usize {
        self.counts.get(instance).copied().unwrap_or(0)
    }

    /// Record that `run` now exists for `instance`.
    pub(crate) fn record(&mut self, instance: K, run: usize) {
        let count = self.counts.entry(instance).or_insert(0);
        *count = (*count).max(run + 1);
    }

    /// Number of runs stored for every instance seen so far.
    pub(crate) fn counts(&self) -> impl Iterator<Item = usize> + '_ {
        self.counts.values().copied()
    }

    pub(crate) fn clear(&mut self) {
        self.counts.clear();
    }
}

/// Number of distinct values in a sorted sequence.
pub(crate) fn count_distinct<T: PartialEq>(values: impl Iterator<Item = T>) -> usize {
    let mut last = None;
    let mut count = 0;
    for value in values {
        if last.as_ref() != Some(&value) {
            count += 1;
            last = Some(value);
        }
    }
    count
}
