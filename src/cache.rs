//! Cross-vehicle memoization of computed tables.
//!
//! Many vehicles mount the same gun and therefore the same shell
//! definitions; the cache collapses those to one computation per unique
//! fingerprint for the duration of a generation run. Nothing is persisted
//! across runs.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::fingerprint::ShellFingerprint;
use crate::table::BallisticTable;

/// Concurrent fingerprint → table store with at-most-one computation per
/// key.
///
/// `get_or_compute` runs the compute closure under the key's shard entry
/// lock, so a second worker requesting an in-flight key blocks until the
/// first insert completes and then reads the shared result. Entries are
/// write-once `Arc`s; no table is ever replaced or mutated.
#[derive(Debug, Default)]
pub struct BallisticCache {
    map: DashMap<ShellFingerprint, Arc<BallisticTable>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl BallisticCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the table for `key`, computing and inserting it on first use.
    pub fn get_or_compute<F>(&self, key: ShellFingerprint, compute: F) -> Arc<BallisticTable>
    where
        F: FnOnce() -> BallisticTable,
    {
        // Fast read path: most lookups after warmup are hits and take no
        // write lock.
        if let Some(entry) = self.map.get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Arc::clone(&entry);
        }

        match self.map.entry(key) {
            Entry::Occupied(entry) => {
                // Lost the race to another worker; its result is ours.
                self.hits.fetch_add(1, Ordering::Relaxed);
                Arc::clone(entry.get())
            }
            Entry::Vacant(slot) => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                let table = Arc::new(compute());
                slot.insert(Arc::clone(&table));
                table
            }
        }
    }

    /// Number of lookups served from an existing entry.
    #[must_use]
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Number of lookups that ran the computation.
    #[must_use]
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// Number of unique tables stored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
