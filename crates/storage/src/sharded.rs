//! Sharded in-memory storage
//!
//! DashMap keyed by [`Key`] with an FxHash build hasher.
//! Lock-free reads, sharded writes, O(1) lookups.
//!
//! # Design
//!
//! - DashMap: 16-way sharded by default, lock-free reads
//! - FxBuildHasher: fast non-crypto hash, keys are plain integers
//! - Global version: bumped once per put, lets callers observe write volume
//! - Commit lock: serializes validated commits and plain puts, so a
//!   commit's check and its writes are never split by another writer.
//!   Reads never take it.

use dashmap::DashMap;
use parking_lot::Mutex;
use rustc_hash::FxHasher;
use std::collections::BTreeMap;
use std::hash::BuildHasherDefault;
use std::sync::atomic::{AtomicU64, Ordering};
use strata_core::{Key, Result, Storage, Value};
use tracing::debug;

type FxBuildHasher = BuildHasherDefault<FxHasher>;

/// In-memory key/value store
///
/// Thread-safe; share it between workers behind an `Arc`.
#[derive(Debug, Default)]
pub struct ShardedStore {
    data: DashMap<Key, Value, FxBuildHasher>,
    version: AtomicU64,
    commit_lock: Mutex<()>,
}

impl ShardedStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store preloaded with `entries`
    pub fn with_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (Key, Value)>,
    {
        let store = Self::new();
        for (key, value) in entries {
            store.data.insert(key, value);
        }
        debug!(target: "strata::storage", keys = store.data.len(), "Preloaded store");
        store
    }

    /// Number of puts applied so far
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }

    fn insert(&self, key: Key, value: Value) {
        self.data.insert(key, value);
        self.version.fetch_add(1, Ordering::AcqRel);
    }

    /// Copy of every entry, sorted by key
    pub fn dump(&self) -> Vec<(Key, Value)> {
        let mut entries: Vec<_> = self
            .data
            .iter()
            .map(|e| (*e.key(), e.value().clone()))
            .collect();
        entries.sort_by_key(|(k, _)| *k);
        entries
    }
}

impl Storage for ShardedStore {
    fn get(&self, key: &Key) -> Result<Option<Value>> {
        Ok(self.data.get(key).map(|e| e.value().clone()))
    }

    fn put(&self, key: Key, value: Value) -> Result<()> {
        let _guard = self.commit_lock.lock();
        self.insert(key, value);
        Ok(())
    }

    fn apply_if_unchanged(
        &self,
        observed: &BTreeMap<Key, Option<Value>>,
        writes: BTreeMap<Key, Value>,
    ) -> Result<Option<Key>> {
        let _guard = self.commit_lock.lock();
        for (key, seen) in observed {
            let current = self.data.get(key);
            if current.as_ref().map(|e| e.value()) != seen.as_ref() {
                return Ok(Some(*key));
            }
        }
        for (key, value) in writes {
            self.insert(key, value);
        }
        Ok(None)
    }

    fn len(&self) -> usize {
        self.data.len()
    }
}
