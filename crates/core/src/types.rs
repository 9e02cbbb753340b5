//! Core types for Strata workloads
//!
//! This module defines the foundational identifier types:
//! - Key: Integer key addressing a single item in the store
//! - KeySet: Ordered, duplicate-free set of keys (readset / writeset)

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Identifier addressing a single item in the store
///
/// Keys are plain integers in `[0, dbsize)`. They are totally ordered and
/// hashable so they can be used as manifest entries, partition coordinates
/// and storage map keys alike.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Key(u64);

impl Key {
    /// Create a key from its raw integer form
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw integer form of this key
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl From<u64> for Key {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl From<Key> for u64 {
    fn from(key: Key) -> Self {
        key.0
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Declared set of keys a transaction will read or write
///
/// Insertion order is irrelevant and duplicates collapse, so a `BTreeSet`
/// gives deterministic iteration for repeatable runs.
pub type KeySet = BTreeSet<Key>;
