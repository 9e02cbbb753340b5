//! Keyspace partitioning
//!
//! The keyspace `[0, dbsize)` is split into `thread_count` contiguous,
//! equal-size chunks of `chunk_size = dbsize / thread_count` keys.
//! Partition `i` covers `[i * chunk_size, (i + 1) * chunk_size)`.
//!
//! Integer division leaves a tail of `dbsize % thread_count` keys past the
//! last partition. Those keys belong to no partition and are never produced
//! by the partitioned sampler.

use std::ops::Range;

use strata_core::{Error, Key, Result};

/// Fixed mapping from keys to partitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartitionLayout {
    dbsize: u64,
    thread_count: usize,
    chunk_size: u64,
}

impl PartitionLayout {
    /// Build a layout for `thread_count` partitions over `dbsize` keys
    ///
    /// # Errors
    ///
    /// `InvalidConfig` if `thread_count` is zero or exceeds `dbsize`
    /// (every partition must hold at least one key).
    pub fn new(dbsize: u64, thread_count: usize) -> Result<Self> {
        if thread_count == 0 {
            return Err(Error::invalid_config("thread_count must be at least 1"));
        }
        let chunk_size = dbsize / thread_count as u64;
        if chunk_size == 0 {
            return Err(Error::invalid_config(format!(
                "dbsize {} is smaller than thread_count {}",
                dbsize, thread_count
            )));
        }
        Ok(Self {
            dbsize,
            thread_count,
            chunk_size,
        })
    }

    /// Total keyspace size
    pub fn dbsize(&self) -> u64 {
        self.dbsize
    }

    /// Number of partitions
    pub fn thread_count(&self) -> usize {
        self.thread_count
    }

    /// Keys per partition
    pub fn chunk_size(&self) -> u64 {
        self.chunk_size
    }

    /// Keys covered by partition `index`
    pub fn range(&self, index: usize) -> Range<u64> {
        let start = index as u64 * self.chunk_size;
        start..start + self.chunk_size
    }

    /// Partition holding `key`, `None` for the unreachable tail and
    /// out-of-range keys
    pub fn partition_of(&self, key: Key) -> Option<usize> {
        let index = key.as_u64() / self.chunk_size;
        if index < self.thread_count as u64 {
            Some(index as usize)
        } else {
            None
        }
    }

    /// Keys reachable through some partition
    pub fn reachable_keys(&self) -> u64 {
        self.chunk_size * self.thread_count as u64
    }
}
