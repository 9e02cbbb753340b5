//! Random key-set generation
//!
//! Two modes:
//! - **uniform**: unique keys drawn from the whole keyspace `[0, dbsize)`
//! - **partitioned**: keys confined to exactly `k` of `thread_count`
//!   partitions (see [`PartitionLayout`]), every target partition holding
//!   at least one key
//!
//! Capacity is checked before any draw, so a request that passes the checks
//! always succeeds. Uniform sampling draws every key in one pass with
//! `rand::seq::index::sample`. Partitioned sampling rejection-samples inside
//! a target chunk: a draw that collides with a key already taken is thrown
//! away and redrawn. After `max_draw_attempts` collisions the key is picked
//! uniformly from the chunk's remaining free keys instead.
//!
//! # Partitioned allocation
//!
//! ```text
//! targets = k distinct partitions, uniformly at random
//! for each write key, then each read key:
//!     coverage phase (fewer than k keys placed so far):
//!         next uncovered target, in target order
//!     fill phase:
//!         uniformly random target that still has a free key
//!     draw a fresh key inside that target's chunk
//! ```
//!
//! The coverage counter is shared by the writeset and readset loops, so
//! `readset_size + writeset_size >= k` is enough for every target to be
//! covered.

use std::ops::Range;

use rand::seq::{index, IteratorRandom, SliceRandom};
use rand::Rng;
use strata_core::{Error, Key, KeySet, Result};
use tracing::{debug, trace};

use crate::partition::PartitionLayout;

/// Default number of rejected draws before falling back to a free-key scan
pub const DEFAULT_MAX_DRAW_ATTEMPTS: usize = 100_000;

/// Readset and writeset produced by the sampler
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SampledKeys {
    /// Keys to read
    pub readset: KeySet,
    /// Keys to write, disjoint from `readset`
    pub writeset: KeySet,
    /// Partitions chosen as targets, in selection order
    ///
    /// Empty for uniform sampling.
    pub target_partitions: Vec<usize>,
}

impl SampledKeys {
    /// Total number of keys across both sets
    pub fn len(&self) -> usize {
        self.readset.len() + self.writeset.len()
    }

    /// Whether no keys were sampled
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `key` is already in either set
    pub fn contains(&self, key: &Key) -> bool {
        self.readset.contains(key) || self.writeset.contains(key)
    }
}

/// Which set the next key goes to
#[derive(Debug, Clone, Copy)]
enum Side {
    Read,
    Write,
}

/// Placement bookkeeping for the partitioned mode
struct Placement {
    targets: Vec<usize>,
    /// Keys placed per target slot
    occupancy: Vec<u64>,
    /// Targets covered so far
    covered: usize,
    chunk_size: u64,
}

impl Placement {
    fn next_slot<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<usize> {
        if self.covered < self.targets.len() {
            let slot = self.covered;
            self.covered += 1;
            return Ok(slot);
        }
        let open: Vec<usize> = (0..self.targets.len())
            .filter(|&slot| self.occupancy[slot] < self.chunk_size)
            .collect();
        open.choose(rng)
            .copied()
            .ok_or_else(|| Error::invalid_state("all target partitions are full"))
    }
}

/// Random key-set generator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeySampler {
    max_draw_attempts: usize,
}

impl Default for KeySampler {
    fn default() -> Self {
        Self {
            max_draw_attempts: DEFAULT_MAX_DRAW_ATTEMPTS,
        }
    }
}

impl KeySampler {
    /// Create a sampler with the default retry budget
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the per-key rejection budget (at least one draw)
    pub fn with_max_draw_attempts(mut self, attempts: usize) -> Self {
        self.max_draw_attempts = attempts.max(1);
        self
    }

    /// Per-key rejection budget
    pub fn max_draw_attempts(&self) -> usize {
        self.max_draw_attempts
    }

    /// Draw unique keys uniformly from `[0, dbsize)`
    ///
    /// All `readset_size + writeset_size` keys are drawn at once; the first
    /// `readset_size` form the readset and the rest the writeset.
    ///
    /// # Errors
    ///
    /// - `InvalidConfig` if `dbsize < readset_size + writeset_size`, or
    ///   `dbsize` does not fit in `usize` on this target
    pub fn uniform<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        dbsize: u64,
        readset_size: usize,
        writeset_size: usize,
    ) -> Result<SampledKeys> {
        check_keyspace(dbsize, readset_size, writeset_size)?;
        let length = usize::try_from(dbsize).map_err(|_| {
            Error::invalid_config(format!("dbsize {} does not fit in usize", dbsize))
        })?;

        let mut keys = SampledKeys::default();
        let drawn = index::sample(rng, length, readset_size + writeset_size);
        for (i, raw) in drawn.into_iter().enumerate() {
            let key = Key::new(raw as u64);
            if i < readset_size {
                keys.readset.insert(key);
            } else {
                keys.writeset.insert(key);
            }
        }

        debug!(
            target: "strata::workload",
            dbsize, readset_size, writeset_size,
            "Sampled uniform key sets"
        );
        Ok(keys)
    }

    /// Draw unique keys spread over exactly `min(partitions, thread_count)`
    /// partitions
    ///
    /// # Errors
    ///
    /// - `InvalidConfig` if `dbsize < readset_size + writeset_size`, the
    ///   layout is invalid (see [`PartitionLayout::new`]), `partitions` is
    ///   zero for a non-empty request, fewer keys than target partitions are
    ///   requested, or the target partitions cannot hold all keys
    pub fn partitioned<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        dbsize: u64,
        readset_size: usize,
        writeset_size: usize,
        partitions: usize,
        thread_count: usize,
    ) -> Result<SampledKeys> {
        check_keyspace(dbsize, readset_size, writeset_size)?;
        let layout = PartitionLayout::new(dbsize, thread_count)?;

        let total = readset_size + writeset_size;
        let k = partitions.min(thread_count);
        if k == 0 {
            if total == 0 {
                return Ok(SampledKeys::default());
            }
            return Err(Error::invalid_config(
                "partitions must be at least 1 for a non-empty transaction",
            ));
        }
        if total < k {
            return Err(Error::invalid_config(format!(
                "{} keys cannot cover {} partitions",
                total, k
            )));
        }
        let capacity = k as u64 * layout.chunk_size();
        if total as u64 > capacity {
            return Err(Error::invalid_config(format!(
                "{} keys exceed capacity {} of {} partitions with chunk size {}",
                total,
                capacity,
                k,
                layout.chunk_size()
            )));
        }

        let mut placement = Placement {
            targets: index::sample(rng, thread_count, k).into_vec(),
            occupancy: vec![0; k],
            covered: 0,
            chunk_size: layout.chunk_size(),
        };

        let mut keys = SampledKeys::default();
        for _ in 0..writeset_size {
            self.place(rng, &layout, &mut placement, &mut keys, Side::Write)?;
        }
        for _ in 0..readset_size {
            self.place(rng, &layout, &mut placement, &mut keys, Side::Read)?;
        }
        keys.target_partitions = placement.targets;

        debug!(
            target: "strata::workload",
            dbsize,
            readset_size,
            writeset_size,
            thread_count,
            targets = ?keys.target_partitions,
            "Sampled partitioned key sets"
        );
        Ok(keys)
    }

    fn place<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        layout: &PartitionLayout,
        placement: &mut Placement,
        keys: &mut SampledKeys,
        side: Side,
    ) -> Result<()> {
        let slot = placement.next_slot(rng)?;
        let key = self.draw(rng, layout.range(placement.targets[slot]), keys)?;
        placement.occupancy[slot] += 1;
        match side {
            Side::Read => keys.readset.insert(key),
            Side::Write => keys.writeset.insert(key),
        };
        Ok(())
    }

    /// Pick one key in `range` not yet in `taken`
    ///
    /// Rejection-samples up to the budget, then chooses uniformly among the
    /// free keys left in `range`.
    fn draw<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        range: Range<u64>,
        taken: &SampledKeys,
    ) -> Result<Key> {
        for _ in 0..self.max_draw_attempts {
            let key = Key::new(rng.gen_range(range.clone()));
            if !taken.contains(&key) {
                return Ok(key);
            }
        }
        trace!(
            target: "strata::workload",
            start = range.start,
            end = range.end,
            attempts = self.max_draw_attempts,
            "Rejection budget spent, scanning for free keys"
        );
        range
            .clone()
            .map(Key::new)
            .filter(|key| !taken.contains(key))
            .choose(rng)
            .ok_or_else(|| {
                Error::invalid_state(format!(
                    "no free key in [{}, {})",
                    range.start, range.end
                ))
            })
    }
}

fn check_keyspace(dbsize: u64, readset_size: usize, writeset_size: usize) -> Result<()> {
    let total = readset_size as u64 + writeset_size as u64;
    if dbsize < total {
        return Err(Error::invalid_config(format!(
            "dbsize {} is smaller than readset_size {} + writeset_size {}",
            dbsize, readset_size, writeset_size
        )));
    }
    Ok(())
}
