//! Transaction contract
//!
//! A [`Transaction`] is a variant ([`TxnKind`]) plus the readset and
//! writeset it declares up front plus its outcome. The declared sets are a
//! manifest: an external scheduler may lock or route on them before `run`,
//! so `run` never touches a key outside them.
//!
//! # Lifecycle
//!
//! 1. Construct once, with explicit sets or through a randomized
//!    constructor
//! 2. Clone as often as needed; every clone starts `Pending`
//! 3. `run` each copy exactly once against a [`TxnContext`]
//!
//! Abort is a normal outcome reported through [`TxnStatus`], not an error.
//! `Err` is reserved for context failures and misuse.

use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use rand::Rng;
use strata_concurrency::TransactionManager;
use strata_core::{Error, Key, KeySet, Result, Storage, TxnContext, TxnStatus, Value};

use crate::partition::PartitionLayout;
use crate::sampler::{KeySampler, SampledKeys};
use crate::variants::{Expect, Noop, Put, Rmw, Verdict};

/// Variant of a transaction and its variant-specific configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxnKind {
    /// Immediately commits
    Noop(Noop),
    /// Verifies expected values, aborts on mismatch
    Expect(Expect),
    /// Blind writes
    Put(Put),
    /// Read-modify-write with simulated cost
    Rmw(Rmw),
}

impl TxnKind {
    /// Short variant name
    pub fn name(&self) -> &'static str {
        match self {
            TxnKind::Noop(_) => "noop",
            TxnKind::Expect(_) => "expect",
            TxnKind::Put(_) => "put",
            TxnKind::Rmw(_) => "rmw",
        }
    }
}

/// A synthetic transaction
#[derive(Debug, PartialEq, Eq)]
pub struct Transaction {
    kind: TxnKind,
    readset: KeySet,
    writeset: KeySet,
    status: TxnStatus,
}

impl Clone for Transaction {
    /// Copy with the same variant, manifest and configuration, and a fresh
    /// `Pending` outcome
    fn clone(&self) -> Self {
        Self {
            kind: self.kind.clone(),
            readset: self.readset.clone(),
            writeset: self.writeset.clone(),
            status: TxnStatus::Pending,
        }
    }
}

impl Transaction {
    fn with_sets(kind: TxnKind, readset: KeySet, writeset: KeySet) -> Self {
        debug_assert!(readset.is_disjoint(&writeset));
        Self {
            kind,
            readset,
            writeset,
            status: TxnStatus::Pending,
        }
    }

    /// Transaction that declares no keys and commits
    pub fn noop() -> Self {
        Self::with_sets(TxnKind::Noop(Noop), KeySet::new(), KeySet::new())
    }

    /// Verification transaction over `expected`
    pub fn expect(expected: BTreeMap<Key, Value>) -> Self {
        Self::from_expect(Expect::new(expected))
    }

    /// Verification transaction expecting the default value at every key
    pub fn expect_keys(keys: &KeySet) -> Self {
        Self::from_expect(Expect::from_keys(keys))
    }

    fn from_expect(expect: Expect) -> Self {
        let readset = expect.readset();
        Self::with_sets(TxnKind::Expect(expect), readset, KeySet::new())
    }

    /// Blind-write transaction over `values`
    pub fn put(values: BTreeMap<Key, Value>) -> Self {
        let put = Put::new(values);
        let writeset = put.writeset();
        Self::with_sets(TxnKind::Put(put), KeySet::new(), writeset)
    }

    /// Read-modify-write over explicit sets
    ///
    /// # Errors
    ///
    /// `InvalidConfig` if the sets overlap.
    pub fn rmw(readset: KeySet, writeset: KeySet, duration: Duration) -> Result<Self> {
        if let Some(key) = readset.intersection(&writeset).next() {
            return Err(Error::invalid_config(format!(
                "key {} declared in both readset and writeset",
                key
            )));
        }
        Ok(Self::with_sets(
            TxnKind::Rmw(Rmw::new(duration)),
            readset,
            writeset,
        ))
    }

    /// Read-modify-write over sampled keys
    pub fn rmw_sampled(keys: SampledKeys, duration: Duration) -> Self {
        Self::with_sets(
            TxnKind::Rmw(Rmw::new(duration)),
            keys.readset,
            keys.writeset,
        )
    }

    /// Read-modify-write over keys drawn uniformly from `[0, dbsize)`
    ///
    /// # Errors
    ///
    /// See [`KeySampler::uniform`].
    pub fn rmw_random<R: Rng + ?Sized>(
        rng: &mut R,
        dbsize: u64,
        readset_size: usize,
        writeset_size: usize,
        duration: Duration,
    ) -> Result<Self> {
        let keys = KeySampler::new().uniform(rng, dbsize, readset_size, writeset_size)?;
        Ok(Self::rmw_sampled(keys, duration))
    }

    /// Read-modify-write over keys spread across exactly
    /// `min(partitions, thread_count)` partitions
    ///
    /// # Errors
    ///
    /// See [`KeySampler::partitioned`].
    pub fn rmw_partitioned<R: Rng + ?Sized>(
        rng: &mut R,
        dbsize: u64,
        readset_size: usize,
        writeset_size: usize,
        partitions: usize,
        thread_count: usize,
        duration: Duration,
    ) -> Result<Self> {
        let keys = KeySampler::new().partitioned(
            rng,
            dbsize,
            readset_size,
            writeset_size,
            partitions,
            thread_count,
        )?;
        Ok(Self::rmw_sampled(keys, duration))
    }

    /// Variant and its configuration
    pub fn kind(&self) -> &TxnKind {
        &self.kind
    }

    /// Declared readset
    pub fn readset(&self) -> &KeySet {
        &self.readset
    }

    /// Declared writeset
    pub fn writeset(&self) -> &KeySet {
        &self.writeset
    }

    /// Outcome of this copy
    pub fn status(&self) -> &TxnStatus {
        &self.status
    }

    /// Simulated execution cost, zero for variants without one
    pub fn duration(&self) -> Duration {
        match &self.kind {
            TxnKind::Rmw(rmw) => rmw.duration(),
            _ => Duration::ZERO,
        }
    }

    /// Partitions of `layout` touched by the declared keys
    ///
    /// Keys outside every partition are skipped.
    pub fn partitions_touched(&self, layout: &PartitionLayout) -> BTreeSet<usize> {
        self.readset
            .iter()
            .chain(self.writeset.iter())
            .filter_map(|k| layout.partition_of(*k))
            .collect()
    }

    /// Execute against `ctx`, ending with exactly one commit or abort
    ///
    /// # Errors
    ///
    /// - `InvalidState` if this copy already ran to a terminal outcome
    /// - Any error raised by the context; the outcome stays `Pending`
    ///
    /// A commit the context refuses with `Error::Conflict` is not an error:
    /// the outcome is `Aborted` with the conflicting key as the reason.
    pub fn run(&mut self, ctx: &mut dyn TxnContext) -> Result<TxnStatus> {
        if self.status.is_terminal() {
            return Err(Error::invalid_state(format!(
                "{} transaction already finished as {:?}; clone it to run again",
                self.kind.name(),
                self.status
            )));
        }

        let verdict = match &self.kind {
            TxnKind::Noop(noop) => noop.run(ctx)?,
            TxnKind::Expect(expect) => expect.run(ctx)?,
            TxnKind::Put(put) => put.run(ctx)?,
            TxnKind::Rmw(rmw) => rmw.run(&self.readset, &self.writeset, ctx)?,
        };

        self.status = match verdict {
            Verdict::Commit => match ctx.commit() {
                Ok(()) => TxnStatus::Committed,
                Err(Error::Conflict { key }) => TxnStatus::Aborted {
                    reason: format!("read-write conflict on key {}", key),
                },
                Err(e) => return Err(e),
            },
            Verdict::Abort(reason) => {
                ctx.abort(reason.clone())?;
                TxnStatus::Aborted { reason }
            }
        };
        Ok(self.status.clone())
    }

    /// Run in a fresh context from `manager` over `store` and record the
    /// outcome
    pub fn execute<S: Storage + ?Sized>(
        &mut self,
        manager: &TransactionManager,
        store: &S,
    ) -> Result<TxnStatus> {
        let mut ctx = manager.begin(store, &self.readset, &self.writeset);
        let status = self.run(&mut ctx)?;
        manager.record(&status);
        Ok(status)
    }
}
