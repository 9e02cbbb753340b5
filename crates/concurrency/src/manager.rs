//! Transaction manager
//!
//! Hands out execution contexts with unique transaction ids and keeps
//! outcome counters. Safe to share between worker threads.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use strata_core::{Clock, KeySet, Storage, TxnStatus};

use crate::transaction::TransactionContext;

/// Snapshot of the manager's outcome counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ManagerStats {
    /// Transactions begun
    pub started: u64,
    /// Transactions recorded as committed
    pub committed: u64,
    /// Transactions recorded as aborted
    pub aborted: u64,
}

impl ManagerStats {
    /// Transactions begun but not recorded with a terminal outcome
    pub fn in_flight(&self) -> u64 {
        self.started
            .saturating_sub(self.committed)
            .saturating_sub(self.aborted)
    }
}

/// Issues transaction contexts and counts outcomes
#[derive(Debug, Default)]
pub struct TransactionManager {
    /// Next transaction ID
    next_txn_id: AtomicU64,
    committed: AtomicU64,
    aborted: AtomicU64,
}

impl TransactionManager {
    /// Create a new transaction manager
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate next transaction ID
    pub fn next_txn_id(&self) -> u64 {
        self.next_txn_id.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Begin a transaction with the given manifest
    pub fn begin<'a, S: Storage + ?Sized>(
        &self,
        store: &'a S,
        readset: &KeySet,
        writeset: &KeySet,
    ) -> TransactionContext<'a, S> {
        TransactionContext::new(self.next_txn_id(), store, readset, writeset)
    }

    /// Begin a transaction whose elapsed time comes from `clock`
    pub fn begin_with_clock<'a, S: Storage + ?Sized>(
        &self,
        store: &'a S,
        readset: &KeySet,
        writeset: &KeySet,
        clock: Arc<dyn Clock>,
    ) -> TransactionContext<'a, S> {
        TransactionContext::with_clock(self.next_txn_id(), store, readset, writeset, clock)
    }

    /// Record the outcome of a finished transaction
    ///
    /// `Pending` is ignored.
    pub fn record(&self, status: &TxnStatus) {
        match status {
            TxnStatus::Committed => {
                self.committed.fetch_add(1, Ordering::Relaxed);
            }
            TxnStatus::Aborted { .. } => {
                self.aborted.fetch_add(1, Ordering::Relaxed);
            }
            TxnStatus::Pending => {}
        }
    }

    /// Current counters
    pub fn stats(&self) -> ManagerStats {
        ManagerStats {
            started: self.next_txn_id.load(Ordering::SeqCst),
            committed: self.committed.load(Ordering::Relaxed),
            aborted: self.aborted.load(Ordering::Relaxed),
        }
    }
}
