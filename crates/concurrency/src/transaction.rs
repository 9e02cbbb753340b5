//! Transaction execution context
//!
//! A `TransactionContext` is what a generated transaction sees while it
//! runs: `read`, `write`, `commit`, `abort` and an elapsed-time reading.
//! The declared readset/writeset handed to the context up front is the
//! manifest an external scheduler would lock or route on, so the context
//! refuses any access outside it.
//!
//! # Read-Your-Writes Semantics
//!
//! When reading a key, the context checks in order:
//! 1. **write buffer**: Returns the uncommitted write from this execution
//! 2. **store**: Returns the committed value
//!
//! # Lifecycle
//!
//! 1. **BEGIN**: Create with `new()` or `with_clock()`, status is `Pending`
//! 2. **READ/WRITE**: Writes are buffered, never visible before commit
//! 3. **COMMIT/ABORT**: Exactly one terminal signal. Commit applies the
//!    buffer to the store, abort discards it.
//!
//! # Commit Validation
//!
//! First-committer-wins on the read set. Every value served from the store
//! is recorded the first time its key is read. Commit applies the buffer
//! only if each recorded key still holds that value, checked atomically by
//! [`Storage::apply_if_unchanged`]. Otherwise the execution ends `Aborted`
//! and commit returns `Error::Conflict`. Blind writes never conflict.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use strata_core::{
    AccessKind, Clock, Error, Key, KeySet, Result, Storage, TxnContext, TxnStatus, Value,
};
use tracing::{debug, trace};

use crate::clock::MonotonicClock;

/// Execution context for one run of one transaction
pub struct TransactionContext<'a, S: Storage + ?Sized> {
    /// Unique transaction ID
    txn_id: u64,
    store: &'a S,
    readset: KeySet,
    writeset: KeySet,
    /// Values seen in the store, validated at commit
    read_set: BTreeMap<Key, Option<Value>>,
    /// Buffered writes, applied at commit
    write_buffer: BTreeMap<Key, Value>,
    status: TxnStatus,
    clock: Arc<dyn Clock>,
    started: Duration,
}

impl<'a, S: Storage + ?Sized> TransactionContext<'a, S> {
    /// Create a context backed by a wall-clock time source
    pub fn new(txn_id: u64, store: &'a S, readset: &KeySet, writeset: &KeySet) -> Self {
        Self::with_clock(
            txn_id,
            store,
            readset,
            writeset,
            Arc::new(MonotonicClock::new()),
        )
    }

    /// Create a context with an explicit time source
    pub fn with_clock(
        txn_id: u64,
        store: &'a S,
        readset: &KeySet,
        writeset: &KeySet,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let started = clock.now();
        Self {
            txn_id,
            store,
            readset: readset.clone(),
            writeset: writeset.clone(),
            read_set: BTreeMap::new(),
            write_buffer: BTreeMap::new(),
            status: TxnStatus::Pending,
            clock,
            started,
        }
    }

    /// Unique transaction ID
    pub fn txn_id(&self) -> u64 {
        self.txn_id
    }

    /// Current status
    pub fn status(&self) -> &TxnStatus {
        &self.status
    }

    /// Number of writes buffered and not yet applied
    pub fn pending_writes(&self) -> usize {
        self.write_buffer.len()
    }

    fn ensure_pending(&self, op: &str) -> Result<()> {
        if self.status.is_terminal() {
            return Err(Error::invalid_state(format!(
                "cannot {} in transaction {}: already {:?}",
                op, self.txn_id, self.status
            )));
        }
        Ok(())
    }
}

impl<'a, S: Storage + ?Sized> TxnContext for TransactionContext<'a, S> {
    fn read(&mut self, key: Key) -> Result<Option<Value>> {
        self.ensure_pending("read")?;
        if !self.readset.contains(&key) && !self.writeset.contains(&key) {
            return Err(Error::UndeclaredAccess {
                key,
                op: AccessKind::Read,
            });
        }
        if let Some(value) = self.write_buffer.get(&key) {
            return Ok(Some(value.clone()));
        }
        if let Some(seen) = self.read_set.get(&key) {
            return Ok(seen.clone());
        }
        let value = self.store.get(&key)?;
        self.read_set.insert(key, value.clone());
        Ok(value)
    }

    fn write(&mut self, key: Key, value: Value) -> Result<()> {
        self.ensure_pending("write")?;
        if !self.writeset.contains(&key) {
            return Err(Error::UndeclaredAccess {
                key,
                op: AccessKind::Write,
            });
        }
        self.write_buffer.insert(key, value);
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        self.ensure_pending("commit")?;
        let writes = std::mem::take(&mut self.write_buffer);
        let applied = writes.len();
        let read_set = std::mem::take(&mut self.read_set);
        if let Some(key) = self.store.apply_if_unchanged(&read_set, writes)? {
            let reason = format!("read-write conflict on key {}", key);
            debug!(target: "strata::txn", txn_id = self.txn_id, key = %key, "Commit validation failed");
            self.status = TxnStatus::Aborted { reason };
            return Err(Error::Conflict { key });
        }
        self.status = TxnStatus::Committed;
        trace!(target: "strata::txn", txn_id = self.txn_id, applied, "Transaction committed");
        Ok(())
    }

    fn abort(&mut self, reason: String) -> Result<()> {
        self.ensure_pending("abort")?;
        self.write_buffer.clear();
        self.read_set.clear();
        debug!(target: "strata::txn", txn_id = self.txn_id, reason = %reason, "Transaction aborted");
        self.status = TxnStatus::Aborted { reason };
        Ok(())
    }

    fn elapsed(&self) -> Duration {
        self.clock.now().saturating_sub(self.started)
    }
}
