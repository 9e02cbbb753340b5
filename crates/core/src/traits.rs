//! Core traits for storage and transaction execution
//!
//! This module defines the seams between generated transactions and the
//! systems they exercise:
//! - `Storage`: key/value persistence backend
//! - `TxnContext`: the primitives a running transaction is handed
//! - `Clock`: monotonic time source used to bound simulated work

use std::collections::BTreeMap;
use std::time::Duration;

use crate::error::Result;
use crate::types::Key;
use crate::value::Value;

/// Storage abstraction for key/value backends
///
/// Thread safety: All methods must be safe to call concurrently from
/// multiple threads (requires Send + Sync).
pub trait Storage: Send + Sync {
    /// Get current value for key
    ///
    /// Returns None if the key doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn get(&self, key: &Key) -> Result<Option<Value>>;

    /// Put key-value pair, replacing any previous value
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn put(&self, key: Key, value: Value) -> Result<()>;

    /// Apply `writes` only if every key in `observed` still holds the value
    /// recorded for it (`None` meaning absent)
    ///
    /// Validation and application must be atomic with respect to other
    /// calls. Returns the first key whose value changed, in which case
    /// nothing is applied.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn apply_if_unchanged(
        &self,
        observed: &BTreeMap<Key, Option<Value>>,
        writes: BTreeMap<Key, Value>,
    ) -> Result<Option<Key>>;

    /// Number of keys currently stored
    fn len(&self) -> usize;

    /// Whether the store holds no keys
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Primitives supplied to a transaction while it runs
///
/// The context is bound to one execution of one transaction. Every key
/// passed to `read` must be declared in the readset or writeset, and every
/// key passed to `write` must be declared in the writeset. Exactly one of
/// `commit` or `abort` terminates the execution.
pub trait TxnContext {
    /// Read the current value of `key`, `None` if absent
    fn read(&mut self, key: Key) -> Result<Option<Value>>;

    /// Write `value` under `key`
    fn write(&mut self, key: Key, value: Value) -> Result<()>;

    /// Terminal signal: the transaction succeeded
    ///
    /// A context that validates reads may refuse the commit with
    /// `Error::Conflict`. The execution is then already aborted and no
    /// further signal is expected.
    fn commit(&mut self) -> Result<()>;

    /// Terminal signal: the transaction gave up
    fn abort(&mut self, reason: String) -> Result<()>;

    /// Monotonic time elapsed since this context began
    fn elapsed(&self) -> Duration;
}

/// Monotonic time source
///
/// Readings are measured from an arbitrary fixed origin and never go
/// backwards.
pub trait Clock: Send + Sync {
    /// Current reading
    fn now(&self) -> Duration;
}
