//! Strata workloads - synthetic transactions for stress-testing
//! partitioned transactional key-value stores
//!
//! # Quick Start
//!
//! ```
//! use std::collections::BTreeMap;
//! use strata_workload::{Key, ShardedStore, Transaction, TransactionManager, Value};
//!
//! let store = ShardedStore::new();
//! let manager = TransactionManager::new();
//!
//! let mut values = BTreeMap::new();
//! values.insert(Key::new(3), Value::from("a"));
//! let mut put = Transaction::put(values.clone());
//! assert!(put.execute(&manager, &store).unwrap().is_committed());
//!
//! let mut check = Transaction::expect(values);
//! assert!(check.execute(&manager, &store).unwrap().is_committed());
//! ```
//!
//! # Architecture
//!
//! - `strata-core`: keys, values, errors and the `Storage` / `TxnContext` traits
//! - `strata-storage`: in-memory `ShardedStore`
//! - `strata-concurrency`: `TransactionContext` and `TransactionManager`
//! - `strata-txn`: transaction variants, key sampler, workload generator

pub use strata_concurrency::{
    ManagerStats, MonotonicClock, SteppingClock, TransactionContext, TransactionManager,
};
pub use strata_core::{Clock, Error, Key, KeySet, Result, Storage, TxnContext, TxnStatus, Value};
pub use strata_storage::ShardedStore;
pub use strata_txn::*;
