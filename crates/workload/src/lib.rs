//! Synthetic transactions for Strata
//!
//! This crate generates transactions that drive and stress-test a
//! partitioned transactional key-value store:
//! - Transaction: Declared readset/writeset, run-once execution, fresh clones
//! - Variants: Noop, Expect, Put, Rmw
//! - KeySampler: Uniform and partition-constrained random key sets
//! - WorkloadConfig / WorkloadGenerator: Seeded, reproducible batches
//!
//! Transactions run against any [`TxnContext`](strata_core::TxnContext);
//! [`Transaction::execute`] wires one up from a
//! [`TransactionManager`](strata_concurrency::TransactionManager).

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod generator;
pub mod partition;
pub mod sampler;
pub mod spin;
pub mod transaction;
pub mod variants;

pub use config::WorkloadConfig;
pub use generator::WorkloadGenerator;
pub use partition::PartitionLayout;
pub use sampler::{KeySampler, SampledKeys, DEFAULT_MAX_DRAW_ATTEMPTS};
pub use transaction::{Transaction, TxnKind};
pub use variants::{Expect, Noop, Put, Rmw, DEFAULT_EXPECTED_VALUE};
