//! Concurrency layer for Strata workloads
//!
//! This crate provides the execution side of a generated transaction:
//! - TransactionContext: Read/Write/Commit/Abort bound to a store, with the
//!   declared readset/writeset enforced as a manifest
//! - TransactionManager: Transaction ids and outcome counters
//! - Clocks: Monotonic time sources for bounding simulated work

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod clock;
pub mod manager;
pub mod transaction;

pub use clock::{MonotonicClock, SteppingClock};
pub use manager::{ManagerStats, TransactionManager};
pub use transaction::TransactionContext;
