//! Storage layer for Strata workloads
//!
//! This crate implements the in-memory backend generated transactions run
//! against:
//! - ShardedStore: DashMap + FxHash, lock-free reads, per-shard writes
//! - Version management with AtomicU64

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod sharded;

pub use sharded::ShardedStore;
