//! Core types and traits for Strata workloads
//!
//! This crate defines the foundational types used throughout the system:
//! - Key / KeySet: Integer keys and declared key sets
//! - Value: Payload stored under a key
//! - TxnStatus: Transaction outcome (pending, committed, aborted)
//! - Error: Error type hierarchy
//! - Traits: Storage, TxnContext, Clock

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod status;
pub mod traits;
pub mod types;
pub mod value;

// Re-export commonly used types and traits
pub use error::{AccessKind, Error, Result};
pub use status::TxnStatus;
pub use traits::{Clock, Storage, TxnContext};
pub use types::{Key, KeySet};
pub use value::Value;
