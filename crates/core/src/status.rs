//! Transaction outcome
//!
//! State transitions:
//! - `Pending` → `Committed`
//! - `Pending` → `Aborted`
//!
//! Terminal states (no transitions allowed):
//! - `Committed`
//! - `Aborted`

use serde::{Deserialize, Serialize};

/// Outcome of a transaction execution
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TxnStatus {
    /// Not yet run, or still running
    #[default]
    Pending,
    /// Transaction committed successfully
    Committed,
    /// Transaction was aborted
    Aborted {
        /// Human-readable reason for abort
        reason: String,
    },
}

impl TxnStatus {
    /// Whether no further transitions are allowed
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TxnStatus::Pending)
    }

    /// Whether the transaction committed
    pub fn is_committed(&self) -> bool {
        matches!(self, TxnStatus::Committed)
    }

    /// Whether the transaction aborted
    pub fn is_aborted(&self) -> bool {
        matches!(self, TxnStatus::Aborted { .. })
    }
}
