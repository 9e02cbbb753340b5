//! Read-modify-write transaction

use std::time::Duration;

use strata_core::{KeySet, Result, TxnContext, Value};

use super::Verdict;
use crate::spin::busy_wait;

/// Reads its readset, burns CPU for `duration`, then increments every key
/// of its writeset
///
/// Absent and non-integer values count as zero. Never aborts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rmw {
    duration: Duration,
}

impl Rmw {
    /// Create with the simulated execution cost
    pub fn new(duration: Duration) -> Self {
        Self { duration }
    }

    /// Simulated execution cost
    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub(crate) fn run(
        &self,
        readset: &KeySet,
        writeset: &KeySet,
        ctx: &mut dyn TxnContext,
    ) -> Result<Verdict> {
        // Load-bearing reads: results are not used
        for key in readset {
            ctx.read(*key)?;
        }

        busy_wait(|| ctx.elapsed(), self.duration);

        for key in writeset {
            let current = ctx.read(*key)?;
            ctx.write(*key, Value::incremented(current.as_ref()))?;
        }
        Ok(Verdict::Commit)
    }
}
