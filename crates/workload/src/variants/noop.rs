//! Baseline transaction that touches nothing

use strata_core::{Result, TxnContext};

use super::Verdict;

/// Declares no keys and commits immediately
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Noop;

impl Noop {
    pub(crate) fn run(&self, _ctx: &mut dyn TxnContext) -> Result<Verdict> {
        Ok(Verdict::Commit)
    }
}
