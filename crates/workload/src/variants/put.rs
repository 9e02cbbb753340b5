//! Unconditional blind writes

use std::collections::BTreeMap;

use strata_core::{Key, KeySet, Result, TxnContext, Value};

use super::Verdict;

/// Writes every pair of its mapping and commits
///
/// The writeset is the key domain of the mapping. Never reads, never
/// aborts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Put {
    values: BTreeMap<Key, Value>,
}

impl Put {
    /// Create from the pairs to write
    pub fn new(values: BTreeMap<Key, Value>) -> Self {
        Self { values }
    }

    /// Pairs written by this transaction
    pub fn values(&self) -> &BTreeMap<Key, Value> {
        &self.values
    }

    pub(crate) fn writeset(&self) -> KeySet {
        self.values.keys().copied().collect()
    }

    pub(crate) fn run(&self, ctx: &mut dyn TxnContext) -> Result<Verdict> {
        for (key, value) in &self.values {
            ctx.write(*key, value.clone())?;
        }
        Ok(Verdict::Commit)
    }
}
