//! Verification transaction

use std::collections::BTreeMap;

use strata_core::{Key, KeySet, Result, TxnContext, Value};

use super::Verdict;

/// Expected value assumed for every key when built from a bare key set
pub const DEFAULT_EXPECTED_VALUE: Value = Value::Int(1);

/// Reads every key of its mapping and commits iff all values match
///
/// The readset is the key domain of the mapping. Keys are checked in key
/// order; the first missing or mismatched key aborts and the remaining
/// keys are not read. Never writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expect {
    expected: BTreeMap<Key, Value>,
}

impl Expect {
    /// Create from the expected key/value pairs
    pub fn new(expected: BTreeMap<Key, Value>) -> Self {
        Self { expected }
    }

    /// Create from bare keys, each expected to hold [`DEFAULT_EXPECTED_VALUE`]
    pub fn from_keys(keys: &KeySet) -> Self {
        Self {
            expected: keys
                .iter()
                .map(|k| (*k, DEFAULT_EXPECTED_VALUE))
                .collect(),
        }
    }

    /// Expected key/value pairs
    pub fn expected(&self) -> &BTreeMap<Key, Value> {
        &self.expected
    }

    pub(crate) fn readset(&self) -> KeySet {
        self.expected.keys().copied().collect()
    }

    pub(crate) fn run(&self, ctx: &mut dyn TxnContext) -> Result<Verdict> {
        for (key, expected) in &self.expected {
            match ctx.read(*key)? {
                Some(ref actual) if actual == expected => {}
                Some(actual) => {
                    return Ok(Verdict::Abort(format!(
                        "key {}: expected {:?}, found {:?}",
                        key, expected, actual
                    )));
                }
                None => {
                    return Ok(Verdict::Abort(format!("key {}: missing", key)));
                }
            }
        }
        Ok(Verdict::Commit)
    }
}
