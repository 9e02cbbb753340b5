//! Value type for stored payloads
//!
//! Values are opaque to the workload except for two operations: equality
//! (Expect compares what it reads against what it expects) and the integer
//! increment performed by read-modify-write transactions.
//!
//! Equality is structural. Values of different variants are never equal,
//! so `Int(1)` does not match `String("1")`.

use serde::{Deserialize, Serialize};

/// Payload associated with a Key in the store
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Value {
    /// Null value
    Null,
    /// Boolean value
    Bool(bool),
    /// 64-bit signed integer
    Int(i64),
    /// UTF-8 string
    String(String),
    /// Raw bytes
    Bytes(Vec<u8>),
}

impl Value {
    /// Get as i64 if this is an Int value
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Successor used by read-modify-write
    ///
    /// Absent and non-integer values count as zero, so the result is always
    /// an `Int`. Integer overflow wraps.
    pub fn incremented(current: Option<&Value>) -> Value {
        let base = current.and_then(Value::as_int).unwrap_or(0);
        Value::Int(base.wrapping_add(1))
    }
}

// ============================================================================
// From implementations for ergonomic API usage
// ============================================================================

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::Bytes(b)
    }
}
