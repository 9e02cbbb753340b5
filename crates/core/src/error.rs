//! Error types for Strata workloads
//!
//! This module defines all error types used throughout the system.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.
//!
//! Note that a transaction aborting is NOT an error. Abort is a normal
//! outcome reported through [`TxnStatus`](crate::TxnStatus); the variants
//! here cover misconfiguration, manifest violations and backend failures.

use crate::types::Key;
use std::fmt;
use std::io;
use thiserror::Error;

/// Result type alias for Strata operations
pub type Result<T> = std::result::Result<T, Error>;

/// Kind of access a transaction attempted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessKind {
    /// `read(key)`
    Read,
    /// `write(key, value)`
    Write,
}

impl fmt::Display for AccessKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessKind::Read => write!(f, "read"),
            AccessKind::Write => write!(f, "write"),
        }
    }
}

/// Error types for Strata workloads
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error (config files)
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    /// Config file could not be parsed
    #[error("Config error: {0}")]
    ConfigError(String),

    /// Construction precondition violated
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),


    /// A transaction touched a key outside its declared manifest
    #[error("Undeclared {op} of key {key}")]
    UndeclaredAccess {
        /// Offending key
        key: Key,
        /// Attempted operation
        op: AccessKind,
    },

    /// Commit-time validation failed: a key read by the transaction was
    /// changed by another commit first
    ///
    /// The context has already aborted the execution when this is returned.
    #[error("Read-write conflict on key {key}")]
    Conflict {
        /// First key whose value changed since it was read
        key: Key,
    },

    /// Invalid operation or state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Storage layer error
    #[error("Storage error: {0}")]
    StorageError(String),
}

impl Error {
    /// Shorthand for [`Error::InvalidConfig`]
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Error::InvalidConfig(msg.into())
    }

    /// Shorthand for [`Error::InvalidState`]
    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Error::InvalidState(msg.into())
    }

    /// Whether this error comes from loading or validating a workload, as
    /// opposed to running one
    pub fn is_construction_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidConfig(_) | Error::ConfigError(_) | Error::IoError(_)
        )
    }
}
