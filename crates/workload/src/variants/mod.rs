//! Transaction variants
//!
//! Each variant holds only its own configuration; the declared key sets
//! live on [`Transaction`](crate::Transaction). A variant's `run` reports
//! a [`Verdict`] and the transaction turns it into exactly one terminal
//! signal on the context.

mod expect;
mod noop;
mod put;
mod rmw;

pub use expect::{Expect, DEFAULT_EXPECTED_VALUE};
pub use noop::Noop;
pub use put::Put;
pub use rmw::Rmw;

/// How a variant wants its execution to end
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Verdict {
    Commit,
    Abort(String),
}
