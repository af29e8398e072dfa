//! Error types shared across the rowmap crates.

use std::fmt;

/// Convenience alias used by every fallible operation in the workspace.
pub type Result<T> = std::result::Result<T, Error>;

/// All the ways a mapper operation can fail.
///
/// The enum is `Clone + PartialEq` because failed statement executions are
/// stored in the per-mapper query cache and replayed on repeated text, and
/// because tests assert on exact error values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The connection failed to execute a statement.
    Query(String),
    /// A field name was not a schema field, `id`, or a registered extra.
    UnknownField(String),
    /// A table or column name failed identifier validation.
    InvalidIdentifier(String),
    /// Schema discovery returned something unusable.
    Schema(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Query(msg) => write!(f, "query failed: {msg}"),
            Self::UnknownField(name) => write!(f, "unknown field: {name}"),
            Self::InvalidIdentifier(name) => write!(f, "invalid identifier: {name}"),
            Self::Schema(msg) => write!(f, "schema discovery failed: {msg}"),
        }
    }
}

impl std::error::Error for Error {}
