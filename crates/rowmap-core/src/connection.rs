//! The connection contract drivers implement.

use crate::error::Result;
use crate::row::Row;
use crate::value::Value;

/// An opaque executor of SQL statements.
///
/// A mapper owns exactly one connection and issues every statement through
/// it. The contract is synchronous and blocking: a call either returns or
/// fails, there are no suspension points and no cancellation semantics.
///
/// Statements carry `?N` placeholders (1-based) with values bound through
/// `params`; drivers substitute, never the caller. The `escape` primitive
/// exists for the raw-fragment escape hatch, where callers compose `where`
/// text themselves.
pub trait Connection {
    /// Run a statement that produces rows.
    ///
    /// Zero matching rows is `Ok(vec![])`; `Err` means the statement could
    /// not be executed.
    fn query(&mut self, sql: &str, params: &[Value]) -> Result<Vec<Row>>;

    /// Run a statement executed for effect. Returns the number of rows
    /// affected.
    fn execute(&mut self, sql: &str, params: &[Value]) -> Result<u64>;

    /// The auto-increment id assigned by the most recent successful
    /// insert on this connection.
    fn last_insert_id(&self) -> i64;

    /// Escape a string for inclusion inside a single-quoted SQL literal.
    fn escape(&self, raw: &str) -> String;
}
