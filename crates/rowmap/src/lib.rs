//! A minimal table data mapper.
//!
//! Two abstractions, one per concern:
//!
//! - [`Mapper`]: one instance per table. Owns a connection, discovers the
//!   table's field list once, caches query results, and exposes
//!   find/delete/save plus insert/update SQL generation.
//! - [`Model`]: one instance per row. A validated field bag with by-name
//!   access, wholesale replacement, and persistence delegated to its
//!   mapper.
//!
//! Concrete per-table types declare themselves through [`Table`] (table
//! name + factory) and embed a [`FieldMap`]:
//!
//! ```ignore
//! struct User { fields: FieldMap }
//!
//! impl Model for User {
//!     fn fields(&self) -> &FieldMap { &self.fields }
//!     fn fields_mut(&mut self) -> &mut FieldMap { &mut self.fields }
//! }
//!
//! struct Users;
//! impl Table for Users {
//!     type Record = User;
//!     fn table_name() -> &'static str { "users" }
//!     fn build(fields: FieldMap) -> User { User { fields } }
//! }
//!
//! let mut users = Mapper::<Users, _>::connect(conn)?;
//! let mut ann = users.create_object(HashMap::new())?;
//! ann.set("name", "Ann")?;
//! ann.save(&mut users)?;
//! let found = users.find(ann.id().clone())?;
//! ```
//!
//! Everything is synchronous and single-threaded: a mapper is meant to be
//! scoped to one unit of work, and its result cache lives and dies with it.

pub mod cache;
pub mod mapper;
pub mod model;
pub mod statement;

pub use cache::QueryCache;
pub use mapper::{Mapper, ModelOrId, Table};
pub use model::{FieldMap, Model};
pub use statement::Statement;

// Re-export the foundation layer so most users need only this crate.
pub use rowmap_core::{Connection, Error, Result, Row, Value};

/// Everything a typical caller needs.
pub mod prelude {
    pub use crate::{
        Connection, Error, FieldMap, Mapper, Model, ModelOrId, Result, Row, Statement, Table,
        Value,
    };
}
