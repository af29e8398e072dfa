//! Core types and traits for rowmap.
//!
//! `rowmap-core` is the foundation layer the rest of the workspace builds
//! on. It defines:
//!
//! - **Contract layer**: [`Connection`], the trait database drivers
//!   implement and mappers consume.
//! - **Data model**: [`Value`] and [`Row`], the shapes data takes on its
//!   way in and out of a connection.
//! - **Errors**: one [`Error`] enum shared by mappers, models, and drivers.
//! - **Identifier validation**: the check applied to every table or column
//!   name before it is interpolated into statement text.
//!
//! Most applications should depend on the `rowmap` facade; reach for
//! `rowmap-core` directly when writing a driver.

pub mod connection;
pub mod error;
pub mod identifiers;
pub mod row;
pub mod value;

pub use connection::Connection;
pub use error::{Error, Result};
pub use identifiers::{check_identifier, is_safe_identifier};
pub use row::Row;
pub use value::Value;
