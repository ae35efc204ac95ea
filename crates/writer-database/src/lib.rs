//! SQLite layer for sqlite-writer.
//!
//! This crate provides:
//! - `SqliteStore`, a cloneable async handle whose single connection lives
//!   on a dedicated executor thread
//! - `SqlParam`, the scalar parameter type bound positionally into requests
//! - Statement execution with the semantics of a driver-level `Exec`
//! - Parsing of `DATABASE_URL` values
//!
//! **Important**: Only SQL operations should run inside `store.call_sqlite()`.
//! Anything else blocks the one thread every request depends on.

mod error;
mod executor;
mod location;
mod params;
mod statement;

pub use error::{DatabaseError, DatabaseResult};
pub use executor::SqliteStore;
pub use location::DatabaseLocation;
pub use params::{SqlParam, UnsupportedParam};
pub use statement::{execute_with_params, ExecSummary};
