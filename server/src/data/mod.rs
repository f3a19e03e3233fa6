//! Data storage layer
//!
//! - `types` - SQL values, positional rows and the decoded records
//! - `filters` - Filter primitives and the WHERE clause builder
//! - `traits` - `SqlExecutor`, the seam the record service depends on
//! - `sqlite` - SQLite implementation of `SqlExecutor`
//! - `error` - Storage error type

pub mod error;
pub mod filters;
pub mod sqlite;
pub mod traits;
pub mod types;

pub use error::StorageError;
pub use sqlite::SqliteExecutor;
pub use traits::SqlExecutor;
