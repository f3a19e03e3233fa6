//! Storage executor trait
//!
//! The record service talks to storage only through `SqlExecutor`: plain SQL
//! with positional `?` parameters in, rows or counts out.

use async_trait::async_trait;

use crate::data::error::StorageError;
use crate::data::types::{DbRow, SqlValue};

/// Parameterized statement executor
///
/// Implementations never interpolate parameter values into the SQL text.
#[async_trait]
pub trait SqlExecutor: Send + Sync {
    /// Run a SELECT and return every row in order
    async fn query(&self, sql: &str, params: &[SqlValue]) -> Result<Vec<DbRow>, StorageError>;

    /// Run an INSERT and return the generated row id
    async fn insert(&self, sql: &str, params: &[SqlValue]) -> Result<i64, StorageError>;

    /// Run an UPDATE and return the affected row count
    async fn update(&self, sql: &str, params: &[SqlValue]) -> Result<u64, StorageError>;

    /// Run a DELETE and return the affected row count
    async fn delete(&self, sql: &str, params: &[SqlValue]) -> Result<u64, StorageError>;

    /// Probe storage with a trivial query
    async fn ping(&self) -> Result<(), StorageError> {
        self.query("SELECT 1", &[]).await.map(|_| ())
    }
}
