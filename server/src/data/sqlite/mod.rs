//! SQLite query executor
//!
//! Every call opens its own connection from the configured options and closes
//! it before returning, whether the statement succeeded or not. Mutations run
//! inside a transaction that is committed on success and rolled back on
//! failure. No pool, no cached connection.

pub mod schema;

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use sqlx::query::Query;
use sqlx::sqlite::{
    Sqlite, SqliteArguments, SqliteConnectOptions, SqliteConnection, SqliteQueryResult, SqliteRow,
};
use sqlx::{Column, ConnectOptions, Connection, Row, TypeInfo, ValueRef};

use crate::core::constants::SQLITE_BUSY_TIMEOUT_SECS;
use crate::data::error::StorageError;
use crate::data::traits::SqlExecutor;
use crate::data::types::{DbRow, SqlValue};

/// Connection-per-call SQLite executor
#[derive(Debug, Clone)]
pub struct SqliteExecutor {
    path: PathBuf,
    options: SqliteConnectOptions,
}

impl SqliteExecutor {
    /// Initialize the executor
    ///
    /// Creates the database directory and file if missing and bootstraps the
    /// `book` and `author` tables.
    pub async fn init(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let options = SqliteConnectOptions::new()
            .filename(&path)
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(SQLITE_BUSY_TIMEOUT_SECS));

        let executor = Self { path, options };
        executor.init_schema().await?;

        tracing::debug!(path = %executor.path.display(), "SqliteExecutor initialized");
        Ok(executor)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the catalog tables if they do not exist
    pub async fn init_schema(&self) -> Result<(), StorageError> {
        let mut conn = self.connect().await?;
        let result = sqlx::raw_sql(schema::SCHEMA)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(StorageError::from);
        release(conn).await;
        result
    }

    async fn connect(&self) -> Result<SqliteConnection, StorageError> {
        self.options.connect().await.map_err(|e| {
            tracing::error!(error = %e, path = %self.path.display(), "Failed to open database");
            StorageError::from(e)
        })
    }

    async fn execute(
        &self,
        operation: &'static str,
        sql: &str,
        params: &[SqlValue],
    ) -> Result<SqliteQueryResult, StorageError> {
        tracing::debug!(operation, sql, params = params.len(), "Executing statement");

        let mut conn = self.connect().await?;
        let result = execute_in_transaction(&mut conn, sql, params).await;
        release(conn).await;

        match &result {
            Ok(done) => {
                tracing::debug!(operation, rows_affected = done.rows_affected(), "Statement done")
            }
            Err(e) => tracing::error!(operation, error = %e, sql, "Statement failed"),
        }
        result
    }
}

#[async_trait]
impl SqlExecutor for SqliteExecutor {
    async fn query(&self, sql: &str, params: &[SqlValue]) -> Result<Vec<DbRow>, StorageError> {
        tracing::debug!(sql, params = params.len(), "Executing query");

        let mut conn = self.connect().await?;
        let result = fetch_rows(&mut conn, sql, params).await;
        release(conn).await;

        match &result {
            Ok(rows) => tracing::debug!(rows = rows.len(), "Query returned rows"),
            Err(e) => tracing::error!(error = %e, sql, "Query failed"),
        }
        result
    }

    async fn insert(&self, sql: &str, params: &[SqlValue]) -> Result<i64, StorageError> {
        self.execute("insert", sql, params)
            .await
            .map(|done| done.last_insert_rowid())
    }

    async fn update(&self, sql: &str, params: &[SqlValue]) -> Result<u64, StorageError> {
        self.execute("update", sql, params)
            .await
            .map(|done| done.rows_affected())
    }

    async fn delete(&self, sql: &str, params: &[SqlValue]) -> Result<u64, StorageError> {
        self.execute("delete", sql, params)
            .await
            .map(|done| done.rows_affected())
    }
}

/// Close a connection, logging (not propagating) a failed close
async fn release(conn: SqliteConnection) {
    if let Err(e) = conn.close().await {
        tracing::warn!(error = %e, "Failed to close database connection");
    }
}

fn bind_params<'q>(
    mut query: Query<'q, Sqlite, SqliteArguments<'q>>,
    params: &'q [SqlValue],
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    for param in params {
        query = match param {
            SqlValue::Null => query.bind(None::<String>),
            SqlValue::Integer(v) => query.bind(*v),
            SqlValue::Real(v) => query.bind(*v),
            SqlValue::Text(v) => query.bind(v.as_str()),
        };
    }
    query
}

async fn fetch_rows(
    conn: &mut SqliteConnection,
    sql: &str,
    params: &[SqlValue],
) -> Result<Vec<DbRow>, StorageError> {
    let rows = bind_params(sqlx::query(sql), params)
        .fetch_all(&mut *conn)
        .await?;
    Ok(rows
        .iter()
        .filter_map(|row| match decode_row(row) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                tracing::warn!(error = %e, "Skipping undecodable row");
                None
            }
        })
        .collect())
}

async fn execute_in_transaction(
    conn: &mut SqliteConnection,
    sql: &str,
    params: &[SqlValue],
) -> Result<SqliteQueryResult, StorageError> {
    let mut tx = conn.begin().await?;
    match bind_params(sqlx::query(sql), params).execute(&mut *tx).await {
        Ok(done) => {
            tx.commit().await?;
            Ok(done)
        }
        Err(e) => {
            if let Err(rollback_err) = tx.rollback().await {
                tracing::warn!(error = %rollback_err, "Rollback failed");
            }
            Err(e.into())
        }
    }
}

/// Decode a row by the storage class of each value
///
/// Blobs are read back as lossy UTF-8 text.
fn decode_row(row: &SqliteRow) -> Result<DbRow, StorageError> {
    let mut values = Vec::with_capacity(row.len());
    for column in row.columns() {
        let index = column.ordinal();
        let raw = row.try_get_raw(index)?;
        if raw.is_null() {
            values.push(SqlValue::Null);
            continue;
        }

        let type_name = raw.type_info().name().to_string();
        let value = match type_name.as_str() {
            "INTEGER" | "BOOLEAN" => SqlValue::Integer(row.try_get::<i64, _>(index)?),
            "REAL" | "NUMERIC" => SqlValue::Real(row.try_get::<f64, _>(index)?),
            "TEXT" | "DATE" | "TIME" | "DATETIME" => {
                SqlValue::Text(row.try_get::<String, _>(index)?)
            }
            "BLOB" => {
                let bytes = row.try_get::<Vec<u8>, _>(index)?;
                SqlValue::Text(String::from_utf8_lossy(&bytes).into_owned())
            }
            "NULL" => SqlValue::Null,
            other => return Err(StorageError::unsupported_type(column.name(), other)),
        };
        values.push(value);
    }
    Ok(DbRow(values))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn setup() -> (TempDir, SqliteExecutor) {
        let dir = TempDir::new().unwrap();
        let executor = SqliteExecutor::init(dir.path().join("catalog.sqlite"))
            .await
            .unwrap();
        (dir, executor)
    }

    fn text(s: &str) -> SqlValue {
        SqlValue::Text(s.to_string())
    }

    #[tokio::test]
    async fn test_init_creates_schema() {
        let (_dir, executor) = setup().await;
        let rows = executor
            .query(
                "SELECT name FROM sqlite_master WHERE type = 'table' AND name IN (?, ?) ORDER BY name",
                &[text("author"), text("book")],
            )
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get(0), Some(&text("author")));
        assert_eq!(rows[1].get(0), Some(&text("book")));
    }

    #[tokio::test]
    async fn test_init_creates_parent_directory() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("db").join("catalog.sqlite");
        let executor = SqliteExecutor::init(&path).await.unwrap();
        assert!(path.exists());
        assert_eq!(executor.path(), path.as_path());
    }

    #[tokio::test]
    async fn test_init_is_idempotent() {
        let (dir, executor) = setup().await;
        executor.init_schema().await.unwrap();
        SqliteExecutor::init(dir.path().join("catalog.sqlite"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_ping() {
        let (_dir, executor) = setup().await;
        executor.ping().await.unwrap();
    }

    #[tokio::test]
    async fn test_insert_and_query_typed_values() {
        let (_dir, executor) = setup().await;
        let id = executor
            .insert(
                "INSERT INTO book (title, isbn13, pages, price, edition) VALUES (?, ?, ?, ?, ?)",
                &[
                    text("Dune"),
                    SqlValue::Integer(9780441013593),
                    SqlValue::Integer(412),
                    SqlValue::Real(9.99),
                    SqlValue::Null,
                ],
            )
            .await
            .unwrap();
        assert_eq!(id, 1);

        let rows = executor
            .query(
                "SELECT id, title, isbn13, pages, price, edition FROM book WHERE id = ?",
                &[SqlValue::Integer(id)],
            )
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.get(0), Some(&SqlValue::Integer(1)));
        assert_eq!(row.get(1), Some(&text("Dune")));
        assert_eq!(row.get(2), Some(&SqlValue::Integer(9780441013593)));
        assert_eq!(row.get(3), Some(&SqlValue::Integer(412)));
        // TEXT affinity stores the real as text
        assert_eq!(row.get(4), Some(&text("9.99")));
        assert_eq!(row.get(5), Some(&SqlValue::Null));
    }

    #[tokio::test]
    async fn test_update_and_delete_counts() {
        let (_dir, executor) = setup().await;
        for title in ["A", "B", "C"] {
            executor
                .insert(
                    "INSERT INTO book (title, publisher) VALUES (?, ?)",
                    &[text(title), text("Ace")],
                )
                .await
                .unwrap();
        }

        let updated = executor
            .update(
                "UPDATE book SET publisher = ? WHERE publisher = ?",
                &[text("Tor"), text("Ace")],
            )
            .await
            .unwrap();
        assert_eq!(updated, 3);

        let deleted = executor
            .delete("DELETE FROM book WHERE title = ?", &[text("B")])
            .await
            .unwrap();
        assert_eq!(deleted, 1);

        let missing = executor
            .delete("DELETE FROM book WHERE id = ?", &[SqlValue::Integer(999)])
            .await
            .unwrap();
        assert_eq!(missing, 0);

        let rows = executor.query("SELECT COUNT(*) FROM book", &[]).await.unwrap();
        assert_eq!(rows[0].get(0), Some(&SqlValue::Integer(2)));
    }

    #[tokio::test]
    async fn test_failed_statement_is_rolled_back() {
        let (_dir, executor) = setup().await;
        executor
            .insert("INSERT INTO book (id, title) VALUES (?, ?)", &[SqlValue::Integer(1), text("A")])
            .await
            .unwrap();

        // Primary key conflict
        let err = executor
            .insert("INSERT INTO book (id, title) VALUES (?, ?)", &[SqlValue::Integer(1), text("B")])
            .await;
        assert!(matches!(err, Err(StorageError::Sqlite(_))));

        let rows = executor.query("SELECT title FROM book", &[]).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get(0), Some(&text("A")));

        // Connections are released after failures too
        executor.ping().await.unwrap();
    }

    #[tokio::test]
    async fn test_invalid_sql_is_error() {
        let (_dir, executor) = setup().await;
        let result = executor.query("SELECT * FROM no_such_table", &[]).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_parameters_are_not_interpolated() {
        let (_dir, executor) = setup().await;
        executor
            .insert("INSERT INTO book (title) VALUES (?)", &[text("x'); DROP TABLE book; --")])
            .await
            .unwrap();

        let rows = executor
            .query("SELECT title FROM book WHERE title LIKE ?", &[text("%DROP%")])
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn test_blob_values_read_as_text() {
        let (_dir, executor) = setup().await;
        executor
            .insert("INSERT INTO book (title, toc) VALUES ('Dune', X'4142')", &[])
            .await
            .unwrap();

        let rows = executor.query("SELECT title, toc FROM book", &[]).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get(1), Some(&text("AB")));
    }
}
