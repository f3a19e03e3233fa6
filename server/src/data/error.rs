//! Storage error type
//!
//! Every failure below the record service surfaces as a `StorageError`.
//! Details are logged where they happen; the API layer only exposes a
//! generic message.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    /// SQLite driver or statement error
    #[error("SQLite error: {0}")]
    Sqlite(#[from] sqlx::Error),

    /// Column value with a storage class the decoder does not handle
    #[error("Unsupported value type {type_name} in column {column}")]
    UnsupportedType { column: String, type_name: String },

    /// IO error (database directory creation)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StorageError {
    pub fn unsupported_type(column: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self::UnsupportedType {
            column: column.into(),
            type_name: type_name.into(),
        }
    }

    /// Check if this is a connection-level error that might be transient
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Sqlite(e) => matches!(
                e,
                sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_)
            ),
            Self::Io(_) => true,
            Self::UnsupportedType { .. } => false,
        }
    }
}
