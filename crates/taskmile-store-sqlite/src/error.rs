//! Error types for taskmile `SQLite` store operations.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during `SqliteStore` operations.
#[derive(Error, Debug)]
pub enum SqliteStoreError {
    /// Could not prepare the database location.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path involved in the failed operation.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Database error.
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A stored row could not be turned back into a record.
    #[error("Invalid {table} row {id}: {reason}")]
    InvalidRow {
        /// Table the row came from.
        table: &'static str,
        /// Row identifier.
        id: String,
        /// What was wrong with it.
        reason: String,
    },

    /// Failed to acquire the connection lock.
    #[error("Connection lock poisoned")]
    LockError,
}

impl SqliteStoreError {
    pub(crate) fn invalid_row(table: &'static str, id: &str, reason: impl ToString) -> Self {
        Self::InvalidRow {
            table,
            id: id.to_owned(),
            reason: reason.to_string(),
        }
    }
}
