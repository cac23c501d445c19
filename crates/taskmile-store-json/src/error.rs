//! Error types for the JSON document store.

use std::path::PathBuf;

use taskmile_core::ValidationError;
use thiserror::Error;

/// Errors that can occur while reading or writing the task document.
#[derive(Error, Debug)]
pub enum JsonStoreError {
    /// Reading or writing the document failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// Document path.
        path: PathBuf,
        /// Underlying failure.
        #[source]
        source: std::io::Error,
    },

    /// The document is not valid JSON for any supported layout.
    #[error("Failed to parse task document: {0}")]
    Parse(#[from] serde_json::Error),

    /// A record in the document breaks a task invariant.
    #[error("Invalid record in task document: {0}")]
    InvalidRecord(#[from] ValidationError),
}

impl JsonStoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// True when the file was readable but its contents were unusable.
    #[must_use]
    pub const fn is_corrupt(&self) -> bool {
        matches!(self, Self::Parse(_) | Self::InvalidRecord(_))
    }
}
