//! Error types for loading, validation and persistence.
//!
//! Only `LoadError` on the catalog is fatal. Everything else degrades to
//! skipping a single challenge or printing a diagnostic.

use std::path::PathBuf;
use thiserror::Error;

/// The catalog snapshot or correction table could not be loaded.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed JSON in {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid catalog record #{index}: {reason}")]
    InvalidRecord { index: usize, reason: String },

    #[error("Catalog snapshot {} contains no records", .0.display())]
    Empty(PathBuf),
}

/// Bad arguments passed to the maintenance tool.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("{0} must not be empty")]
    EmptyArgument(&'static str),
}

/// A durable write (correction table, unknown record) failed.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Refusing to overwrite unreadable {}: {reason}", .path.display())]
    Unreadable { path: PathBuf, reason: String },

    #[error("Failed to serialize {what}: {source}")]
    Serialize {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl PersistenceError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Failure of a correction-table edit made by the maintenance tool.
#[derive(Debug, Error)]
pub enum MaintenanceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}
