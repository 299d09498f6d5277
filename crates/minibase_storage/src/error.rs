//! Error types for storage operations.

use std::io;
use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The named blob does not exist.
    #[error("blob not found: {name}")]
    NotFound {
        /// Name of the missing blob.
        name: String,
    },

    /// The storage root has not been created yet.
    #[error("storage root does not exist: {root}")]
    RootMissing {
        /// Display form of the root location.
        root: String,
    },
}

impl StorageError {
    /// Creates a not-found error for the given blob name.
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound { name: name.into() }
    }

    /// Returns true if this error means the blob or its root is absent.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::RootMissing { .. })
    }
}
