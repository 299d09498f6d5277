//! Error types for minibase core.

use crate::record::ValueKind;
use crate::types::RecordId;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in minibase core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Storage backend error.
    #[error("storage error: {0}")]
    Storage(#[from] minibase_storage::StorageError),

    /// A chunk file holds something other than an array of records.
    #[error("failed to decode chunk {chunk}: {source}")]
    Decode {
        /// Name of the chunk file.
        chunk: String,
        /// Underlying JSON error.
        source: serde_json::Error,
    },

    /// Records could not be encoded for a chunk file.
    #[error("failed to encode chunk {chunk}: {source}")]
    Encode {
        /// Name of the chunk file.
        chunk: String,
        /// Underlying JSON error.
        source: serde_json::Error,
    },

    /// The record is neither cached nor present in its chunk file.
    #[error("record {id} not found")]
    RecordNotFound {
        /// The identifier that was looked up.
        id: RecordId,
    },

    /// The chunk file a record maps to does not exist.
    #[error("chunk {chunk} not found")]
    ChunkNotFound {
        /// Name of the chunk file.
        chunk: String,
    },

    /// A record has no field with this name.
    #[error("field '{name}' does not exist")]
    FieldNotFound {
        /// The missing field name.
        name: String,
    },

    /// A record field has the wrong kind of value.
    #[error("field '{field}' has incorrect type, expected {expected}, got {actual}")]
    Validation {
        /// The offending field.
        field: String,
        /// Kind required by the schema.
        expected: ValueKind,
        /// Kind actually stored.
        actual: ValueKind,
    },
}

impl CoreError {
    /// Creates a record not found error.
    pub fn record_not_found(id: RecordId) -> Self {
        Self::RecordNotFound { id }
    }

    /// Creates a chunk not found error.
    pub fn chunk_not_found(chunk: impl Into<String>) -> Self {
        Self::ChunkNotFound {
            chunk: chunk.into(),
        }
    }

    /// Creates a field not found error.
    pub fn field_not_found(name: impl Into<String>) -> Self {
        Self::FieldNotFound { name: name.into() }
    }

    /// Returns true for the not-found class: a missing record or chunk.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::RecordNotFound { .. } | Self::ChunkNotFound { .. }
        )
    }
}
