//! Storage backend trait definition.

use crate::error::StorageResult;

/// A name-addressed blob store.
///
/// Backends are **opaque byte stores**: they read and replace whole
/// blobs by name under a single root. The core crate decides what the
/// names mean and how the bytes are encoded.
///
/// # Invariants
///
/// - `read` returns exactly the bytes of the last successful `write`
/// - `write` replaces the whole blob; there is no append or merge
/// - `list` never reports a blob whose `write` has not completed
/// - Backends must be `Send + Sync` so a collection can be shared
///
/// # Implementors
///
/// - [`super::FileBackend`] - For persistent storage
/// - [`super::InMemoryBackend`] - For testing
pub trait StorageBackend: Send + Sync + std::fmt::Debug {
    /// Returns true if the storage root exists.
    fn exists(&self) -> bool;

    /// Creates the storage root (and any parents) if it is absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the root cannot be created.
    fn create(&self) -> StorageResult<()>;

    /// Reads the whole blob called `name`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no such blob exists, `RootMissing` if the
    /// root itself is absent, or an I/O error.
    fn read(&self, name: &str) -> StorageResult<Vec<u8>>;

    /// Replaces the blob called `name` with `data`, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns `RootMissing` if the root has not been created, or an
    /// I/O error if the write fails.
    fn write(&self, name: &str, data: &[u8]) -> StorageResult<()>;

    /// Lists the names of all blobs under the root.
    ///
    /// An absent root lists as empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the root cannot be enumerated.
    fn list(&self) -> StorageResult<Vec<String>>;
}
