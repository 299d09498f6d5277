//! In-memory storage backend for testing.

use crate::backend::StorageBackend;
use crate::error::{StorageError, StorageResult};
use parking_lot::RwLock;
use std::collections::BTreeMap;

/// An in-memory storage backend.
///
/// Blobs live in a map guarded by a lock. The root starts out absent,
/// like a directory that has not been created yet, so code paths that
/// depend on "storage does not exist" behave the same as on disk.
///
/// # Example
///
/// ```rust
/// use minibase_storage::{InMemoryBackend, StorageBackend};
///
/// let backend = InMemoryBackend::new();
/// assert!(!backend.exists());
/// backend.create().unwrap();
/// backend.write("1-500.json", b"[]").unwrap();
/// assert_eq!(backend.list().unwrap(), vec!["1-500.json"]);
/// ```
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    blobs: RwLock<Option<BTreeMap<String, Vec<u8>>>>,
}

impl InMemoryBackend {
    /// Creates a new backend with no root.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend whose root exists and holds the given blobs.
    ///
    /// Useful for testing load paths against hand-written chunks.
    #[must_use]
    pub fn with_blobs<I, N, D>(blobs: I) -> Self
    where
        I: IntoIterator<Item = (N, D)>,
        N: Into<String>,
        D: Into<Vec<u8>>,
    {
        let map = blobs
            .into_iter()
            .map(|(name, data)| (name.into(), data.into()))
            .collect();
        Self {
            blobs: RwLock::new(Some(map)),
        }
    }

    /// Returns the number of blobs currently stored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.blobs.read().as_ref().map_or(0, BTreeMap::len)
    }

    /// Returns true if no blobs are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl StorageBackend for InMemoryBackend {
    fn exists(&self) -> bool {
        self.blobs.read().is_some()
    }

    fn create(&self) -> StorageResult<()> {
        self.blobs.write().get_or_insert_with(BTreeMap::new);
        Ok(())
    }

    fn read(&self, name: &str) -> StorageResult<Vec<u8>> {
        let blobs = self.blobs.read();
        let blobs = blobs.as_ref().ok_or_else(|| StorageError::RootMissing {
            root: "<memory>".to_string(),
        })?;
        blobs
            .get(name)
            .cloned()
            .ok_or_else(|| StorageError::not_found(name))
    }

    fn write(&self, name: &str, data: &[u8]) -> StorageResult<()> {
        let mut blobs = self.blobs.write();
        let blobs = blobs.as_mut().ok_or_else(|| StorageError::RootMissing {
            root: "<memory>".to_string(),
        })?;
        blobs.insert(name.to_string(), data.to_vec());
        Ok(())
    }

    fn list(&self) -> StorageResult<Vec<String>> {
        Ok(self
            .blobs
            .read()
            .as_ref()
            .map(|blobs| blobs.keys().cloned().collect())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_without_root() {
        let backend = InMemoryBackend::new();
        assert!(!backend.exists());
        assert!(backend.is_empty());
        assert!(backend.list().unwrap().is_empty());
    }

    #[test]
    fn write_requires_root() {
        let backend = InMemoryBackend::new();
        assert!(matches!(
            backend.write("a", b"x"),
            Err(StorageError::RootMissing { .. })
        ));

        backend.create().unwrap();
        backend.write("a", b"x").unwrap();
        assert_eq!(backend.read("a").unwrap(), b"x");
    }

    #[test]
    fn create_keeps_existing_blobs() {
        let backend = InMemoryBackend::with_blobs([("a", b"1".to_vec())]);
        backend.create().unwrap();
        assert_eq!(backend.len(), 1);
    }

    #[test]
    fn read_missing() {
        let backend = InMemoryBackend::with_blobs(Vec::<(String, Vec<u8>)>::new());
        let err = backend.read("a").unwrap_err();
        assert!(matches!(err, StorageError::NotFound { .. }));
    }

    #[test]
    fn list_is_sorted() {
        let backend = InMemoryBackend::new();
        backend.create().unwrap();
        backend.write("b", b"").unwrap();
        backend.write("a", b"").unwrap();
        assert_eq!(backend.list().unwrap(), vec!["a", "b"]);
    }
}
