//! Directory-backed storage backend.

use crate::backend::StorageBackend;
use crate::error::{StorageError, StorageResult};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::trace;

/// Prefix for in-flight temporary files. Never reported by `list`.
const TEMP_PREFIX: &str = ".";
const TEMP_SUFFIX: &str = ".tmp";

/// A storage backend that keeps one file per blob inside a directory.
///
/// # Durability
///
/// Every `write` goes to a temporary sibling first and is renamed over
/// the target, so a reader never observes a half-written blob. When
/// `sync_writes` is enabled the temporary file is fsynced before the
/// rename.
///
/// There is no cross-process locking. Two backends pointed at the same
/// directory can overwrite each other's blobs.
///
/// # Example
///
/// ```no_run
/// use minibase_storage::{FileBackend, StorageBackend};
/// use std::path::Path;
///
/// let backend = FileBackend::new(Path::new("data/users"));
/// backend.create().unwrap();
/// backend.write("1-500.json", b"[]").unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct FileBackend {
    root: PathBuf,
    sync_writes: bool,
}

impl FileBackend {
    /// Creates a backend rooted at `root`. Nothing is touched on disk.
    #[must_use]
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            sync_writes: true,
        }
    }

    /// Sets whether each write is fsynced before it becomes visible.
    #[must_use]
    pub fn sync_writes(mut self, value: bool) -> Self {
        self.sync_writes = value;
        self
    }

    /// Returns the root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the full path of the blob called `name`.
    #[must_use]
    pub fn blob_path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    fn temp_path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{TEMP_PREFIX}{name}{TEMP_SUFFIX}"))
    }

    fn write_temp(&self, path: &Path, data: &[u8]) -> io::Result<()> {
        let mut file = File::create(path)?;
        file.write_all(data)?;
        if self.sync_writes {
            file.sync_all()?;
        }
        Ok(())
    }

    fn root_missing(&self) -> StorageError {
        StorageError::RootMissing {
            root: self.root.display().to_string(),
        }
    }
}

impl StorageBackend for FileBackend {
    fn exists(&self) -> bool {
        self.root.is_dir()
    }

    fn create(&self) -> StorageResult<()> {
        if !self.root.is_dir() {
            fs::create_dir_all(&self.root)?;
            trace!(root = %self.root.display(), "created storage root");
        }
        Ok(())
    }

    fn read(&self, name: &str) -> StorageResult<Vec<u8>> {
        match fs::read(self.blob_path(name)) {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                if self.exists() {
                    Err(StorageError::not_found(name))
                } else {
                    Err(self.root_missing())
                }
            }
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, name: &str, data: &[u8]) -> StorageResult<()> {
        if !self.exists() {
            return Err(self.root_missing());
        }

        let temp_path = self.temp_path(name);
        let written = self
            .write_temp(&temp_path, data)
            .and_then(|()| fs::rename(&temp_path, self.blob_path(name)));
        if let Err(e) = written {
            let _ = fs::remove_file(&temp_path);
            return Err(e.into());
        }

        trace!(blob = name, bytes = data.len(), "wrote blob");
        Ok(())
    }

    fn list(&self) -> StorageResult<Vec<String>> {
        if !self.exists() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if !name.starts_with(TEMP_PREFIX) {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn new_does_not_touch_disk() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("users");

        let backend = FileBackend::new(&root);
        assert!(!backend.exists());
        assert!(!root.exists());
    }

    #[test]
    fn create_is_recursive_and_idempotent() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("nested").join("users");

        let backend = FileBackend::new(&root);
        backend.create().unwrap();
        backend.create().unwrap();
        assert!(root.is_dir());
    }

    #[test]
    fn write_and_read() {
        let dir = tempdir().unwrap();
        let backend = FileBackend::new(dir.path());

        backend.write("1-500.json", b"[1,2,3]").unwrap();
        assert_eq!(backend.read("1-500.json").unwrap(), b"[1,2,3]");
        assert!(dir.path().join("1-500.json").exists());
    }

    #[test]
    fn write_replaces_whole_blob() {
        let dir = tempdir().unwrap();
        let backend = FileBackend::new(dir.path()).sync_writes(false);

        backend.write("a", b"a much longer first version").unwrap();
        backend.write("a", b"short").unwrap();
        assert_eq!(backend.read("a").unwrap(), b"short");
    }

    #[test]
    fn write_without_root_fails() {
        let dir = tempdir().unwrap();
        let backend = FileBackend::new(&dir.path().join("missing"));

        let result = backend.write("a", b"x");
        assert!(matches!(result, Err(StorageError::RootMissing { .. })));
    }

    #[test]
    fn read_missing_blob() {
        let dir = tempdir().unwrap();
        let backend = FileBackend::new(dir.path());

        let result = backend.read("nope.json");
        assert!(matches!(result, Err(StorageError::NotFound { .. })));
    }

    #[test]
    fn read_with_missing_root() {
        let dir = tempdir().unwrap();
        let backend = FileBackend::new(&dir.path().join("missing"));

        let err = backend.read("1-500.json").unwrap_err();
        assert!(matches!(err, StorageError::RootMissing { .. }));
        assert!(err.is_not_found());
    }

    #[test]
    fn list_skips_temp_files_and_directories() {
        let dir = tempdir().unwrap();
        let backend = FileBackend::new(dir.path());

        backend.write("501-1000.json", b"[]").unwrap();
        backend.write("1-500.json", b"[]").unwrap();
        fs::write(dir.path().join(".1-500.json.tmp"), b"partial").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();

        assert_eq!(backend.list().unwrap(), vec!["1-500.json", "501-1000.json"]);
    }

    #[test]
    fn list_missing_root_is_empty() {
        let dir = tempdir().unwrap();
        let backend = FileBackend::new(&dir.path().join("missing"));
        assert!(backend.list().unwrap().is_empty());
    }

    #[test]
    fn blob_path() {
        let dir = tempdir().unwrap();
        let backend = FileBackend::new(dir.path());
        assert_eq!(backend.blob_path("1-500.json"), dir.path().join("1-500.json"));
        assert_eq!(backend.root(), dir.path());
    }

    #[test]
    fn failed_write_removes_temp_file() {
        let dir = tempdir().unwrap();
        let backend = FileBackend::new(dir.path());
        let occupied = dir.path().join("1-500.json");
        fs::create_dir(&occupied).unwrap();
        fs::write(occupied.join("keep"), b"x").unwrap();

        assert!(backend.write("1-500.json", b"[]").is_err());
        assert!(!dir.path().join(".1-500.json.tmp").exists());
        assert!(occupied.join("keep").exists());
    }
}
