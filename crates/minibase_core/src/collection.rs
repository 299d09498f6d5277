//! The collection façade.

use crate::cache::RecordCache;
use crate::chunk::ChunkRange;
use crate::config::Config;
use crate::error::{CoreError, CoreResult};
use crate::persist::{ChunkStore, ChunkSummary, Removal};
use crate::record::Record;
use crate::types::RecordId;
use minibase_storage::{FileBackend, StorageBackend};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info_span, Span};

/// Where a collection keeps its chunk files.
#[derive(Debug)]
struct Location {
    dir: PathBuf,
    backend: Arc<dyn StorageBackend>,
}

/// A named store of schema-less records.
///
/// Records live in an in-memory cache keyed by [`RecordId`] and are
/// written to `{dir}/{name}/{start}-{end}.json` chunk files by
/// [`flush_records`](Self::flush_records). Reads, updates and deletes of
/// identifiers that are not cached fall back to the chunk file the
/// identifier maps to.
///
/// # Concurrency
///
/// A `Collection` is `Send + Sync` and may be shared between threads.
/// One lock guards the cache and the identifier counter:
///
/// - `get_record_by_id`, `update_record` and `load_record` release the
///   lock while they read from disk, so two threads missing the same
///   identifier may both read its chunk.
/// - `flush_records` and `delete_record` hold the lock across their
///   I/O, serializing them against every other operation.
///
/// Nothing coordinates two `Collection`s pointed at the same directory,
/// in this process or another. Their flushes can interleave and
/// overwrite each other's chunk files; keep a single writer per
/// directory.
///
/// # Example
///
/// ```rust,no_run
/// use minibase_core::{Collection, Record};
///
/// let users = Collection::new("users");
/// users.set_directory("/var/lib/app");
///
/// let mut record = Record::new();
/// record.add_field("name", "Anura");
/// record.add_field("age", 40);
/// let id = users.insert_record(record);
///
/// users.flush_records()?;
/// let stored = users.get_record_by_id(id)?;
/// # Ok::<(), minibase_core::CoreError>(())
/// ```
pub struct Collection {
    name: String,
    config: Config,
    location: RwLock<Location>,
    cache: RecordCache,
    span: Span,
}

impl Collection {
    /// Creates a collection stored under the current working directory.
    ///
    /// Nothing is read or created on disk until the first flush, load or
    /// delete. Identifiers start at 1.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_config(name, Config::default())
    }

    /// Creates a collection with the given configuration, stored under
    /// the current working directory.
    #[must_use]
    pub fn with_config(name: impl Into<String>, config: Config) -> Self {
        let name = name.into();
        let dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let backend = Self::file_backend(&dir, &name, &config);
        Self::assemble(name, config, dir, backend, RecordId::new(1))
    }

    /// Creates a collection over an arbitrary storage backend.
    ///
    /// The directory reported by [`directory`](Self::directory) is the
    /// current working directory; calling
    /// [`set_directory`](Self::set_directory) replaces `backend` with a
    /// file backend.
    #[must_use]
    pub fn with_backend(
        name: impl Into<String>,
        config: Config,
        backend: Arc<dyn StorageBackend>,
    ) -> Self {
        let dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::assemble(name.into(), config, dir, backend, RecordId::new(1))
    }

    /// Opens a collection stored under `dir`, resuming identifiers after
    /// the highest one already on disk.
    ///
    /// Only the highest non-empty chunk file is read; no record is cached.
    ///
    /// # Errors
    ///
    /// Returns an error if existing chunk files cannot be listed or decoded.
    pub fn open(name: impl Into<String>, dir: impl AsRef<Path>, config: Config) -> CoreResult<Self> {
        let name = name.into();
        let dir = dir.as_ref().to_path_buf();
        let backend = Self::file_backend(&dir, &name, &config);

        let highest = ChunkStore::new(&*backend, &config).highest_id()?;
        let first_id = highest.map_or(RecordId::new(1), RecordId::next);

        let collection = Self::assemble(name, config, dir, backend, first_id);
        debug!(parent: &collection.span, next_id = %first_id, "opened collection");
        Ok(collection)
    }

    fn assemble(
        name: String,
        config: Config,
        dir: PathBuf,
        backend: Arc<dyn StorageBackend>,
        first_id: RecordId,
    ) -> Self {
        let span = info_span!("collection", name = %name);
        Self {
            name,
            config,
            location: RwLock::new(Location { dir, backend }),
            cache: RecordCache::new(first_id),
            span,
        }
    }

    fn file_backend(dir: &Path, name: &str, config: &Config) -> Arc<dyn StorageBackend> {
        Arc::new(FileBackend::new(&dir.join(name)).sync_writes(config.sync_on_flush))
    }

    fn backend(&self) -> Arc<dyn StorageBackend> {
        Arc::clone(&self.location.read().backend)
    }

    /// Returns the collection name, which is also its directory name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the parent directory the collection is stored under.
    #[must_use]
    pub fn directory(&self) -> PathBuf {
        self.location.read().dir.clone()
    }

    /// Returns the directory holding the chunk files, `{dir}/{name}`.
    #[must_use]
    pub fn storage_path(&self) -> PathBuf {
        self.location.read().dir.join(&self.name)
    }

    /// Points the collection at a new parent directory.
    ///
    /// Cached records and existing files are not moved; the next flush
    /// writes the cache to the new location.
    pub fn set_directory(&self, dir: impl AsRef<Path>) {
        let dir = dir.as_ref().to_path_buf();
        let backend = Self::file_backend(&dir, &self.name, &self.config);
        debug!(parent: &self.span, dir = %dir.display(), "set directory");
        *self.location.write() = Location { dir, backend };
    }

    /// Caches `record` under the next identifier and returns it.
    ///
    /// Any identifier already on `record` is overwritten. The record is not
    /// on disk until the next flush.
    pub fn insert_record(&self, record: Record) -> RecordId {
        self.cache.insert(record)
    }

    /// Returns a copy of the record with identifier `id`.
    ///
    /// A cache miss loads the record from its chunk file and caches it.
    ///
    /// # Errors
    ///
    /// Returns `RecordNotFound` if the record is neither cached nor in its
    /// chunk file, or a decode/storage error if the chunk cannot be read.
    pub fn get_record_by_id(&self, id: RecordId) -> CoreResult<Record> {
        let _enter = self.span.enter();
        if let Some(record) = self.cache.get(id) {
            return Ok(record);
        }

        self.load_missing(id)?;
        self.cache
            .get(id)
            .ok_or_else(|| CoreError::record_not_found(id))
    }

    /// Replaces the record with identifier `id`, keeping that identifier.
    ///
    /// A cache miss loads the existing record first. The change is not on
    /// disk until the next flush.
    ///
    /// # Errors
    ///
    /// Returns `RecordNotFound` if no record with `id` exists, or a
    /// decode/storage error if its chunk cannot be read.
    pub fn update_record(&self, id: RecordId, record: Record) -> CoreResult<()> {
        let _enter = self.span.enter();
        let record = match self.cache.replace(id, record) {
            Ok(()) => return Ok(()),
            Err(record) => record,
        };

        self.load_missing(id)?;
        self.cache
            .replace(id, record)
            .map_err(|_| CoreError::record_not_found(id))
    }

    /// Deletes the record with identifier `id` from the cache and from its
    /// chunk file.
    ///
    /// Succeeds without doing anything if the collection has never been
    /// written to disk. The chunk file is rewritten even if the record was
    /// never cached.
    ///
    /// # Errors
    ///
    /// Returns `RecordNotFound` if the chunk file exists but does not hold
    /// the record, or if there is no chunk file and the record is not
    /// cached. Returns a storage/decode error if the chunk cannot be read
    /// or rewritten. On error the cache is unchanged.
    pub fn delete_record(&self, id: RecordId) -> CoreResult<()> {
        let _enter = self.span.enter();
        let mut state = self.cache.lock();
        let backend = self.backend();

        let removal = ChunkStore::new(&*backend, &self.config).remove(id)?;
        if removal == Removal::Absent
            || (removal == Removal::NoChunk && !state.records.contains_key(&id))
        {
            return Err(CoreError::record_not_found(id));
        }

        let was_cached = state.remove(id).is_some();
        debug!(%id, ?removal, was_cached, "deleted record");
        Ok(())
    }

    /// Writes every cached record to its chunk file, creating the storage
    /// directory if needed.
    ///
    /// Not atomic: if writing one chunk fails, chunks written before it
    /// stay written.
    ///
    /// # Errors
    ///
    /// Returns a storage or encode error for the first chunk that fails.
    pub fn flush_records(&self) -> CoreResult<()> {
        let _enter = self.span.enter();
        let state = self.cache.lock();
        let backend = self.backend();
        ChunkStore::new(&*backend, &self.config).flush_all(&state.records)
    }

    /// Loads the record with identifier `id` from its chunk file into the
    /// cache. Does nothing if it is already cached.
    ///
    /// # Errors
    ///
    /// Returns `ChunkNotFound` if the chunk file does not exist,
    /// `RecordNotFound` if it does not hold `id`, or a decode/storage
    /// error.
    pub fn load_record(&self, id: RecordId) -> CoreResult<()> {
        let _enter = self.span.enter();
        self.load_uncached(id)
    }

    fn load_uncached(&self, id: RecordId) -> CoreResult<()> {
        if !id.is_assigned() {
            return Err(CoreError::record_not_found(id));
        }
        if self.cache.contains(id) {
            return Ok(());
        }

        let backend = self.backend();
        let record = ChunkStore::new(&*backend, &self.config).load_one(id)?;
        self.cache.admit(record);
        Ok(())
    }

    /// Loads `id` for a read or update, reporting any not-found condition
    /// as `RecordNotFound`.
    fn load_missing(&self, id: RecordId) -> CoreResult<()> {
        self.load_uncached(id).map_err(|e| {
            if e.is_not_found() {
                CoreError::record_not_found(id)
            } else {
                e
            }
        })
    }

    /// Returns a copy of every cached record.
    #[must_use]
    pub fn get_all_cached_records(&self) -> BTreeMap<RecordId, Record> {
        self.cache.snapshot()
    }

    /// Number of cached records.
    #[must_use]
    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }

    /// Identifier the next insert will receive.
    #[must_use]
    pub fn next_id(&self) -> RecordId {
        self.cache.next_id()
    }

    /// Lists the chunk files on disk in ascending range order.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage directory cannot be listed.
    pub fn chunk_files(&self) -> CoreResult<Vec<ChunkRange>> {
        let backend = self.backend();
        ChunkStore::new(&*backend, &self.config).ranges()
    }

    /// Lists the chunk files on disk with the number of records in each.
    ///
    /// # Errors
    ///
    /// Returns an error if a chunk file cannot be read or decoded.
    pub fn chunk_summaries(&self) -> CoreResult<Vec<ChunkSummary>> {
        let backend = self.backend();
        ChunkStore::new(&*backend, &self.config).summaries()
    }
}

impl std::fmt::Debug for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collection")
            .field("name", &self.name)
            .field("dir", &self.directory())
            .field("cached", &self.cached_len())
            .finish_non_exhaustive()
    }
}
