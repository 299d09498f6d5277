//! Chunk file persistence.
//!
//! Moves records between the cache and chunk files. Each chunk file is a
//! JSON array of [`Record`]s:
//!
//! ```text
//! <dir>/<collection>/
//! ├─ 1-500.json
//! ├─ 501-1000.json
//! └─ ...
//! ```
//!
//! Nothing here takes the cache lock; the collection decides which
//! operations run under it.

use crate::chunk::{self, ChunkRange};
use crate::config::{Config, PartitionStrategy};
use crate::error::{CoreError, CoreResult};
use crate::record::Record;
use crate::types::RecordId;
use minibase_storage::{StorageBackend, StorageError};
use std::collections::BTreeMap;
use tracing::{debug, trace};

/// Result of removing a record from its chunk file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Removal {
    /// The storage root does not exist; there was nothing to remove.
    NoStorage,
    /// The record was found and the chunk rewritten without it.
    Removed,
    /// The storage root exists but the record's chunk file does not.
    NoChunk,
    /// The chunk file exists but does not hold the record.
    Absent,
}

/// A chunk file and the number of records it holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkSummary {
    /// Identifier range named by the file.
    pub range: ChunkRange,
    /// Records stored in the file.
    pub records: usize,
}

/// Reads and writes chunk files through a storage backend.
pub(crate) struct ChunkStore<'a> {
    backend: &'a dyn StorageBackend,
    config: &'a Config,
}

impl<'a> ChunkStore<'a> {
    pub(crate) fn new(backend: &'a dyn StorageBackend, config: &'a Config) -> Self {
        Self { backend, config }
    }

    /// Decodes the chunk file for `range`.
    ///
    /// A file holding `null` decodes as an empty chunk.
    fn read_chunk(&self, range: ChunkRange) -> CoreResult<Vec<Record>> {
        let name = range.file_name();
        let data = self.backend.read(&name).map_err(|e| match e {
            StorageError::NotFound { .. } | StorageError::RootMissing { .. } => {
                CoreError::chunk_not_found(&name)
            }
            other => CoreError::Storage(other),
        })?;

        let records: Option<Vec<Record>> =
            serde_json::from_slice(&data).map_err(|source| CoreError::Decode {
                chunk: name,
                source,
            })?;
        Ok(records.unwrap_or_default())
    }

    /// Encodes `records` as the chunk file for `range`, replacing it.
    fn write_chunk(&self, range: ChunkRange, records: &[&Record]) -> CoreResult<()> {
        let name = range.file_name();
        let encoded = if self.config.pretty {
            serde_json::to_vec_pretty(records)
        } else {
            serde_json::to_vec(records)
        };
        let mut data = encoded.map_err(|source| CoreError::Encode {
            chunk: name.clone(),
            source,
        })?;
        data.push(b'\n');

        self.backend.write(&name, &data)?;
        trace!(chunk = %name, records = records.len(), "wrote chunk");
        Ok(())
    }

    /// Writes every record in `records` to disk.
    ///
    /// Stops at the first failure; chunks written before it stay written.
    pub(crate) fn flush_all(&self, records: &BTreeMap<RecordId, Record>) -> CoreResult<()> {
        self.backend.create()?;

        let chunk_size = self.config.chunk_size;
        let mut chunks = 0usize;
        match self.config.partition {
            PartitionStrategy::IdRange => {
                for (range, members) in chunk::partition_by_range(records, chunk_size) {
                    self.merge_into_chunk(range, records, members)?;
                    chunks += 1;
                }
            }
            PartitionStrategy::Sequential => {
                for (index, members) in (0u64..).zip(chunk::partition(records, chunk_size)) {
                    self.write_chunk(ChunkRange::nth(index, chunk_size), &members)?;
                    chunks += 1;
                }
            }
        }

        debug!(chunks, records = records.len(), "flushed cache");
        Ok(())
    }

    /// Rewrites one chunk with the cached `members`, keeping any records
    /// already in the file that the cache does not hold.
    fn merge_into_chunk(
        &self,
        range: ChunkRange,
        cached: &BTreeMap<RecordId, Record>,
        members: Vec<&Record>,
    ) -> CoreResult<()> {
        let on_disk = match self.read_chunk(range) {
            Ok(records) => records,
            Err(CoreError::ChunkNotFound { .. }) => Vec::new(),
            Err(e) => return Err(e),
        };

        let mut merged: BTreeMap<RecordId, &Record> =
            members.into_iter().map(|r| (r.id, r)).collect();
        for record in on_disk.iter().filter(|r| !cached.contains_key(&r.id)) {
            merged.entry(record.id).or_insert(record);
        }

        let ordered: Vec<&Record> = merged.into_values().collect();
        self.write_chunk(range, &ordered)
    }

    /// Reads the record with identifier `id` from the chunk it maps to.
    ///
    /// Creates the storage root if it is missing, but never the chunk.
    pub(crate) fn load_one(&self, id: RecordId) -> CoreResult<Record> {
        self.backend.create()?;

        let range = chunk::range_for(id, self.config.chunk_size);
        let mut record = self
            .read_chunk(range)?
            .into_iter()
            .find(|r| r.id == id)
            .ok_or_else(|| CoreError::record_not_found(id))?;

        record.normalize_numbers();
        trace!(%id, chunk = %range, "loaded record");
        Ok(record)
    }

    /// Rewrites the chunk that `id` maps to without that record.
    pub(crate) fn remove(&self, id: RecordId) -> CoreResult<Removal> {
        if !self.backend.exists() {
            return Ok(Removal::NoStorage);
        }

        let range = chunk::range_for(id, self.config.chunk_size);
        let records = match self.read_chunk(range) {
            Ok(records) => records,
            Err(CoreError::ChunkNotFound { .. }) => return Ok(Removal::NoChunk),
            Err(e) => return Err(e),
        };

        let before = records.len();
        let kept: Vec<&Record> = records.iter().filter(|r| r.id != id).collect();
        if kept.len() == before {
            return Ok(Removal::Absent);
        }

        self.write_chunk(range, &kept)?;
        debug!(%id, chunk = %range, "removed record from chunk");
        Ok(Removal::Removed)
    }

    /// Lists the chunk files present, in ascending range order.
    ///
    /// Files whose names are not chunk names are ignored.
    pub(crate) fn ranges(&self) -> CoreResult<Vec<ChunkRange>> {
        let mut ranges: Vec<ChunkRange> = self
            .backend
            .list()?
            .iter()
            .filter_map(|name| chunk::parse_chunk_name(name))
            .collect();
        ranges.sort();
        Ok(ranges)
    }

    /// Lists the chunk files present with their record counts.
    pub(crate) fn summaries(&self) -> CoreResult<Vec<ChunkSummary>> {
        self.ranges()?
            .into_iter()
            .map(|range| {
                Ok(ChunkSummary {
                    range,
                    records: self.read_chunk(range)?.len(),
                })
            })
            .collect()
    }

    /// Returns the largest identifier stored in any chunk file.
    ///
    /// Chunks are read from the highest range down, stopping at the first
    /// one that is not empty.
    pub(crate) fn highest_id(&self) -> CoreResult<Option<RecordId>> {
        for range in self.ranges()?.into_iter().rev() {
            let highest = self.read_chunk(range)?.iter().map(|r| r.id).max();
            if highest.is_some() {
                return Ok(highest);
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Value;
    use minibase_storage::InMemoryBackend;

    fn record(id: u64, name: &str) -> Record {
        let mut record = Record::from_fields([("name", Value::from(name))]);
        record.id = RecordId::new(id);
        record
    }

    fn cache_of(records: Vec<Record>) -> BTreeMap<RecordId, Record> {
        records.into_iter().map(|r| (r.id, r)).collect()
    }

    fn stored_ids(backend: &InMemoryBackend, name: &str) -> Vec<u64> {
        let records: Vec<Record> = serde_json::from_slice(&backend.read(name).unwrap()).unwrap();
        records.iter().map(|r| r.id.as_u64()).collect()
    }

    #[test]
    fn flush_creates_root_and_writes_ranges() {
        let backend = InMemoryBackend::new();
        let config = Config::new().chunk_size(2);
        let store = ChunkStore::new(&backend, &config);

        let cache = cache_of(vec![record(1, "a"), record(2, "b"), record(3, "c")]);
        store.flush_all(&cache).unwrap();

        assert!(backend.exists());
        assert_eq!(backend.list().unwrap(), vec!["1-2.json", "3-4.json"]);
        assert_eq!(stored_ids(&backend, "1-2.json"), vec![1, 2]);
        assert_eq!(stored_ids(&backend, "3-4.json"), vec![3]);
    }

    #[test]
    fn flush_empty_cache_only_creates_root() {
        let backend = InMemoryBackend::new();
        let config = Config::new();
        ChunkStore::new(&backend, &config)
            .flush_all(&BTreeMap::new())
            .unwrap();
        assert!(backend.exists());
        assert!(backend.is_empty());
    }

    #[test]
    fn id_range_flush_keeps_uncached_records_on_disk() {
        let backend = InMemoryBackend::new();
        let config = Config::new().chunk_size(10);
        let store = ChunkStore::new(&backend, &config);

        store
            .flush_all(&cache_of(vec![record(1, "a"), record(2, "b")]))
            .unwrap();
        store
            .flush_all(&cache_of(vec![record(2, "b2"), record(3, "c")]))
            .unwrap();

        assert_eq!(stored_ids(&backend, "1-10.json"), vec![1, 2, 3]);
        let two = store.load_one(RecordId::new(2)).unwrap();
        assert_eq!(two.get_field("name").unwrap().as_str(), Some("b2"));
    }

    #[test]
    fn sequential_flush_writes_by_position() {
        let backend = InMemoryBackend::new();
        let config = Config::new()
            .chunk_size(2)
            .partition(PartitionStrategy::Sequential);
        let store = ChunkStore::new(&backend, &config);

        let cache = cache_of(vec![record(1, "a"), record(5, "e"), record(9, "i")]);
        store.flush_all(&cache).unwrap();

        assert_eq!(stored_ids(&backend, "1-2.json"), vec![1, 5]);
        assert_eq!(stored_ids(&backend, "3-4.json"), vec![9]);
        // The legacy layout hides record 5 from lookups.
        assert!(store.load_one(RecordId::new(5)).unwrap_err().is_not_found());
    }

    #[test]
    fn load_one_creates_root_but_not_chunk() {
        let backend = InMemoryBackend::new();
        let config = Config::new();
        let store = ChunkStore::new(&backend, &config);

        let err = store.load_one(RecordId::new(1)).unwrap_err();
        assert!(matches!(err, CoreError::ChunkNotFound { .. }));
        assert!(backend.exists());
        assert!(backend.is_empty());
    }

    #[test]
    fn load_one_normalizes_numbers() {
        let backend = InMemoryBackend::with_blobs([(
            "1-500.json",
            br#"[{"id": 1, "fields": {"age": 30.0, "score": 2.5}}]"#.to_vec(),
        )]);
        let config = Config::new();
        let record = ChunkStore::new(&backend, &config)
            .load_one(RecordId::new(1))
            .unwrap();

        assert_eq!(record.get_field("age").unwrap(), &Value::Integer(30));
        assert_eq!(record.get_field("score").unwrap(), &Value::Float(2.5));
    }

    #[test]
    fn load_one_missing_id_in_chunk() {
        let backend = InMemoryBackend::with_blobs([("1-500.json", b"[]".to_vec())]);
        let config = Config::new();
        let err = ChunkStore::new(&backend, &config)
            .load_one(RecordId::new(3))
            .unwrap_err();
        assert!(matches!(err, CoreError::RecordNotFound { .. }));
    }

    #[test]
    fn load_one_decode_error() {
        let backend = InMemoryBackend::with_blobs([("1-500.json", b"{not json".to_vec())]);
        let config = Config::new();
        let err = ChunkStore::new(&backend, &config)
            .load_one(RecordId::new(1))
            .unwrap_err();
        assert!(matches!(err, CoreError::Decode { .. }));
    }

    #[test]
    fn null_chunk_reads_as_empty() {
        let backend = InMemoryBackend::with_blobs([("1-500.json", b"null\n".to_vec())]);
        let config = Config::new();
        let store = ChunkStore::new(&backend, &config);
        assert_eq!(store.summaries().unwrap()[0].records, 0);
        assert_eq!(store.highest_id().unwrap(), None);
    }

    #[test]
    fn remove_outcomes() {
        let backend = InMemoryBackend::new();
        let config = Config::new();
        let store = ChunkStore::new(&backend, &config);

        assert_eq!(store.remove(RecordId::new(1)).unwrap(), Removal::NoStorage);

        store
            .flush_all(&cache_of(vec![record(1, "a"), record(2, "b")]))
            .unwrap();
        assert_eq!(store.remove(RecordId::new(1)).unwrap(), Removal::Removed);
        assert_eq!(store.remove(RecordId::new(1)).unwrap(), Removal::Absent);
        assert_eq!(store.remove(RecordId::new(900)).unwrap(), Removal::NoChunk);
        assert_eq!(stored_ids(&backend, "1-500.json"), vec![2]);
    }

    #[test]
    fn ranges_and_highest_id() {
        let backend = InMemoryBackend::with_blobs([
            ("501-1000.json", br#"[{"id": 501, "fields": {}}, {"id": 502, "fields": {}}]"#.to_vec()),
            ("1-500.json", br#"[{"id": 1, "fields": {}}]"#.to_vec()),
            ("1001-1500.json", b"[]".to_vec()),
            ("notes.txt", b"ignored".to_vec()),
        ]);
        let config = Config::new();
        let store = ChunkStore::new(&backend, &config);

        let ranges: Vec<String> = store.ranges().unwrap().iter().map(|r| r.file_name()).collect();
        assert_eq!(ranges, vec!["1-500.json", "501-1000.json", "1001-1500.json"]);
        assert_eq!(store.highest_id().unwrap(), Some(RecordId::new(502)));

        let counts: Vec<usize> = store.summaries().unwrap().iter().map(|s| s.records).collect();
        assert_eq!(counts, vec![1, 2, 0]);
    }
}
