//! In-memory record cache.

use crate::record::Record;
use crate::types::RecordId;
use parking_lot::{Mutex, MutexGuard};
use std::collections::BTreeMap;

/// Cache contents guarded by the collection lock.
#[derive(Debug)]
pub(crate) struct CacheState {
    /// Resident records by identifier.
    pub(crate) records: BTreeMap<RecordId, Record>,
    /// Identifier the next insert receives.
    pub(crate) next_id: RecordId,
}

impl CacheState {
    /// Assigns the next identifier to `record` and stores it.
    pub(crate) fn insert(&mut self, mut record: Record) -> RecordId {
        let id = self.next_id;
        record.id = id;
        self.records.insert(id, record);
        self.next_id = id.next();
        id
    }

    /// Stores a record read from disk unless that identifier is already
    /// resident. Returns true if the record was stored.
    ///
    /// `next_id` is moved past the loaded identifier so a later insert
    /// cannot reuse it.
    pub(crate) fn admit(&mut self, record: Record) -> bool {
        let id = record.id;
        if self.next_id <= id {
            self.next_id = id.next();
        }
        if self.records.contains_key(&id) {
            return false;
        }
        self.records.insert(id, record);
        true
    }

    /// Removes a record, returning it if it was resident.
    pub(crate) fn remove(&mut self, id: RecordId) -> Option<Record> {
        self.records.remove(&id)
    }
}

/// Unbounded identifier-to-record map with an identifier generator.
///
/// Every method takes the lock for its own duration only. Callers that
/// must keep the map stable across I/O (flush, delete) take the guard
/// with [`RecordCache::lock`] instead.
#[derive(Debug)]
pub(crate) struct RecordCache {
    state: Mutex<CacheState>,
}

impl RecordCache {
    /// Creates an empty cache whose first insert receives `first_id`.
    pub(crate) fn new(first_id: RecordId) -> Self {
        Self {
            state: Mutex::new(CacheState {
                records: BTreeMap::new(),
                next_id: first_id,
            }),
        }
    }

    /// Takes the cache lock.
    pub(crate) fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock()
    }

    /// Assigns the next identifier to `record` and stores it.
    pub(crate) fn insert(&self, record: Record) -> RecordId {
        self.state.lock().insert(record)
    }

    /// Stores a record read from disk if it is not already resident.
    pub(crate) fn admit(&self, record: Record) -> bool {
        self.state.lock().admit(record)
    }

    /// Returns a copy of the record with this identifier.
    pub(crate) fn get(&self, id: RecordId) -> Option<Record> {
        self.state.lock().records.get(&id).cloned()
    }

    /// Returns true if the identifier is resident.
    pub(crate) fn contains(&self, id: RecordId) -> bool {
        self.state.lock().records.contains_key(&id)
    }

    /// Replaces a resident record, forcing its identifier to `id`.
    ///
    /// Hands the record back unchanged if `id` is not resident.
    pub(crate) fn replace(&self, id: RecordId, mut record: Record) -> Result<(), Record> {
        let mut state = self.state.lock();
        match state.records.get_mut(&id) {
            Some(slot) => {
                record.id = id;
                *slot = record;
                Ok(())
            }
            None => Err(record),
        }
    }

    /// Returns a copy of every resident record.
    pub(crate) fn snapshot(&self) -> BTreeMap<RecordId, Record> {
        self.state.lock().records.clone()
    }

    /// Number of resident records.
    pub(crate) fn len(&self) -> usize {
        self.state.lock().records.len()
    }

    /// Identifier the next insert receives.
    pub(crate) fn next_id(&self) -> RecordId {
        self.state.lock().next_id
    }
}
