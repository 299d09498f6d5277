//! Chunk mapping.
//!
//! Identifiers are split into fixed-width, 1-indexed ranges. Range `n`
//! covers `n*size+1 ..= (n+1)*size` and lives in the file
//! `"{start}-{end}.json"`:
//!
//! ```text
//! id 1..=500     -> 1-500.json
//! id 501..=1000  -> 501-1000.json
//! ```
//!
//! Everything here is a pure function of identifiers and chunk size.

use crate::record::Record;
use crate::types::RecordId;
use std::collections::BTreeMap;
use std::fmt;

/// Default number of identifiers per chunk file.
pub const DEFAULT_CHUNK_SIZE: u64 = 500;

const CHUNK_EXTENSION: &str = ".json";

/// An inclusive range of identifiers backed by one chunk file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChunkRange {
    /// First identifier in the range.
    pub start: u64,
    /// Last identifier in the range.
    pub end: u64,
}

impl ChunkRange {
    /// Returns the `index`-th range for `chunk_size` (0-based).
    ///
    /// The last range is cut short at `u64::MAX`.
    #[must_use]
    pub fn nth(index: u64, chunk_size: u64) -> Self {
        let size = chunk_size.max(1);
        let start = index.saturating_mul(size).saturating_add(1);
        Self {
            start,
            end: start.saturating_add(size - 1),
        }
    }

    /// Returns the file name for this range, e.g. `1-500.json`.
    #[must_use]
    pub fn file_name(&self) -> String {
        format!("{}-{}{CHUNK_EXTENSION}", self.start, self.end)
    }

    /// Returns true if `id` falls within this range.
    #[must_use]
    pub fn contains(&self, id: RecordId) -> bool {
        (self.start..=self.end).contains(&id.as_u64())
    }

    /// Number of identifiers the range covers.
    #[must_use]
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    /// Always false; a range covers at least one identifier.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }
}

impl fmt::Display for ChunkRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Returns the range that `id` belongs to.
///
/// Defined for `id >= 1`. [`RecordId::UNASSIGNED`] is mapped into the
/// first range rather than underflowing.
#[must_use]
pub fn range_for(id: RecordId, chunk_size: u64) -> ChunkRange {
    let size = chunk_size.max(1);
    ChunkRange::nth(id.as_u64().saturating_sub(1) / size, size)
}

/// Splits records into consecutive runs of at most `chunk_size`, in
/// ascending identifier order.
///
/// Runs are cut by position, not by identifier value: with gaps in the
/// identifiers, the Nth run does not match `ChunkRange::nth(N)`.
#[must_use]
pub fn partition(records: &BTreeMap<RecordId, Record>, chunk_size: u64) -> Vec<Vec<&Record>> {
    let size = usize::try_from(chunk_size.max(1)).unwrap_or(usize::MAX);
    let ordered: Vec<&Record> = records.values().collect();
    ordered.chunks(size).map(<[&Record]>::to_vec).collect()
}

/// Groups records by the range their identifier maps to, in ascending
/// range order.
#[must_use]
pub fn partition_by_range(
    records: &BTreeMap<RecordId, Record>,
    chunk_size: u64,
) -> Vec<(ChunkRange, Vec<&Record>)> {
    let mut groups: Vec<(ChunkRange, Vec<&Record>)> = Vec::new();
    for (id, record) in records {
        let range = range_for(*id, chunk_size);
        match groups.last_mut() {
            Some((last, members)) if *last == range => members.push(record),
            _ => groups.push((range, vec![record])),
        }
    }
    groups
}

/// Parses a chunk file name like `501-1000.json` back into its range.
///
/// Returns `None` for anything that is not a well-formed chunk name.
#[must_use]
pub fn parse_chunk_name(name: &str) -> Option<ChunkRange> {
    let stem = name.strip_suffix(CHUNK_EXTENSION)?;
    let (start, end) = stem.split_once('-')?;
    let start: u64 = start.parse().ok()?;
    let end: u64 = end.parse().ok()?;
    if start == 0 || end < start {
        return None;
    }
    Some(ChunkRange { start, end })
}
