//! Collection configuration.

use crate::chunk::DEFAULT_CHUNK_SIZE;

/// How a flush assigns cached records to chunk files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PartitionStrategy {
    /// Each record goes to the file its identifier maps to, so a later
    /// load always finds it. Records already on disk in that file but not
    /// cached are kept.
    #[default]
    IdRange,
    /// Legacy layout: the cache is sorted, cut into runs of `chunk_size`
    /// records, and the Nth run overwrites the Nth file (`1-500.json`,
    /// `501-1000.json`, ...). Only agrees with lookups when the cache is a
    /// gap-free run of identifiers starting at 1.
    Sequential,
}

/// Configuration for a collection.
#[derive(Debug, Clone)]
pub struct Config {
    /// Number of identifiers covered by one chunk file.
    pub chunk_size: u64,

    /// How flush lays records out across chunk files.
    pub partition: PartitionStrategy,

    /// Whether to fsync each chunk file as it is written.
    pub sync_on_flush: bool,

    /// Whether chunk files are pretty-printed.
    pub pretty: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            partition: PartitionStrategy::IdRange,
            sync_on_flush: true,
            pretty: false,
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the chunk size. Zero is treated as one.
    #[must_use]
    pub const fn chunk_size(mut self, size: u64) -> Self {
        self.chunk_size = if size == 0 { 1 } else { size };
        self
    }

    /// Sets the flush partitioning strategy.
    #[must_use]
    pub const fn partition(mut self, strategy: PartitionStrategy) -> Self {
        self.partition = strategy;
        self
    }

    /// Sets whether chunk files are fsynced on flush.
    #[must_use]
    pub const fn sync_on_flush(mut self, value: bool) -> Self {
        self.sync_on_flush = value;
        self
    }

    /// Sets whether chunk files are pretty-printed.
    #[must_use]
    pub const fn pretty(mut self, value: bool) -> Self {
        self.pretty = value;
        self
    }
}
