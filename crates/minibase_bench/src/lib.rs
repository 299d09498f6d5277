//! Benchmark utilities.

use minibase_core::{Collection, Config, Record, RecordId};
use rand::Rng;
use std::path::Path;

/// Records per benchmark workload.
pub const LIMIT: usize = 10_000;

/// Collection name used by every benchmark.
pub const COLLECTION: &str = "minibase";

/// Generate a record with a random age and a fixed name.
pub fn random_record() -> Record {
    let mut rng = rand::thread_rng();
    let mut record = Record::new();
    record.add_field("age", rng.gen_range(0i64..100));
    record.add_field("name", "Mahinda");
    record
}

/// Opens a collection under `dir` without fsync on flush.
pub fn collection_at(dir: &Path) -> Collection {
    let collection = Collection::with_config(COLLECTION, Config::new().sync_on_flush(false));
    collection.set_directory(dir);
    collection
}

/// Writes `count` random records under `dir` and returns their identifiers.
pub fn populate(dir: &Path, count: usize) -> Vec<RecordId> {
    let collection = collection_at(dir);
    let ids = (0..count)
        .map(|_| collection.insert_record(random_record()))
        .collect();
    collection
        .flush_records()
        .expect("failed to flush benchmark records");
    ids
}
