//! # minibase core
//!
//! An embedded record store: a named [`Collection`] holds schema-less
//! [`Record`]s addressed by auto-incrementing [`RecordId`]s, cached in
//! memory and partitioned across fixed-size JSON chunk files on disk.
//!
//! This crate provides:
//! - The record model ([`Record`], [`Value`], [`ValueKind`])
//! - Chunk mapping from identifiers to files ([`chunk`])
//! - The in-memory cache and the flush/load protocol behind [`Collection`]
//!
//! ## On-disk layout
//!
//! ```text
//! <dir>/<collection>/1-500.json       # records 1..=500
//! <dir>/<collection>/501-1000.json    # records 501..=1000
//! ```
//!
//! Each file is a JSON array of `{"id": <int>, "fields": {...}}` objects.
//!
//! ## Example
//!
//! ```rust
//! use minibase_core::{Collection, Record};
//!
//! let dir = tempfile::tempdir().unwrap();
//! let people = Collection::new("people");
//! people.set_directory(dir.path());
//!
//! let mut record = Record::new();
//! record.add_field("name", "Mahinda");
//! let id = people.insert_record(record);
//! people.flush_records().unwrap();
//!
//! let reopened = Collection::new("people");
//! reopened.set_directory(dir.path());
//! let loaded = reopened.get_record_by_id(id).unwrap();
//! assert_eq!(loaded.get_field("name").unwrap().as_str(), Some("Mahinda"));
//! ```
//!
//! ## Limitations
//!
//! There is no write-ahead log, no cross-process locking and no
//! transaction spanning collections. A flush that fails part-way leaves
//! the chunks it already wrote in place.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod cache;
pub mod chunk;
mod collection;
mod config;
mod error;
mod persist;
mod record;
mod types;

pub use chunk::{ChunkRange, DEFAULT_CHUNK_SIZE};
pub use collection::Collection;
pub use config::{Config, PartitionStrategy};
pub use error::{CoreError, CoreResult};
pub use persist::ChunkSummary;
pub use record::{Record, Value, ValueKind};
pub use types::RecordId;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
