//! # minibase storage
//!
//! Storage backends for minibase chunk files.
//!
//! A backend is a flat namespace of **named blobs** rooted at one
//! location (a directory, for the file backend). Backends do not know
//! what a chunk contains; the core crate owns the JSON format and the
//! naming scheme.
//!
//! ## Available Backends
//!
//! - [`FileBackend`] - One file per blob inside a directory
//! - [`InMemoryBackend`] - For testing and ephemeral collections
//!
//! ## Example
//!
//! ```rust
//! use minibase_storage::{InMemoryBackend, StorageBackend};
//!
//! let backend = InMemoryBackend::new();
//! backend.create().unwrap();
//! backend.write("1-500.json", b"[]").unwrap();
//! assert_eq!(backend.read("1-500.json").unwrap(), b"[]");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod error;
mod file;
mod memory;

pub use backend::StorageBackend;
pub use error::{StorageError, StorageResult};
pub use file::FileBackend;
pub use memory::InMemoryBackend;
