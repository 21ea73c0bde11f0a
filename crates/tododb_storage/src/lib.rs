//! # TodoDB Storage
//!
//! The lowest layer of the TodoDB engine: places to put bytes.
//!
//! A backend is an append-only byte store. It knows nothing about log
//! records, keys or transactions; `tododb_kv` owns every format decision and
//! uses a backend only to append the write-ahead log, read it back during
//! recovery, and cut off a torn tail.
//!
//! ## Backends
//!
//! - [`InMemoryBackend`] - ephemeral stores and tests
//! - [`FileBackend`] - a single OS file
//!
//! ## Example
//!
//! ```rust
//! use tododb_storage::{InMemoryBackend, StorageBackend};
//!
//! let mut backend = InMemoryBackend::new();
//! let offset = backend.append(b"todo").unwrap();
//! assert_eq!(backend.read_at(offset, 4).unwrap(), b"todo");
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
