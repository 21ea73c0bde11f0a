//! # TodoDB KV
//!
//! The embedded transactional key-value engine underneath TodoDB.
//!
//! - Byte keys and values, kept in key order
//! - A write-ahead log as the only durable state, replayed on open
//! - Snapshot-isolated read transactions that never wait for writers
//! - One read-write transaction at a time, so writes are serializable
//! - An advisory directory lock so one process owns a database
//!
//! ```
//! use tododb_kv::Database;
//!
//! let db = Database::open_in_memory().unwrap();
//!
//! let mut txn = db.begin_write().unwrap();
//! if !txn.contains(b"1").unwrap() {
//!     txn.put(b"1".to_vec(), b"Buy milk".to_vec()).unwrap();
//! }
//! txn.commit().unwrap();
//!
//! let read = db.begin_read().unwrap();
//! assert_eq!(read.scan().unwrap().len(), 1);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod database;
pub mod dir;
mod error;
mod keyspace;
mod recovery;
mod transaction;
mod types;
pub mod wal;

pub use config::Config;
pub use database::{Database, DatabaseStats};
pub use error::{KvError, KvResult};
pub use transaction::{ReadTransaction, WriteTransaction};
pub use types::{SequenceNumber, TransactionId};
