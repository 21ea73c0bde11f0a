//! CLI command implementations.

pub mod dump_log;
pub mod inspect;
pub mod list;
pub mod verify;

use clap::ValueEnum;
use std::path::Path;
use tododb_kv::dir::DatabaseDir;
use tododb_kv::wal::read_log;
use tododb_kv::{Config, Database};
use tododb_storage::FileBackend;

/// Output format shared by every command that prints data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// Human-readable text
    Text,
    /// Pretty-printed JSON
    Json,
}

/// Reads the raw log of the database at `path` without replaying it.
///
/// The directory lock is held while reading, so this fails against a
/// database that is open elsewhere.
pub fn read_raw_log(path: &Path) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    let dir = DatabaseDir::open(path, false)?;
    let wal_path = dir.wal_path();
    if !wal_path.exists() {
        return Ok(Vec::new());
    }
    let backend = FileBackend::open(&wal_path)?;
    Ok(read_log(&backend)?)
}

/// Opens an existing database.
pub fn open_existing(path: &Path) -> Result<Database, Box<dyn std::error::Error>> {
    let config = Config::default().create_if_missing(false);
    Ok(Database::open_with_config(path, config)?)
}
