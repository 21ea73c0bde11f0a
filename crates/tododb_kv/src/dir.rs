//! Database directory layout and locking.
//!
//! ```text
//! <db_path>/
//! ├─ LOCK       # advisory lock, held while a handle is open
//! └─ wal.log    # write-ahead log, the only data file
//! ```

use crate::error::{KvError, KvResult};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

const LOCK_FILE: &str = "LOCK";
const WAL_FILE: &str = "wal.log";

/// An opened database directory.
///
/// Holds an exclusive advisory lock on `LOCK` for as long as it lives, so at
/// most one handle (in this or any other process) works on a directory at a
/// time. The lock is released when the value is dropped.
#[derive(Debug)]
pub struct DatabaseDir {
    path: PathBuf,
    _lock_file: File,
}

impl DatabaseDir {
    /// Opens `path`, creating it first when `create_if_missing` is set.
    ///
    /// # Errors
    ///
    /// - [`KvError::InvalidFormat`] if the directory is missing and may not
    ///   be created, or `path` is not a directory
    /// - [`KvError::DatabaseLocked`] if another handle holds the lock
    /// - I/O errors
    pub fn open(path: &Path, create_if_missing: bool) -> KvResult<Self> {
        if !path.exists() {
            if !create_if_missing {
                return Err(KvError::invalid_format(format!(
                    "database directory does not exist: {}",
                    path.display()
                )));
            }
            fs::create_dir_all(path)?;
        }

        if !path.is_dir() {
            return Err(KvError::invalid_format(format!(
                "path is not a directory: {}",
                path.display()
            )));
        }

        let lock_file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path.join(LOCK_FILE))?;

        if lock_file.try_lock_exclusive().is_err() {
            return Err(KvError::DatabaseLocked);
        }

        Ok(Self {
            path: path.to_path_buf(),
            _lock_file: lock_file,
        })
    }

    /// Returns the directory path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the path of the write-ahead log.
    #[must_use]
    pub fn wal_path(&self) -> PathBuf {
        self.path.join(WAL_FILE)
    }

    /// True if the directory holds no log data yet.
    #[must_use]
    pub fn is_new_database(&self) -> bool {
        fs::metadata(self.wal_path()).map_or(true, |meta| meta.len() == 0)
    }
}
