//! Database handle.

use crate::config::Config;
use crate::dir::DatabaseDir;
use crate::error::{KvError, KvResult};
use crate::recovery::recover;
use crate::transaction::{ReadTransaction, TransactionManager, WriteTransaction};
use crate::types::SequenceNumber;
use crate::wal::WalWriter;
use parking_lot::RwLock;
use std::path::Path;
use tododb_storage::{FileBackend, InMemoryBackend, StorageBackend};

/// Point-in-time figures about an open database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatabaseStats {
    /// Keys holding a value in the latest commit.
    pub key_count: usize,
    /// Sequence number of the latest commit.
    pub committed_seq: SequenceNumber,
    /// Size of the write-ahead log in bytes.
    pub wal_size: u64,
    /// Read transactions currently open.
    pub active_readers: usize,
}

/// An open key-value database.
///
/// The handle is `Send + Sync`; share it as `Arc<Database>`. Transactions
/// borrow it, so it cannot be dropped while one is open.
///
/// ```
/// use tododb_kv::{Database, KvError};
///
/// let db = Database::open_in_memory().unwrap();
/// db.update(|txn| txn.put(b"1".to_vec(), b"Buy milk".to_vec())).unwrap();
///
/// let value = db.view(|txn| txn.get(b"1")).unwrap();
/// assert_eq!(value.as_deref(), Some(&b"Buy milk"[..]));
///
/// db.close().unwrap();
/// assert!(matches!(db.begin_read(), Err(KvError::DatabaseClosed)));
/// ```
pub struct Database {
    config: Config,
    dir: Option<DatabaseDir>,
    manager: TransactionManager,
    is_open: RwLock<bool>,
}

impl Database {
    /// Opens the database directory at `path` with default options.
    ///
    /// # Errors
    ///
    /// See [`Database::open_with_config`].
    pub fn open(path: &Path) -> KvResult<Self> {
        Self::open_with_config(path, Config::default())
    }

    /// Opens the database directory at `path`.
    ///
    /// Takes the directory lock, then replays the log.
    ///
    /// # Errors
    ///
    /// - [`KvError::DatabaseLocked`] if another handle has the directory
    /// - [`KvError::InvalidFormat`] if the directory is missing (and may not
    ///   be created) or already exists with `error_if_exists`
    /// - [`KvError::ChecksumMismatch`] / [`KvError::WalCorruption`] if the
    ///   log is damaged
    /// - I/O errors
    pub fn open_with_config(path: &Path, config: Config) -> KvResult<Self> {
        let dir = DatabaseDir::open(path, config.create_if_missing)?;
        if config.error_if_exists && !dir.is_new_database() {
            return Err(KvError::invalid_format(format!(
                "database already exists: {}",
                path.display()
            )));
        }

        let backend = FileBackend::open(&dir.wal_path())?;
        let db = Self::build(config, Box::new(backend), Some(dir))?;
        tracing::info!(
            path = %path.display(),
            committed = %db.manager.committed_seq(),
            "opened database"
        );
        Ok(db)
    }

    /// Opens a database over an arbitrary log backend, without a directory
    /// or lock.
    ///
    /// # Errors
    ///
    /// Returns an error if the log cannot be read or is corrupt.
    pub fn open_with_backend(config: Config, backend: Box<dyn StorageBackend>) -> KvResult<Self> {
        Self::build(config, backend, None)
    }

    /// Opens an empty database that lives only in memory.
    ///
    /// # Errors
    ///
    /// Does not fail in practice; the signature matches the other
    /// constructors.
    pub fn open_in_memory() -> KvResult<Self> {
        Self::open_with_backend(Config::default(), Box::new(InMemoryBackend::new()))
    }

    fn build(
        config: Config,
        mut backend: Box<dyn StorageBackend>,
        dir: Option<DatabaseDir>,
    ) -> KvResult<Self> {
        let recovered = recover(backend.as_mut())?;
        let manager = TransactionManager::new(WalWriter::new(backend), recovered, &config);
        Ok(Self {
            config,
            dir,
            manager,
            is_open: RwLock::new(true),
        })
    }

    /// Starts a snapshot read transaction.
    ///
    /// # Errors
    ///
    /// Returns [`KvError::DatabaseClosed`] after [`Database::close`].
    pub fn begin_read(&self) -> KvResult<ReadTransaction<'_>> {
        self.ensure_open()?;
        Ok(self.manager.begin_read())
    }

    /// Starts the read-write transaction, waiting for any other to finish.
    ///
    /// # Errors
    ///
    /// Returns [`KvError::DatabaseClosed`] after [`Database::close`].
    pub fn begin_write(&self) -> KvResult<WriteTransaction<'_>> {
        self.ensure_open()?;
        self.manager.begin_write()
    }

    /// Runs `f` in a read transaction.
    ///
    /// # Errors
    ///
    /// Returns `f`'s error, or the engine error from starting the transaction.
    pub fn view<F, T, E>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&ReadTransaction<'_>) -> Result<T, E>,
        E: From<KvError>,
    {
        let txn = self.begin_read()?;
        f(&txn)
    }

    /// Runs `f` in a write transaction, committing if it returns `Ok` and
    /// aborting if it returns `Err`.
    ///
    /// # Errors
    ///
    /// Returns `f`'s error, or the engine error from begin or commit.
    pub fn update<F, T, E>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut WriteTransaction<'_>) -> Result<T, E>,
        E: From<KvError>,
    {
        let mut txn = self.begin_write()?;
        match f(&mut txn) {
            Ok(value) => {
                txn.commit()?;
                Ok(value)
            }
            Err(err) => {
                txn.abort();
                Err(err)
            }
        }
    }

    /// Current statistics.
    ///
    /// # Errors
    ///
    /// Returns [`KvError::DatabaseClosed`] after close, or an error if the
    /// log size cannot be read.
    pub fn stats(&self) -> KvResult<DatabaseStats> {
        self.ensure_open()?;
        let committed_seq = self.manager.committed_seq();
        Ok(DatabaseStats {
            key_count: self.manager.count_at(committed_seq),
            committed_seq,
            wal_size: self.manager.wal_size()?,
            active_readers: self.manager.active_readers(),
        })
    }

    /// Sequence number of the latest commit.
    #[must_use]
    pub fn committed_seq(&self) -> SequenceNumber {
        self.manager.committed_seq()
    }

    /// The options this database was opened with.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The database directory, or `None` for backend-only databases.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.dir.as_ref().map(DatabaseDir::path)
    }

    /// Flushes and syncs the log and closes the handle.
    ///
    /// Idempotent. Afterwards new transactions fail with
    /// [`KvError::DatabaseClosed`] and transactions still open fail with
    /// [`KvError::TransactionClosed`]. The directory lock is released when
    /// the handle is dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if the final flush or sync fails; the handle then
    /// stays open.
    pub fn close(&self) -> KvResult<()> {
        let mut is_open = self.is_open.write();
        if !*is_open {
            return Ok(());
        }

        self.manager.close()?;
        *is_open = false;
        tracing::info!(committed = %self.manager.committed_seq(), "closed database");
        Ok(())
    }

    /// True until [`Database::close`] succeeds.
    #[must_use]
    pub fn is_open(&self) -> bool {
        *self.is_open.read()
    }

    fn ensure_open(&self) -> KvResult<()> {
        if *self.is_open.read() {
            Ok(())
        } else {
            Err(KvError::DatabaseClosed)
        }
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("path", &self.path())
            .field("is_open", &self.is_open())
            .field("manager", &self.manager)
            .finish_non_exhaustive()
    }
}

impl Drop for Database {
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            tracing::warn!(error = %err, "failed to close database on drop");
        }
    }
}
