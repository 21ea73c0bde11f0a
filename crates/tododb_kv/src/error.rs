//! Engine error types.

use std::io;
use thiserror::Error;
use tododb_storage::StorageError;

/// Result type for engine operations.
pub type KvResult<T> = Result<T, KvError>;

/// Errors raised by the key-value engine.
#[derive(Debug, Error)]
pub enum KvError {
    /// The storage backend failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// A file system operation outside the backend failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The write-ahead log contains a record that cannot be trusted.
    #[error("WAL corruption: {message}")]
    WalCorruption {
        /// What was wrong and where.
        message: String,
    },

    /// A log record's stored checksum does not match its contents.
    #[error("checksum mismatch: expected {expected:08x}, got {actual:08x}")]
    ChecksumMismatch {
        /// Checksum stored in the record.
        expected: u32,
        /// Checksum computed over the record.
        actual: u32,
    },

    /// Another handle holds the directory lock.
    #[error("database locked: another process has exclusive access")]
    DatabaseLocked,

    /// The database directory is missing, unexpected or unusable.
    #[error("invalid database format: {message}")]
    InvalidFormat {
        /// Description of the problem.
        message: String,
    },

    /// A key or value was rejected before touching the log.
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// Description of the problem.
        message: String,
    },

    /// A failed append could not be rolled back, so the log tail is unknown.
    /// Every later commit is refused until the database is reopened.
    #[error("write-ahead log is unusable after a failed rollback at offset {offset}")]
    WalPoisoned {
        /// Log length the rollback tried to restore.
        offset: u64,
    },

    /// The transaction outlived the database it belongs to.
    #[error("transaction is closed")]
    TransactionClosed,

    /// The database handle has been closed.
    #[error("database is closed")]
    DatabaseClosed,
}

impl KvError {
    /// Creates a WAL corruption error.
    pub fn wal_corruption(message: impl Into<String>) -> Self {
        Self::WalCorruption {
            message: message.into(),
        }
    }

    /// Creates an invalid format error.
    pub fn invalid_format(message: impl Into<String>) -> Self {
        Self::InvalidFormat {
            message: message.into(),
        }
    }

    /// Creates an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Returns true for errors that mean the log on disk is damaged.
    #[must_use]
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            Self::WalCorruption { .. } | Self::ChecksumMismatch { .. }
        )
    }
}
