//! Repository error taxonomy.

use thiserror::Error;
use tododb_kv::KvError;

/// Result type for repository operations.
pub type RepoResult<T> = Result<T, RepoError>;

/// Errors reported by a [`crate::TodoRepository`].
///
/// The three kinds do not overlap: callers map them to responses by kind
/// alone.
#[derive(Debug, Error)]
pub enum RepoError {
    /// The caller supplied something unacceptable: a blank field, or an id
    /// that already exists on create.
    #[error("invalid input: {message}")]
    InvalidInput {
        /// What was wrong.
        message: String,
    },

    /// No todo has the given id.
    #[error("todo with id {id} not found")]
    NotFound {
        /// The id that was looked up.
        id: String,
    },

    /// The storage layer failed during `op`.
    #[error("database error during {op}: {source}")]
    Database {
        /// The step that failed, such as `Create.Check` or `GetAll.Unmarshal`.
        op: &'static str,
        /// The underlying failure.
        source: DatabaseCause,
    },
}

/// What went wrong underneath a [`RepoError::Database`].
#[derive(Debug, Error)]
pub enum DatabaseCause {
    /// The key-value engine failed.
    #[error(transparent)]
    Engine(#[from] KvError),

    /// A record could not be encoded or decoded.
    #[error("codec error: {0}")]
    Codec(String),
}

impl RepoError {
    /// Creates an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    /// Creates a database error for step `op`.
    pub fn database(op: &'static str, cause: impl Into<DatabaseCause>) -> Self {
        Self::Database {
            op,
            source: cause.into(),
        }
    }

    /// True for [`RepoError::InvalidInput`].
    #[must_use]
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput { .. })
    }

    /// True for [`RepoError::NotFound`].
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// True for [`RepoError::Database`].
    #[must_use]
    pub fn is_database(&self) -> bool {
        matches!(self, Self::Database { .. })
    }

    /// The failing step of a [`RepoError::Database`].
    #[must_use]
    pub fn op(&self) -> Option<&'static str> {
        match self {
            Self::Database { op, .. } => Some(*op),
            _ => None,
        }
    }
}
