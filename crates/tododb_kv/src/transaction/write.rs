//! Read-write transactions.

use crate::error::KvResult;
use crate::transaction::manager::WriteSet;
use crate::transaction::TransactionManager;
use crate::types::{SequenceNumber, TransactionId};
use parking_lot::MutexGuard;

/// The single open read-write transaction.
///
/// Reads see the transaction's own buffered writes first, then the snapshot
/// it started from. Because it holds the writer lock, no other commit can
/// land between its reads and its commit.
///
/// Dropping a transaction without calling [`WriteTransaction::commit`]
/// aborts it.
pub struct WriteTransaction<'db> {
    manager: &'db TransactionManager,
    _guard: MutexGuard<'db, ()>,
    id: TransactionId,
    snapshot: SequenceNumber,
    writes: WriteSet,
    finished: bool,
}

impl<'db> WriteTransaction<'db> {
    pub(crate) fn new(
        manager: &'db TransactionManager,
        guard: MutexGuard<'db, ()>,
        id: TransactionId,
        snapshot: SequenceNumber,
    ) -> Self {
        Self {
            manager,
            _guard: guard,
            id,
            snapshot,
            writes: WriteSet::new(),
            finished: false,
        }
    }

    /// This transaction's ID.
    #[must_use]
    pub fn id(&self) -> TransactionId {
        self.id
    }

    /// Sequence number of the commit this transaction started from.
    #[must_use]
    pub fn snapshot(&self) -> SequenceNumber {
        self.snapshot
    }

    /// Number of buffered writes.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.writes.len()
    }

    /// Returns the value under `key` as this transaction sees it.
    ///
    /// # Errors
    ///
    /// - [`crate::KvError::InvalidArgument`] for an empty or oversized key
    /// - [`crate::KvError::TransactionClosed`] after the database is closed
    pub fn get(&self, key: &[u8]) -> KvResult<Option<Vec<u8>>> {
        self.manager.ensure_usable()?;
        self.manager.check_key(key)?;
        match self.writes.get(key) {
            Some(pending) => Ok(pending.clone()),
            None => Ok(self.manager.get_at(key, self.snapshot)),
        }
    }

    /// True if `key` holds a value as this transaction sees it.
    ///
    /// # Errors
    ///
    /// Same as [`WriteTransaction::get`].
    pub fn contains(&self, key: &[u8]) -> KvResult<bool> {
        self.manager.ensure_usable()?;
        self.manager.check_key(key)?;
        match self.writes.get(key) {
            Some(pending) => Ok(pending.is_some()),
            None => Ok(self.manager.get_at(key, self.snapshot).is_some()),
        }
    }

    /// Buffers `key = value`, replacing any earlier write to `key`.
    ///
    /// # Errors
    ///
    /// - [`crate::KvError::InvalidArgument`] for an empty or oversized key,
    ///   or an oversized value
    /// - [`crate::KvError::TransactionClosed`] after the database is closed
    pub fn put(&mut self, key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> KvResult<()> {
        let key = key.into();
        let value = value.into();
        self.manager.ensure_usable()?;
        self.manager.check_key(&key)?;
        TransactionManager::check_value(&value)?;
        self.writes.insert(key, Some(value));
        Ok(())
    }

    /// Buffers the removal of `key`. Removing an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Same as [`WriteTransaction::get`].
    pub fn delete(&mut self, key: impl Into<Vec<u8>>) -> KvResult<()> {
        let key = key.into();
        self.manager.ensure_usable()?;
        self.manager.check_key(&key)?;
        self.writes.insert(key, None);
        Ok(())
    }

    /// Makes every buffered write durable and visible, atomically.
    ///
    /// Returns the commit's sequence number; a transaction with no writes
    /// logs nothing and returns the current one.
    ///
    /// # Errors
    ///
    /// Returns an error if the log append fails (nothing is applied) or
    /// [`crate::KvError::TransactionClosed`] if the database was closed.
    pub fn commit(mut self) -> KvResult<SequenceNumber> {
        self.finished = true;
        let writes = std::mem::take(&mut self.writes);
        self.manager.commit(self.id, writes)
    }

    /// Discards every buffered write.
    pub fn abort(mut self) {
        self.finished = true;
        tracing::trace!(txid = %self.id, "aborted write transaction");
    }
}

impl Drop for WriteTransaction<'_> {
    fn drop(&mut self) {
        if !self.finished {
            tracing::debug!(
                txid = %self.id,
                discarded = self.writes.len(),
                "write transaction dropped without commit, aborting"
            );
        }
    }
}

impl std::fmt::Debug for WriteTransaction<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WriteTransaction")
            .field("id", &self.id)
            .field("snapshot", &self.snapshot)
            .field("writes", &self.writes.len())
            .finish_non_exhaustive()
    }
}
