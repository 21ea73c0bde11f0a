//! Snapshot read transactions.

use crate::error::KvResult;
use crate::transaction::TransactionManager;
use crate::types::SequenceNumber;

/// A read-only view of the database as of one commit.
///
/// Later commits are invisible to it. Holding a read transaction keeps the
/// versions it can see from being pruned, so long-lived readers should be
/// dropped once they are done.
#[derive(Debug)]
pub struct ReadTransaction<'db> {
    manager: &'db TransactionManager,
    snapshot: SequenceNumber,
}

impl<'db> ReadTransaction<'db> {
    pub(crate) fn new(manager: &'db TransactionManager, snapshot: SequenceNumber) -> Self {
        Self { manager, snapshot }
    }

    /// Sequence number of the last commit this snapshot includes.
    #[must_use]
    pub fn snapshot(&self) -> SequenceNumber {
        self.snapshot
    }

    /// Returns the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// - [`crate::KvError::InvalidArgument`] for an empty or oversized key
    /// - [`crate::KvError::TransactionClosed`] after the database is closed
    pub fn get(&self, key: &[u8]) -> KvResult<Option<Vec<u8>>> {
        self.manager.ensure_usable()?;
        self.manager.check_key(key)?;
        Ok(self.manager.get_at(key, self.snapshot))
    }

    /// True if `key` holds a value.
    ///
    /// # Errors
    ///
    /// Same as [`ReadTransaction::get`].
    pub fn contains(&self, key: &[u8]) -> KvResult<bool> {
        Ok(self.get(key)?.is_some())
    }

    /// Every key/value pair, in ascending key order.
    ///
    /// # Errors
    ///
    /// Returns [`crate::KvError::TransactionClosed`] after the database is
    /// closed.
    pub fn scan(&self) -> KvResult<Vec<(Vec<u8>, Vec<u8>)>> {
        self.manager.ensure_usable()?;
        Ok(self.manager.scan_at(self.snapshot))
    }

    /// Number of keys holding a value.
    ///
    /// # Errors
    ///
    /// Returns [`crate::KvError::TransactionClosed`] after the database is
    /// closed.
    pub fn len(&self) -> KvResult<usize> {
        self.manager.ensure_usable()?;
        Ok(self.manager.count_at(self.snapshot))
    }

    /// True if no key holds a value.
    ///
    /// # Errors
    ///
    /// Same as [`ReadTransaction::len`].
    pub fn is_empty(&self) -> KvResult<bool> {
        Ok(self.len()? == 0)
    }
}

impl Drop for ReadTransaction<'_> {
    fn drop(&mut self) {
        self.manager.release_reader(self.snapshot);
    }
}
