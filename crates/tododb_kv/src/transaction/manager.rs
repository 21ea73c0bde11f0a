//! Transaction manager.

use crate::config::Config;
use crate::error::{KvError, KvResult};
use crate::keyspace::Keyspace;
use crate::recovery::Recovered;
use crate::transaction::{ReadTransaction, WriteTransaction};
use crate::types::{SequenceNumber, TransactionId};
use crate::wal::{WalRecord, WalWriter};
use parking_lot::{Mutex, RwLock};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Buffered writes of one transaction: `None` deletes the key.
pub(crate) type WriteSet = BTreeMap<Vec<u8>, Option<Vec<u8>>>;

/// Owns the committed keyspace and the log, and sequences commits.
///
/// Commit protocol, run while the caller holds the writer lock:
///
/// 1. append `Begin`, the writes and `Commit` to the log as one batch,
///    flush (and sync)
/// 2. install the writes as versions tagged with the new sequence number
/// 3. publish the sequence number, making the commit visible to new
///    snapshots
/// 4. prune versions older than the oldest open reader's snapshot
pub(crate) struct TransactionManager {
    wal: WalWriter,
    keyspace: RwLock<Keyspace>,
    next_txid: AtomicU64,
    committed_seq: AtomicU64,
    write_lock: Mutex<()>,
    /// Open read snapshots with their reader counts.
    readers: Mutex<BTreeMap<SequenceNumber, usize>>,
    closed: AtomicBool,
    sync_on_commit: bool,
    max_key_size: usize,
}

impl TransactionManager {
    pub(crate) fn new(wal: WalWriter, recovered: Recovered, config: &Config) -> Self {
        Self {
            wal,
            keyspace: RwLock::new(recovered.keyspace),
            next_txid: AtomicU64::new(recovered.next_txid),
            committed_seq: AtomicU64::new(recovered.committed_seq.as_u64()),
            write_lock: Mutex::new(()),
            readers: Mutex::new(BTreeMap::new()),
            closed: AtomicBool::new(false),
            sync_on_commit: config.sync_on_commit,
            max_key_size: config.max_key_size,
        }
    }

    pub(crate) fn begin_read(&self) -> ReadTransaction<'_> {
        let mut readers = self.readers.lock();
        let snapshot = self.committed_seq();
        *readers.entry(snapshot).or_insert(0) += 1;
        ReadTransaction::new(self, snapshot)
    }

    pub(crate) fn release_reader(&self, snapshot: SequenceNumber) {
        let mut readers = self.readers.lock();
        if let Some(count) = readers.get_mut(&snapshot) {
            *count -= 1;
            if *count == 0 {
                readers.remove(&snapshot);
            }
        }
    }

    /// Blocks until no other write transaction is open.
    pub(crate) fn begin_write(&self) -> KvResult<WriteTransaction<'_>> {
        let guard = self.write_lock.lock();
        if self.is_closed() {
            return Err(KvError::DatabaseClosed);
        }
        let txid = TransactionId::new(self.next_txid.fetch_add(1, Ordering::SeqCst));
        tracing::trace!(%txid, "began write transaction");
        Ok(WriteTransaction::new(self, guard, txid, self.committed_seq()))
    }

    /// Commits `writes` as `txid`. The caller must hold the writer lock.
    pub(crate) fn commit(&self, txid: TransactionId, writes: WriteSet) -> KvResult<SequenceNumber> {
        if writes.is_empty() {
            return Ok(self.committed_seq());
        }

        let sequence = self.committed_seq().next();
        let write_count = writes.len();

        let mut records = Vec::with_capacity(write_count + 2);
        records.push(WalRecord::Begin { txid });
        records.extend(writes.into_iter().map(|(key, value)| match value {
            Some(value) => WalRecord::Put { txid, key, value },
            None => WalRecord::Delete { txid, key },
        }));
        records.push(WalRecord::Commit { txid, sequence });

        self.wal.append_batch(&records, self.sync_on_commit)?;

        self.keyspace.write().apply(
            sequence,
            records.into_iter().filter_map(|record| match record {
                WalRecord::Put { key, value, .. } => Some((key, Some(value))),
                WalRecord::Delete { key, .. } => Some((key, None)),
                WalRecord::Begin { .. } | WalRecord::Commit { .. } => None,
            }),
        );
        self.committed_seq
            .store(sequence.as_u64(), Ordering::SeqCst);

        let horizon = {
            let readers = self.readers.lock();
            readers.keys().next().copied().unwrap_or(sequence)
        };
        self.keyspace.write().prune(horizon);

        tracing::debug!(%txid, %sequence, writes = write_count, "committed transaction");
        Ok(sequence)
    }

    pub(crate) fn get_at(&self, key: &[u8], snapshot: SequenceNumber) -> Option<Vec<u8>> {
        self.keyspace.read().get(key, snapshot).map(<[u8]>::to_vec)
    }

    pub(crate) fn scan_at(&self, snapshot: SequenceNumber) -> Vec<(Vec<u8>, Vec<u8>)> {
        self.keyspace.read().scan(snapshot)
    }

    pub(crate) fn count_at(&self, snapshot: SequenceNumber) -> usize {
        self.keyspace.read().live_count(snapshot)
    }

    pub(crate) fn check_key(&self, key: &[u8]) -> KvResult<()> {
        if key.is_empty() {
            return Err(KvError::invalid_argument("key cannot be empty"));
        }
        if key.len() > self.max_key_size {
            return Err(KvError::invalid_argument(format!(
                "key of {} bytes exceeds the {} byte limit",
                key.len(),
                self.max_key_size
            )));
        }
        Ok(())
    }

    pub(crate) fn check_value(value: &[u8]) -> KvResult<()> {
        if value.len() > Config::MAX_VALUE_SIZE {
            return Err(KvError::invalid_argument(format!(
                "value of {} bytes exceeds the {} byte limit",
                value.len(),
                Config::MAX_VALUE_SIZE
            )));
        }
        Ok(())
    }

    /// Fails with [`KvError::TransactionClosed`] once the database is closed.
    pub(crate) fn ensure_usable(&self) -> KvResult<()> {
        if self.is_closed() {
            Err(KvError::TransactionClosed)
        } else {
            Ok(())
        }
    }

    pub(crate) fn committed_seq(&self) -> SequenceNumber {
        SequenceNumber::new(self.committed_seq.load(Ordering::SeqCst))
    }

    pub(crate) fn active_readers(&self) -> usize {
        self.readers.lock().values().sum()
    }

    pub(crate) fn wal_size(&self) -> KvResult<u64> {
        self.wal.size()
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub(crate) fn close(&self) -> KvResult<()> {
        self.wal.close()?;
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

impl std::fmt::Debug for TransactionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionManager")
            .field("committed_seq", &self.committed_seq())
            .field("active_readers", &self.active_readers())
            .field("wal", &self.wal)
            .finish_non_exhaustive()
    }
}
