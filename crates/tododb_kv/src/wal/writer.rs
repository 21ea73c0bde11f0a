//! Log appender.

use crate::error::{KvError, KvResult};
use crate::wal::record::WalRecord;
use parking_lot::Mutex;
use tododb_storage::StorageBackend;

/// Appends transaction batches to the log.
///
/// All access to the backend goes through one mutex. Once closed, the
/// writer rejects further batches with [`KvError::TransactionClosed`]. If a
/// failed batch cannot be cut back off the log, the writer is poisoned and
/// rejects further batches with [`KvError::WalPoisoned`].
pub(crate) struct WalWriter {
    state: Mutex<WriterState>,
}

struct WriterState {
    backend: Box<dyn StorageBackend>,
    closed: bool,
    poisoned_at: Option<u64>,
}

impl WalWriter {
    pub(crate) fn new(backend: Box<dyn StorageBackend>) -> Self {
        Self {
            state: Mutex::new(WriterState {
                backend,
                closed: false,
                poisoned_at: None,
            }),
        }
    }

    /// Appends `records` as one contiguous write, then flushes (and syncs if
    /// asked). Returns the offset of the first record.
    ///
    /// If any step fails, the log is cut back to its previous length so no
    /// partial batch stays behind a later commit. If that cut fails too, the
    /// failed batch may still be in the log with the sequence number the
    /// next commit would reuse, so the writer is poisoned.
    pub(crate) fn append_batch(&self, records: &[WalRecord], sync: bool) -> KvResult<u64> {
        let mut buf = Vec::new();
        for record in records {
            buf.extend(record.encode()?);
        }

        let mut state = self.state.lock();
        if state.closed {
            return Err(KvError::TransactionClosed);
        }
        if let Some(offset) = state.poisoned_at {
            return Err(KvError::WalPoisoned { offset });
        }

        let start = state.backend.size()?;
        let written = write_through(state.backend.as_mut(), &buf, sync);
        if written.is_err() {
            if let Err(err) = state.backend.truncate(start) {
                tracing::error!(
                    error = %err,
                    offset = start,
                    "failed to roll back partial log append, refusing further commits"
                );
                state.poisoned_at = Some(start);
            }
        }
        written
    }

    pub(crate) fn size(&self) -> KvResult<u64> {
        Ok(self.state.lock().backend.size()?)
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    /// Flushes and syncs the log, then refuses further appends.
    ///
    /// A poisoned writer is closed without touching the backend again.
    pub(crate) fn close(&self) -> KvResult<()> {
        let mut state = self.state.lock();
        if state.closed {
            return Ok(());
        }
        if state.poisoned_at.is_some() {
            state.closed = true;
            return Ok(());
        }
        state.backend.flush()?;
        state.backend.sync()?;
        state.closed = true;
        Ok(())
    }
}

fn write_through(backend: &mut dyn StorageBackend, buf: &[u8], sync: bool) -> KvResult<u64> {
    let offset = backend.append(buf)?;
    backend.flush()?;
    if sync {
        backend.sync()?;
    }
    Ok(offset)
}

impl std::fmt::Debug for WalWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalWriter")
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}
