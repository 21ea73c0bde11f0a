//! Rebuilding the keyspace from the log.

use crate::error::{KvError, KvResult};
use crate::keyspace::Keyspace;
use crate::types::{SequenceNumber, TransactionId};
use crate::wal::{read_log, WalReader, WalRecord};
use std::collections::HashMap;
use tododb_storage::StorageBackend;

/// State recovered from a log.
#[derive(Debug)]
pub(crate) struct Recovered {
    pub(crate) keyspace: Keyspace,
    pub(crate) next_txid: u64,
    pub(crate) committed_seq: SequenceNumber,
}

/// Replays every committed transaction in `backend`.
///
/// Writes of transactions without a `Commit` record are ignored. Anything
/// after the last `Commit` (a torn record or an unfinished batch) is cut off
/// the log so new commits never land behind it.
///
/// # Errors
///
/// Corruption anywhere in the log is fatal, as is a record that refers to a
/// transaction that never began, a transaction that begins twice, or a
/// commit sequence that goes backwards.
pub(crate) fn recover(backend: &mut dyn StorageBackend) -> KvResult<Recovered> {
    let data = read_log(backend)?;
    let mut reader = WalReader::new(&data);

    let mut keyspace = Keyspace::new();
    let mut open: HashMap<TransactionId, Vec<(Vec<u8>, Option<Vec<u8>>)>> = HashMap::new();
    let mut committed_seq = SequenceNumber::default();
    let mut max_txid = 0;
    let mut valid_end = 0;
    let mut replayed = 0usize;

    while let Some((offset, record)) = reader.next_record()? {
        let txid = record.txid();
        max_txid = max_txid.max(txid.as_u64());

        match record {
            WalRecord::Begin { txid } => {
                if open.insert(txid, Vec::new()).is_some() {
                    return Err(KvError::wal_corruption(format!(
                        "transaction {txid} begins twice, again at offset {offset}"
                    )));
                }
            }
            WalRecord::Put { txid, key, value } => {
                writes_of(&mut open, txid, offset)?.push((key, Some(value)));
            }
            WalRecord::Delete { txid, key } => {
                writes_of(&mut open, txid, offset)?.push((key, None));
            }
            WalRecord::Commit { txid, sequence } => {
                let writes = open.remove(&txid).ok_or_else(|| {
                    KvError::wal_corruption(format!(
                        "commit for unknown transaction {txid} at offset {offset}"
                    ))
                })?;
                if sequence <= committed_seq {
                    return Err(KvError::wal_corruption(format!(
                        "commit {sequence} at offset {offset} does not follow {committed_seq}"
                    )));
                }
                keyspace.apply(sequence, writes);
                committed_seq = sequence;
                valid_end = reader.position();
                replayed += 1;
            }
        }
    }

    keyspace.prune(committed_seq);

    let size = data.len() as u64;
    if valid_end < size {
        tracing::warn!(
            discarded_bytes = size - valid_end,
            torn_at = ?reader.torn_tail(),
            "discarding incomplete tail of the log"
        );
        backend.truncate(valid_end)?;
    }

    tracing::debug!(
        transactions = replayed,
        committed = %committed_seq,
        "replayed log"
    );

    Ok(Recovered {
        keyspace,
        next_txid: max_txid + 1,
        committed_seq,
    })
}

fn writes_of(
    open: &mut HashMap<TransactionId, Vec<(Vec<u8>, Option<Vec<u8>>)>>,
    txid: TransactionId,
    offset: u64,
) -> KvResult<&mut Vec<(Vec<u8>, Option<Vec<u8>>)>> {
    open.get_mut(&txid).ok_or_else(|| {
        KvError::wal_corruption(format!(
            "write for unknown transaction {txid} at offset {offset}"
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tododb_storage::InMemoryBackend;

    fn encode_all(records: &[WalRecord]) -> Vec<u8> {
        records.iter().flat_map(|r| r.encode().unwrap()).collect()
    }

    fn txn(txid: u64, seq: Option<u64>, key: &str, value: &str) -> Vec<WalRecord> {
        let txid = TransactionId::new(txid);
        let mut records = vec![
            WalRecord::Begin { txid },
            WalRecord::Put {
                txid,
                key: key.as_bytes().to_vec(),
                value: value.as_bytes().to_vec(),
            },
        ];
        if let Some(seq) = seq {
            records.push(WalRecord::Commit {
                txid,
                sequence: SequenceNumber::new(seq),
            });
        }
        records
    }

    #[test]
    fn empty_log_recovers_empty() {
        let mut backend = InMemoryBackend::new();
        let recovered = recover(&mut backend).unwrap();
        assert_eq!(recovered.committed_seq, SequenceNumber::new(0));
        assert_eq!(recovered.next_txid, 1);
        assert_eq!(recovered.keyspace.live_count(SequenceNumber::new(0)), 0);
    }

    #[test]
    fn replays_committed_and_drops_unfinished_tail() {
        let mut records = txn(1, Some(1), "1", "milk");
        records.extend(txn(2, Some(2), "2", "eggs"));
        let committed_len = encode_all(&records).len() as u64;
        records.extend(txn(3, None, "3", "bread"));

        let mut backend = InMemoryBackend::with_data(encode_all(&records));
        let recovered = recover(&mut backend).unwrap();

        let seq = recovered.committed_seq;
        assert_eq!(seq, SequenceNumber::new(2));
        assert_eq!(recovered.next_txid, 4);
        assert_eq!(recovered.keyspace.get(b"1", seq), Some(&b"milk"[..]));
        assert_eq!(recovered.keyspace.get(b"3", seq), None);
        assert_eq!(backend.size().unwrap(), committed_len);
    }

    #[test]
    fn torn_record_is_truncated() {
        let data = encode_all(&txn(1, Some(1), "1", "milk"));
        let good_len = data.len();
        let mut with_tail = data.clone();
        with_tail.extend_from_slice(&encode_all(&txn(2, Some(2), "2", "eggs"))[..20]);

        let mut backend = InMemoryBackend::with_data(with_tail);
        let recovered = recover(&mut backend).unwrap();
        assert_eq!(recovered.committed_seq, SequenceNumber::new(1));
        assert_eq!(backend.data(), data);
        assert_eq!(backend.size().unwrap(), good_len as u64);
    }

    #[test]
    fn checksum_failure_is_fatal() {
        let mut data = encode_all(&txn(1, Some(1), "1", "milk"));
        let last = data.len() - 1;
        data[last] ^= 0xFF;

        let mut backend = InMemoryBackend::with_data(data.clone());
        assert!(matches!(
            recover(&mut backend),
            Err(KvError::ChecksumMismatch { .. })
        ));
        assert_eq!(backend.data(), data);
    }

    #[test]
    fn orphan_write_is_corruption() {
        let txid = TransactionId::new(4);
        let data = encode_all(&[WalRecord::Delete {
            txid,
            key: b"x".to_vec(),
        }]);
        let mut backend = InMemoryBackend::with_data(data);
        assert!(matches!(
            recover(&mut backend),
            Err(KvError::WalCorruption { .. })
        ));
    }

    #[test]
    fn repeated_begin_is_corruption() {
        let mut records = txn(1, None, "a", "1");
        records.extend(txn(1, Some(1), "b", "2"));
        let mut backend = InMemoryBackend::with_data(encode_all(&records));

        let err = recover(&mut backend).unwrap_err();
        assert!(err.is_corruption());
        assert!(err.to_string().contains("begins twice"));
    }

    #[test]
    fn backwards_sequence_is_corruption() {
        let mut records = txn(1, Some(5), "a", "1");
        records.extend(txn(2, Some(5), "b", "2"));
        let mut backend = InMemoryBackend::with_data(encode_all(&records));
        assert!(matches!(
            recover(&mut backend),
            Err(KvError::WalCorruption { .. })
        ));
    }
}
