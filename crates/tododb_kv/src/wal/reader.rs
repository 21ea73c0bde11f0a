//! Sequential log reader.

use crate::error::{KvError, KvResult};
use crate::wal::record::{WalRecord, WalRecordType, CRC_SIZE, HEADER_SIZE, WAL_MAGIC, WAL_VERSION};
use tododb_storage::StorageBackend;

/// Reads the whole log out of a backend.
///
/// # Errors
///
/// Returns an error if the backend cannot be read.
pub fn read_log(backend: &dyn StorageBackend) -> KvResult<Vec<u8>> {
    let size = backend.size()?;
    let len = usize::try_from(size)
        .map_err(|_| KvError::invalid_format(format!("log of {size} bytes is too large")))?;
    Ok(backend.read_at(0, len)?)
}

/// Walks log records in a byte buffer.
///
/// Yields `(offset, record)` pairs. Iteration stops at the end of the
/// buffer, at a torn tail (see [`WalReader::torn_tail`]) or after the first
/// error.
///
/// ```
/// use tododb_kv::wal::{WalReader, WalRecord};
/// use tododb_kv::TransactionId;
///
/// let data = WalRecord::Begin { txid: TransactionId::new(1) }.encode().unwrap();
/// let records: Vec<_> = WalReader::new(&data).collect::<Result<_, _>>().unwrap();
/// assert_eq!(records.len(), 1);
/// ```
#[derive(Debug)]
pub struct WalReader<'a> {
    data: &'a [u8],
    pos: usize,
    torn_tail: Option<u64>,
    finished: bool,
}

impl<'a> WalReader<'a> {
    /// Starts reading at the beginning of `data`.
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            torn_tail: None,
            finished: false,
        }
    }

    /// Offset just past the last record returned.
    #[must_use]
    pub fn position(&self) -> u64 {
        self.pos as u64
    }

    /// Offset of an incomplete trailing record, once the reader has hit one.
    #[must_use]
    pub fn torn_tail(&self) -> Option<u64> {
        self.torn_tail
    }

    /// Reads the next record.
    ///
    /// Returns `Ok(None)` at the end of the log or at a torn tail.
    ///
    /// # Errors
    ///
    /// - [`KvError::WalCorruption`] for a bad magic, version, type or payload
    /// - [`KvError::ChecksumMismatch`] if the CRC does not match
    pub fn next_record(&mut self) -> KvResult<Option<(u64, WalRecord)>> {
        if self.finished {
            return Ok(None);
        }

        let offset = self.pos;
        let rest = &self.data[offset..];
        if rest.is_empty() {
            self.finished = true;
            return Ok(None);
        }
        if rest.len() < HEADER_SIZE {
            return Ok(self.stop_torn(offset));
        }

        if rest[0..4] != WAL_MAGIC {
            return Err(self.fail(KvError::wal_corruption(format!(
                "invalid magic at offset {offset}"
            ))));
        }

        let version = u16::from_le_bytes([rest[4], rest[5]]);
        if version == 0 || version > WAL_VERSION {
            return Err(self.fail(KvError::wal_corruption(format!(
                "unsupported version {version} at offset {offset}"
            ))));
        }

        let Some(record_type) = WalRecordType::from_byte(rest[6]) else {
            let type_byte = rest[6];
            return Err(self.fail(KvError::wal_corruption(format!(
                "unknown record type {type_byte} at offset {offset}"
            ))));
        };

        let payload_len = u32::from_le_bytes([rest[7], rest[8], rest[9], rest[10]]) as usize;
        let total_len = HEADER_SIZE + payload_len + CRC_SIZE;
        if rest.len() < total_len {
            return Ok(self.stop_torn(offset));
        }

        let body = &rest[..HEADER_SIZE + payload_len];
        let crc_bytes = &rest[HEADER_SIZE + payload_len..total_len];
        let expected = u32::from_le_bytes([crc_bytes[0], crc_bytes[1], crc_bytes[2], crc_bytes[3]]);
        let actual = crc32fast::hash(body);
        if expected != actual {
            return Err(self.fail(KvError::ChecksumMismatch { expected, actual }));
        }

        let record = match WalRecord::decode_payload(record_type, &body[HEADER_SIZE..]) {
            Ok(record) => record,
            Err(err) => return Err(self.fail(err)),
        };

        self.pos += total_len;
        Ok(Some((offset as u64, record)))
    }

    fn stop_torn(&mut self, offset: usize) -> Option<(u64, WalRecord)> {
        self.torn_tail = Some(offset as u64);
        self.finished = true;
        None
    }

    fn fail(&mut self, err: KvError) -> KvError {
        self.finished = true;
        err
    }
}

impl Iterator for WalReader<'_> {
    type Item = KvResult<(u64, WalRecord)>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record().transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{SequenceNumber, TransactionId};
    use tododb_storage::InMemoryBackend;

    fn committed_put(txid: u64, seq: u64, key: &[u8], value: &[u8]) -> Vec<u8> {
        let txid = TransactionId::new(txid);
        let mut data = Vec::new();
        for record in [
            WalRecord::Begin { txid },
            WalRecord::Put {
                txid,
                key: key.to_vec(),
                value: value.to_vec(),
            },
            WalRecord::Commit {
                txid,
                sequence: SequenceNumber::new(seq),
            },
        ] {
            data.extend(record.encode().unwrap());
        }
        data
    }

    #[test]
    fn reads_records_with_offsets() {
        let data = committed_put(1, 1, b"1", b"milk");
        let records: Vec<_> = WalReader::new(&data).collect::<KvResult<_>>().unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].0, 0);
        assert_eq!(records[1].0, (HEADER_SIZE + 8 + CRC_SIZE) as u64);
        assert!(matches!(records[2].1, WalRecord::Commit { .. }));
    }

    #[test]
    fn empty_log_has_no_records() {
        let mut reader = WalReader::new(&[]);
        assert!(reader.next_record().unwrap().is_none());
        assert_eq!(reader.torn_tail(), None);
    }

    #[test]
    fn truncated_header_is_torn_tail() {
        let mut data = committed_put(1, 1, b"1", b"milk");
        let complete = data.len();
        data.extend_from_slice(&WAL_MAGIC);

        let mut reader = WalReader::new(&data);
        assert_eq!(reader.by_ref().count(), 3);
        assert_eq!(reader.torn_tail(), Some(complete as u64));
        assert_eq!(reader.position(), complete as u64);
    }

    #[test]
    fn truncated_payload_is_torn_tail() {
        let data = committed_put(1, 1, b"1", b"milk");
        let cut = &data[..data.len() - 3];

        let mut reader = WalReader::new(cut);
        let records: Vec<_> = reader.by_ref().collect::<KvResult<_>>().unwrap();
        assert_eq!(records.len(), 2);
        assert!(reader.torn_tail().is_some());
    }

    #[test]
    fn flipped_payload_bit_is_checksum_mismatch() {
        let mut data = committed_put(1, 1, b"1", b"milk");
        data[HEADER_SIZE + 2] ^= 0x40;

        let err = WalReader::new(&data).next().unwrap().unwrap_err();
        assert!(matches!(err, KvError::ChecksumMismatch { .. }));
    }

    #[test]
    fn bad_magic_is_corruption_and_stops() {
        let mut data = committed_put(1, 1, b"1", b"milk");
        data[0] = b'X';

        let mut reader = WalReader::new(&data);
        assert!(matches!(
            reader.next(),
            Some(Err(KvError::WalCorruption { .. }))
        ));
        assert!(reader.next().is_none());
    }

    #[test]
    fn unknown_type_and_future_version_are_corruption() {
        let mut data = committed_put(1, 1, b"1", b"milk");
        data[6] = 42;
        assert!(matches!(
            WalReader::new(&data).next(),
            Some(Err(KvError::WalCorruption { .. }))
        ));

        let mut data = committed_put(1, 1, b"1", b"milk");
        data[4] = 2;
        assert!(matches!(
            WalReader::new(&data).next(),
            Some(Err(KvError::WalCorruption { .. }))
        ));
    }

    #[test]
    fn read_log_copies_backend() {
        let data = committed_put(3, 2, b"k", b"v");
        let backend = InMemoryBackend::with_data(data.clone());
        assert_eq!(read_log(&backend).unwrap(), data);
    }
}
