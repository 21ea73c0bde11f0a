//! Log record types and their byte encoding.

use crate::error::{KvError, KvResult};
use crate::types::{SequenceNumber, TransactionId};

/// Magic bytes opening every record.
pub const WAL_MAGIC: [u8; 4] = *b"TKVL";

/// Format version written by this build.
pub const WAL_VERSION: u16 = 1;

/// magic (4) + version (2) + type (1) + length (4).
pub const HEADER_SIZE: usize = 11;

/// Trailing checksum size.
pub const CRC_SIZE: usize = 4;

/// Record type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum WalRecordType {
    /// Opens a transaction.
    Begin = 1,
    /// Stores a value under a key.
    Put = 2,
    /// Removes a key.
    Delete = 3,
    /// Closes a transaction and makes it durable.
    Commit = 4,
}

impl WalRecordType {
    /// Parses a type byte.
    #[must_use]
    pub fn from_byte(b: u8) -> Option<Self> {
        match b {
            1 => Some(Self::Begin),
            2 => Some(Self::Put),
            3 => Some(Self::Delete),
            4 => Some(Self::Commit),
            _ => None,
        }
    }

    /// Returns the type byte.
    #[must_use]
    pub const fn as_byte(self) -> u8 {
        self as u8
    }

    /// Short upper-case name used in dumps.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Begin => "BEGIN",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Commit => "COMMIT",
        }
    }
}

/// One log record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalRecord {
    /// Opens transaction `txid`.
    Begin {
        /// Transaction ID.
        txid: TransactionId,
    },

    /// Sets `key` to `value`.
    Put {
        /// Transaction ID.
        txid: TransactionId,
        /// Key bytes.
        key: Vec<u8>,
        /// Value bytes.
        value: Vec<u8>,
    },

    /// Removes `key`.
    Delete {
        /// Transaction ID.
        txid: TransactionId,
        /// Key bytes.
        key: Vec<u8>,
    },

    /// Commits `txid` as `sequence`.
    Commit {
        /// Transaction ID.
        txid: TransactionId,
        /// Sequence number assigned to the commit.
        sequence: SequenceNumber,
    },
}

impl WalRecord {
    /// Returns the record type.
    #[must_use]
    pub fn record_type(&self) -> WalRecordType {
        match self {
            Self::Begin { .. } => WalRecordType::Begin,
            Self::Put { .. } => WalRecordType::Put,
            Self::Delete { .. } => WalRecordType::Delete,
            Self::Commit { .. } => WalRecordType::Commit,
        }
    }

    /// Returns the owning transaction.
    #[must_use]
    pub fn txid(&self) -> TransactionId {
        match self {
            Self::Begin { txid }
            | Self::Put { txid, .. }
            | Self::Delete { txid, .. }
            | Self::Commit { txid, .. } => *txid,
        }
    }

    /// Serializes the payload (no envelope).
    ///
    /// # Errors
    ///
    /// Returns [`KvError::InvalidArgument`] if a key or value does not fit a
    /// `u32` length prefix.
    pub fn encode_payload(&self) -> KvResult<Vec<u8>> {
        let mut buf = Vec::new();
        match self {
            Self::Begin { txid } => {
                buf.extend_from_slice(&txid.as_u64().to_le_bytes());
            }
            Self::Put { txid, key, value } => {
                buf.reserve(16 + key.len() + value.len());
                buf.extend_from_slice(&txid.as_u64().to_le_bytes());
                put_bytes(&mut buf, key)?;
                put_bytes(&mut buf, value)?;
            }
            Self::Delete { txid, key } => {
                buf.extend_from_slice(&txid.as_u64().to_le_bytes());
                put_bytes(&mut buf, key)?;
            }
            Self::Commit { txid, sequence } => {
                buf.extend_from_slice(&txid.as_u64().to_le_bytes());
                buf.extend_from_slice(&sequence.as_u64().to_le_bytes());
            }
        }
        Ok(buf)
    }

    /// Parses a payload of the given type.
    ///
    /// # Errors
    ///
    /// Returns [`KvError::WalCorruption`] if the payload is short or carries
    /// trailing bytes.
    pub fn decode_payload(record_type: WalRecordType, payload: &[u8]) -> KvResult<Self> {
        let mut cursor = Cursor::new(payload);
        let txid = TransactionId::new(cursor.u64()?);

        let record = match record_type {
            WalRecordType::Begin => Self::Begin { txid },
            WalRecordType::Put => {
                let key = cursor.bytes()?;
                let value = cursor.bytes()?;
                Self::Put { txid, key, value }
            }
            WalRecordType::Delete => Self::Delete {
                txid,
                key: cursor.bytes()?,
            },
            WalRecordType::Commit => Self::Commit {
                txid,
                sequence: SequenceNumber::new(cursor.u64()?),
            },
        };

        if cursor.remaining() != 0 {
            return Err(KvError::wal_corruption(format!(
                "{} trailing bytes in {} record",
                cursor.remaining(),
                record_type.name()
            )));
        }
        Ok(record)
    }

    /// Serializes the record with its envelope and checksum.
    ///
    /// # Errors
    ///
    /// Propagates [`WalRecord::encode_payload`] failures.
    pub fn encode(&self) -> KvResult<Vec<u8>> {
        let payload = self.encode_payload()?;
        let len = u32::try_from(payload.len())
            .map_err(|_| KvError::invalid_argument("log record payload too large"))?;

        let mut data = Vec::with_capacity(HEADER_SIZE + payload.len() + CRC_SIZE);
        data.extend_from_slice(&WAL_MAGIC);
        data.extend_from_slice(&WAL_VERSION.to_le_bytes());
        data.push(self.record_type().as_byte());
        data.extend_from_slice(&len.to_le_bytes());
        data.extend_from_slice(&payload);

        let crc = crc32fast::hash(&data);
        data.extend_from_slice(&crc.to_le_bytes());
        Ok(data)
    }
}

fn put_bytes(buf: &mut Vec<u8>, bytes: &[u8]) -> KvResult<()> {
    let len = u32::try_from(bytes.len())
        .map_err(|_| KvError::invalid_argument("field longer than u32::MAX bytes"))?;
    buf.extend_from_slice(&len.to_le_bytes());
    buf.extend_from_slice(bytes);
    Ok(())
}

struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn take(&mut self, len: usize) -> KvResult<&'a [u8]> {
        if self.remaining() < len {
            return Err(KvError::wal_corruption("unexpected end of payload"));
        }
        let slice = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    fn u32(&mut self) -> KvResult<u32> {
        let mut raw = [0u8; 4];
        raw.copy_from_slice(self.take(4)?);
        Ok(u32::from_le_bytes(raw))
    }

    fn u64(&mut self) -> KvResult<u64> {
        let mut raw = [0u8; 8];
        raw.copy_from_slice(self.take(8)?);
        Ok(u64::from_le_bytes(raw))
    }

    fn bytes(&mut self) -> KvResult<Vec<u8>> {
        let len = self.u32()? as usize;
        Ok(self.take(len)?.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_bytes_are_stable() {
        assert_eq!(WalRecordType::Begin.as_byte(), 1);
        assert_eq!(WalRecordType::Commit.as_byte(), 4);
        assert_eq!(WalRecordType::from_byte(3), Some(WalRecordType::Delete));
        assert_eq!(WalRecordType::from_byte(0), None);
        assert_eq!(WalRecordType::from_byte(5), None);
    }

    #[test]
    fn put_payload_layout() {
        let record = WalRecord::Put {
            txid: TransactionId::new(2),
            key: b"1".to_vec(),
            value: b"ab".to_vec(),
        };
        let payload = record.encode_payload().unwrap();
        assert_eq!(
            payload,
            [
                2, 0, 0, 0, 0, 0, 0, 0, // txid
                1, 0, 0, 0, b'1', // key
                2, 0, 0, 0, b'a', b'b', // value
            ]
        );
        assert_eq!(
            WalRecord::decode_payload(WalRecordType::Put, &payload).unwrap(),
            record
        );
    }

    #[test]
    fn envelope_layout() {
        let record = WalRecord::Commit {
            txid: TransactionId::new(9),
            sequence: SequenceNumber::new(3),
        };
        let data = record.encode().unwrap();

        assert_eq!(data.len(), HEADER_SIZE + 16 + CRC_SIZE);
        assert_eq!(&data[0..4], b"TKVL");
        assert_eq!(u16::from_le_bytes([data[4], data[5]]), WAL_VERSION);
        assert_eq!(data[6], WalRecordType::Commit.as_byte());
        assert_eq!(u32::from_le_bytes([data[7], data[8], data[9], data[10]]), 16);

        let body_end = data.len() - CRC_SIZE;
        let stored = u32::from_le_bytes([
            data[body_end],
            data[body_end + 1],
            data[body_end + 2],
            data[body_end + 3],
        ]);
        assert_eq!(stored, crc32fast::hash(&data[..body_end]));
    }

    #[test]
    fn trailing_bytes_are_corruption() {
        let mut payload = WalRecord::Begin {
            txid: TransactionId::new(1),
        }
        .encode_payload()
        .unwrap();
        payload.push(0);

        let err = WalRecord::decode_payload(WalRecordType::Begin, &payload).unwrap_err();
        assert!(matches!(err, KvError::WalCorruption { .. }));
    }

    #[test]
    fn short_payload_is_corruption() {
        let payload = WalRecord::Delete {
            txid: TransactionId::new(1),
            key: b"todo-1".to_vec(),
        }
        .encode_payload()
        .unwrap();

        let err =
            WalRecord::decode_payload(WalRecordType::Delete, &payload[..payload.len() - 2])
                .unwrap_err();
        assert!(matches!(err, KvError::WalCorruption { .. }));
    }

    #[test]
    fn crc_matches_known_vector() {
        assert_eq!(crc32fast::hash(b"123456789"), 0xCBF4_3926);
    }
}
