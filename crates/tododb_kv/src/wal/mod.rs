//! Write-ahead log.
//!
//! The log is the only durable state. A committed write transaction is
//! appended as one contiguous batch:
//!
//! ```text
//! Begin{txid} (Put{txid,key,value} | Delete{txid,key})* Commit{txid,seq}
//! ```
//!
//! Aborted transactions never reach the log.
//!
//! ## Record envelope
//!
//! ```text
//! | magic "TKVL" (4) | version u16 (2) | type (1) | length u32 (4) | payload (N) | crc32 (4) |
//! ```
//!
//! Integers are little-endian. The CRC (IEEE) covers every byte before it.
//!
//! ## Reading policy
//!
//! An incomplete record at the end of the log (short header or short
//! payload) is a torn tail and ends the log cleanly. A bad magic, an
//! unknown type, an unsupported version or a CRC mismatch is corruption and
//! is always reported as an error.

mod reader;
mod record;
mod writer;

pub use reader::{read_log, WalReader};
pub use record::{WalRecord, WalRecordType, CRC_SIZE, HEADER_SIZE, WAL_MAGIC, WAL_VERSION};
pub(crate) use writer::WalWriter;
