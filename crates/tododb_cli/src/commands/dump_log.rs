//! Dump-log command implementation.

use super::{read_raw_log, Format};
use serde::Serialize;
use std::path::Path;
use tododb_kv::wal::{WalReader, WalRecord};
use tododb_kv::KvError;

/// Log record representation for output.
#[derive(Debug, Serialize)]
pub struct RecordInfo {
    /// Offset in the log file.
    pub offset: u64,
    /// Record type.
    pub record_type: &'static str,
    /// Transaction ID.
    pub txid: u64,
    /// Key, lossily decoded as UTF-8 (puts and deletes).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Value size in bytes (puts).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_size: Option<usize>,
    /// Commit sequence number (commits).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sequence: Option<u64>,
}

impl RecordInfo {
    fn new(offset: u64, record: &WalRecord) -> Self {
        let mut info = Self {
            offset,
            record_type: record.record_type().name(),
            txid: record.txid().as_u64(),
            key: None,
            value_size: None,
            sequence: None,
        };
        match record {
            WalRecord::Begin { .. } => {}
            WalRecord::Put { key, value, .. } => {
                info.key = Some(String::from_utf8_lossy(key).into_owned());
                info.value_size = Some(value.len());
            }
            WalRecord::Delete { key, .. } => {
                info.key = Some(String::from_utf8_lossy(key).into_owned());
            }
            WalRecord::Commit { sequence, .. } => {
                info.sequence = Some(sequence.as_u64());
            }
        }
        info
    }
}

/// Runs the dump-log command.
///
/// Records before a corrupt one are still printed; the corruption is then
/// returned as the command's error.
pub fn run(
    path: &Path,
    limit: Option<usize>,
    format: Format,
) -> Result<(), Box<dyn std::error::Error>> {
    let data = read_raw_log(path)?;
    let (records, failure) = collect_records(&data, limit);

    match format {
        Format::Json => println!("{}", serde_json::to_string_pretty(&records)?),
        Format::Text => print_text_output(&records),
    }

    match failure {
        Some(err) => Err(err.into()),
        None => Ok(()),
    }
}

/// Decodes up to `limit` records, stopping early at the first error.
pub fn collect_records(data: &[u8], limit: Option<usize>) -> (Vec<RecordInfo>, Option<KvError>) {
    let max_records = limit.unwrap_or(usize::MAX);
    let mut records = Vec::new();

    for entry in WalReader::new(data) {
        if records.len() >= max_records {
            break;
        }
        match entry {
            Ok((offset, record)) => records.push(RecordInfo::new(offset, &record)),
            Err(err) => return (records, Some(err)),
        }
    }
    (records, None)
}

fn print_text_output(records: &[RecordInfo]) {
    println!("{:>10}  {:<7} {:>8}  DETAILS", "OFFSET", "TYPE", "TXID");
    for record in records {
        let details = match (&record.key, record.value_size, record.sequence) {
            (Some(key), Some(size), _) => format!("key={key:?} value={size}B"),
            (Some(key), None, _) => format!("key={key:?}"),
            (None, _, Some(seq)) => format!("seq={seq}"),
            _ => String::new(),
        };
        println!(
            "{:>10}  {:<7} {:>8}  {}",
            record.offset, record.record_type, record.txid, details
        );
    }
    println!();
    println!("{} record(s)", records.len());
}
