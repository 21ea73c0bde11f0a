//! Verify command implementation.

use super::read_raw_log;
use std::collections::HashSet;
use std::path::Path;
use tododb_kv::wal::{WalReader, WalRecord};
use tododb_kv::{SequenceNumber, TransactionId};

/// Verification result.
#[derive(Debug, Default)]
pub struct VerifyReport {
    /// Bytes in the log.
    pub log_size: u64,
    /// Records that decoded cleanly.
    pub valid_records: usize,
    /// Transactions with a `Commit` record.
    pub committed: usize,
    /// Transactions begun but never committed. Recovery drops these.
    pub incomplete: usize,
    /// Offset of a torn trailing record, if any. Recovery drops it.
    pub torn_tail: Option<u64>,
    /// Corruption found. Empty when the log is sound.
    pub errors: Vec<String>,
}

impl VerifyReport {
    fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Runs the verify command.
pub fn run(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    println!("Verifying database at {}", path.display());
    println!();

    let data = read_raw_log(path)?;
    let report = verify_log(&data);
    print_report(&report);

    println!();
    if report.is_ok() {
        println!("Database verification passed");
        Ok(())
    } else {
        println!("Database verification failed");
        Err("Verification failed".into())
    }
}

/// Checks every record envelope and the transaction structure of `data`.
///
/// Applies the same rules the engine applies on open, but collects the
/// findings instead of stopping at the first one where it can keep going.
pub fn verify_log(data: &[u8]) -> VerifyReport {
    let mut report = VerifyReport {
        log_size: data.len() as u64,
        ..VerifyReport::default()
    };
    let mut reader = WalReader::new(data);
    let mut open: HashSet<TransactionId> = HashSet::new();
    let mut last_seq = SequenceNumber::default();

    loop {
        let (offset, record) = match reader.next_record() {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(e) => {
                report
                    .errors
                    .push(format!("at offset {}: {e}", reader.position()));
                break;
            }
        };
        report.valid_records += 1;

        match record {
            WalRecord::Begin { txid } => {
                if !open.insert(txid) {
                    report.errors.push(format!(
                        "transaction {txid} begins twice, again at offset {offset}"
                    ));
                }
            }
            WalRecord::Put { txid, .. } | WalRecord::Delete { txid, .. } => {
                if !open.contains(&txid) {
                    report.errors.push(format!(
                        "write for unknown transaction {txid} at offset {offset}"
                    ));
                }
            }
            WalRecord::Commit { txid, sequence } => {
                if !open.remove(&txid) {
                    report.errors.push(format!(
                        "commit for unknown transaction {txid} at offset {offset}"
                    ));
                }
                if sequence <= last_seq {
                    report.errors.push(format!(
                        "commit {sequence} at offset {offset} does not follow {last_seq}"
                    ));
                }
                last_seq = last_seq.max(sequence);
                report.committed += 1;
            }
        }
    }

    report.incomplete = open.len();
    report.torn_tail = reader.torn_tail();
    report
}

fn print_report(report: &VerifyReport) {
    println!("  Log size:               {} bytes", report.log_size);
    println!("  Valid records:          {}", report.valid_records);
    println!("  Committed transactions: {}", report.committed);
    if report.incomplete > 0 {
        println!(
            "  Incomplete transactions: {} (discarded on next open)",
            report.incomplete
        );
    }
    if let Some(offset) = report.torn_tail {
        println!("  Torn record at offset {offset} (discarded on next open)");
    }
    for error in &report.errors {
        println!("    ERROR: {error}");
    }
}
