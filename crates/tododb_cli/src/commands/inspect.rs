//! Inspect command implementation.

use super::{open_existing, Format};
use serde::Serialize;
use std::path::Path;

/// Database inspection result.
#[derive(Debug, Serialize)]
pub struct InspectReport {
    /// Database path.
    pub path: String,
    /// Live keys.
    pub key_count: usize,
    /// Sequence number of the last commit.
    pub committed_seq: u64,
    /// Log size in bytes.
    pub wal_size: u64,
}

/// Runs the inspect command.
pub fn run(path: &Path, format: Format) -> Result<(), Box<dyn std::error::Error>> {
    let report = inspect(path)?;

    match format {
        Format::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        Format::Text => print_text_output(&report),
    }
    Ok(())
}

/// Opens the database at `path` and collects its statistics.
pub fn inspect(path: &Path) -> Result<InspectReport, Box<dyn std::error::Error>> {
    let db = open_existing(path)?;
    let stats = db.stats()?;
    db.close()?;

    Ok(InspectReport {
        path: path.display().to_string(),
        key_count: stats.key_count,
        committed_seq: stats.committed_seq.as_u64(),
        wal_size: stats.wal_size,
    })
}

fn print_text_output(report: &InspectReport) {
    println!("TodoDB Database Inspection");
    println!("==========================");
    println!();
    println!("Path:           {}", report.path);
    println!("Keys:           {}", report.key_count);
    println!("Last commit:    {}", report.committed_seq);
    println!("Log size:       {}", format_size(report.wal_size));
}

fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} bytes")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
