//! Trade log export (CSV and JSON)

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use thiserror::Error;

use crate::domain::TradeEvent;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to write export file: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// CSV column names, in `TradeEvent` field order
pub const CSV_HEADER: [&str; 8] = [
    "date",
    "action",
    "price",
    "indicator_value",
    "z_score",
    "trade_profit",
    "cumulative_profit",
    "forced",
];

/// Write one CSV row per trade event. The header row is always written,
/// even for an empty trade log.
pub fn write_csv<P: AsRef<Path>>(path: P, events: &[TradeEvent]) -> Result<(), ExportError> {
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_path(path)?;
    writer.write_record(CSV_HEADER)?;
    for event in events {
        writer.serialize(event)?;
    }
    writer.flush()?;
    Ok(())
}

/// Pretty-print any serializable report as JSON
pub fn write_json<P: AsRef<Path>, T: Serialize>(path: P, report: &T) -> Result<(), ExportError> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, report)?;
    writer.flush()?;
    Ok(())
}
