//! Per-market CSV spreadsheet writer.
//!
//! One file per market symbol. Rows are written in upstream order; the
//! column order is fixed and matches the upstream field order.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::domain::ChartRow;

/// Spreadsheet column headers, in output order.
pub const SHEET_COLUMNS: [&str; 8] = [
    "date",
    "open",
    "high",
    "low",
    "close",
    "volume (BTC)",
    "volume (USD)",
    "price",
];

/// Export errors.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Render chart rows to CSV text, header first, rows in the order given.
pub fn render_sheet(rows: &[ChartRow]) -> String {
    let mut csv = String::from(
        "date,open,high,low,close,volume (BTC),volume (USD),price\n",
    );

    for row in rows {
        csv.push_str(&format!(
            "{},{},{},{},{},{},{},{}\n",
            row.timestamp,
            row.open,
            row.high,
            row.low,
            row.close,
            row.volume_base,
            row.volume_quote,
            row.price
        ));
    }

    csv
}

/// Write one market's history to `<dir>/<market>.csv`, creating the
/// directory if needed. Returns the written path.
pub fn write_sheet(dir: &Path, market: &str, rows: &[ChartRow]) -> Result<PathBuf, ExportError> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(format!("{market}.csv"));
    std::fs::write(&path, render_sheet(rows))?;
    tracing::info!(market, rows = rows.len(), path = %path.display(), "wrote spreadsheet");
    Ok(path)
}
