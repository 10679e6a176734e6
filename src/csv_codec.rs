// 📄 CSV Codec - positional date,name,details,cost,type rows
// Export writes every field quoted and no header; import maps rows by
// position and reports short rows instead of aborting

use crate::bill::Bill;
use anyhow::{Context, Result};
use csv::{QuoteStyle, ReaderBuilder, Terminator, WriterBuilder};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// First-field value that marks a row as a header under `HeaderMode::NameSentinel`
pub const HEADER_SENTINEL: &str = "NAME";

// ============================================================================
// HEADER HANDLING
// ============================================================================

/// How import decides which rows are headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaderMode {
    /// Skip any row whose first field is exactly "NAME"
    #[default]
    NameSentinel,
    /// Skip the first row, whatever it holds
    FirstRow,
    /// Every row is data
    None,
}

impl HeaderMode {
    fn is_header(&self, row_index: usize, first_field: &str) -> bool {
        match self {
            HeaderMode::NameSentinel => first_field == HEADER_SENTINEL,
            HeaderMode::FirstRow => row_index == 0,
            HeaderMode::None => false,
        }
    }
}

// ============================================================================
// IMPORT RESULT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RowError {
    #[error("line {line}: expected 5 fields, found {found}")]
    TooFewFields { line: u64, found: usize },

    #[error("line {line}: {message}")]
    Unreadable { line: u64, message: String },
}

impl RowError {
    pub fn line(&self) -> u64 {
        match self {
            RowError::TooFewFields { line, .. } | RowError::Unreadable { line, .. } => *line,
        }
    }
}

/// Bills read from a file, in file order, plus the rows that were rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub bills: Vec<Bill>,
    pub rejected: Vec<RowError>,
    pub skipped_headers: usize,
}

impl ImportReport {
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }
}

// ============================================================================
// EXPORT
// ============================================================================

/// Write one fully quoted row per bill, in order, without a header.
pub fn write_bills<W: Write>(writer: W, bills: &[Bill]) -> Result<()> {
    let mut csv_writer = WriterBuilder::new()
        .has_headers(false)
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(writer);

    for bill in bills {
        csv_writer.write_record(bill.to_fields())?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Export to `path`, appending ".csv" when the name lacks it.
/// Returns the path actually written.
pub fn export_to_csv(bills: &[Bill], path: &Path) -> Result<PathBuf> {
    let path = ensure_csv_extension(path);

    let file = File::create(&path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    write_bills(BufWriter::new(file), bills)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    info!(path = %path.display(), count = bills.len(), "exported bills");
    Ok(path)
}

/// "report" -> "report.csv"; "report.CSV" stays as is.
pub fn ensure_csv_extension(path: &Path) -> PathBuf {
    let has_csv = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("csv"))
        .unwrap_or(false);

    if has_csv {
        path.to_path_buf()
    } else {
        let mut name = path.as_os_str().to_os_string();
        name.push(".csv");
        PathBuf::from(name)
    }
}

// ============================================================================
// IMPORT
// ============================================================================

/// Parse rows into bills. Short or unreadable rows are collected in
/// `rejected`; the remaining rows still import.
pub fn read_bills<R: Read>(reader: R, mode: HeaderMode) -> ImportReport {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut report = ImportReport::default();

    for (row_index, result) in csv_reader.records().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                let line = e.position().map(|p| p.line()).unwrap_or(0);
                warn!(line, "unreadable CSV row: {}", e);
                report.rejected.push(RowError::Unreadable {
                    line,
                    message: e.to_string(),
                });
                continue;
            }
        };

        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let first = record.get(0).unwrap_or("");
        if mode.is_header(row_index, first) {
            report.skipped_headers += 1;
            continue;
        }

        let fields: Vec<&str> = record.iter().collect();
        match Bill::from_fields(&fields) {
            Some(bill) => report.bills.push(bill),
            None => {
                warn!(line, found = fields.len(), "rejected short CSV row");
                report.rejected.push(RowError::TooFewFields {
                    line,
                    found: fields.len(),
                });
            }
        }
    }

    report
}

/// Open and parse a CSV file. Fails only when the file cannot be opened.
pub fn import_from_csv(path: &Path, mode: HeaderMode) -> Result<ImportReport> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    let report = read_bills(BufReader::new(file), mode);

    info!(
        path = %path.display(),
        imported = report.bills.len(),
        rejected = report.rejected.len(),
        "imported bills"
    );
    Ok(report)
}

// ============================================================================
// TESTS
// ============================================================================
