//! Reading one tabular file into a [`RecordSet`]
//!
//! Spreadsheets (xlsx, xlsm, xls, xlsb, ods) go through calamine, csv files
//! through the csv crate. Only the first sheet is read. The first row is the
//! header row and every cell is coerced to text.

use calamine::{open_workbook_auto, Data, Reader};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::core::error::{Error, Result};

/// Extensions handled by calamine
pub const SPREADSHEET_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xls", "xlsb", "ods"];

/// Storage format of a tabular file, decided by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Csv,
    Spreadsheet,
}

impl TableFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_string_lossy().to_lowercase();
        if ext == "csv" {
            Some(Self::Csv)
        } else if SPREADSHEET_EXTENSIONS.contains(&ext.as_str()) {
            Some(Self::Spreadsheet)
        } else {
            None
        }
    }
}

/// Rows of one input file. The first column is the key column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordSet {
    pub source: PathBuf,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RecordSet {
    pub fn new(source: impl Into<PathBuf>, headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { source: source.into(), headers, rows }
    }

    /// Key cell of a row (first column), `None` when the row is empty
    pub fn key_of(row: &[String]) -> Option<&str> {
        row.first().map(String::as_str).filter(|key| !key.is_empty())
    }

    /// Keys in row order, skipping rows without one
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().filter_map(|row| Self::key_of(row))
    }
}

/// Read a tabular file
///
/// # Returns
/// `Error::NotFound` if the file does not exist, `Error::UnsupportedFormat`
/// for unknown extensions, `Error::Read` if parsing fails
pub fn read_record_set(path: &Path) -> Result<RecordSet> {
    if !path.exists() {
        return Err(Error::NotFound(path.to_path_buf()));
    }

    let table = match TableFormat::from_path(path) {
        Some(TableFormat::Csv) => read_csv(path)?,
        Some(TableFormat::Spreadsheet) => read_spreadsheet(path)?,
        None => return Err(Error::UnsupportedFormat(path.to_path_buf())),
    };

    let mut rows = table.into_iter().filter(|row| row.iter().any(|cell| !cell.is_empty()));
    let headers = rows.next().unwrap_or_default();
    let rows: Vec<Vec<String>> = rows.collect();

    debug!(path = %path.display(), rows = rows.len(), "read record set");
    Ok(RecordSet::new(path, headers, rows))
}

fn read_csv(path: &Path) -> Result<Vec<Vec<String>>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|e| Error::read(path, e))?;

    let mut table = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| Error::read(path, e))?;
        table.push(record.iter().map(str::to_string).collect());
    }
    Ok(table)
}

fn read_spreadsheet(path: &Path) -> Result<Vec<Vec<String>>> {
    let mut workbook = open_workbook_auto(path).map_err(|e| Error::read(path, e))?;

    let range = match workbook.worksheet_range_at(0) {
        Some(range) => range.map_err(|e| Error::read(path, e))?,
        None => return Err(Error::read(path, "workbook contains no sheets")),
    };

    Ok(range
        .rows()
        .map(|row| row.iter().map(cell_to_string).collect())
        .collect())
}

/// Text form of a cell, the same text the key comparison uses
pub fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        // f64 Display drops a zero fraction: 42.0 -> "42"
        Data::Float(n) => n.to_string(),
        Data::Int(n) => n.to_string(),
        Data::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}
