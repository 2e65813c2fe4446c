//! Output writing: annotated copies, the summary table and the text report

use rust_xlsxwriter::{Format, Workbook};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::core::error::{Error, Result};
use crate::core::merge::MergedMap;
use crate::core::status::Outcome;
use crate::core::validator::ValidationSummary;
use crate::scanner::file_scanner::UPDATED_SUFFIX;
use crate::scanner::record_reader::{RecordSet, TableFormat};

/// Default name of the consolidated table
pub const SUMMARY_FILE_NAME: &str = "validated_emails.xlsx";

const STATUS_HEADER: &str = "Status";

/// Path of the annotated copy of `input`: `list.xlsx` -> `list_updated.xlsx`
///
/// csv stays csv; every other input is written as xlsx.
pub fn annotated_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = match TableFormat::from_path(input) {
        Some(TableFormat::Csv) => "csv",
        _ => "xlsx",
    };
    input.with_file_name(format!("{stem}{UPDATED_SUFFIX}.{ext}"))
}

/// Write a header row plus data rows, format chosen by `path`'s extension
fn write_table(path: &Path, headers: &[String], rows: &[Vec<String>]) -> Result<()> {
    match TableFormat::from_path(path) {
        Some(TableFormat::Csv) => write_csv(path, headers, rows),
        Some(TableFormat::Spreadsheet) => write_xlsx(path, headers, rows),
        None => Err(Error::UnsupportedFormat(path.to_path_buf())),
    }
}

fn write_csv(path: &Path, headers: &[String], rows: &[Vec<String>]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|e| Error::write(path, e))?;

    writer.write_record(headers).map_err(|e| Error::write(path, e))?;
    for row in rows {
        writer.write_record(row).map_err(|e| Error::write(path, e))?;
    }
    writer.flush()?;
    Ok(())
}

/// Longest text a single xlsx cell accepts
pub const XLSX_MAX_CELL_CHARS: usize = 32_767;

/// `value` cut to the xlsx cell limit on a char boundary
fn clip_cell(value: &str) -> &str {
    match value.char_indices().nth(XLSX_MAX_CELL_CHARS) {
        Some((end, _)) => &value[..end],
        None => value,
    }
}

/// Number to store for `value`, if it reads back as the same text
///
/// Keeps "007", "1e5" or "NaN" as text so the round trip through a
/// spreadsheet does not change them.
fn numeric_cell(value: &str) -> Option<f64> {
    let n: f64 = value.parse().ok()?;
    (n.is_finite() && n.to_string() == value).then_some(n)
}

fn write_xlsx(path: &Path, headers: &[String], rows: &[Vec<String>]) -> Result<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    let bold = Format::new().set_bold();

    for (col, header) in headers.iter().enumerate() {
        let col16 = u16::try_from(col).map_err(|e| Error::write(path, e))?;
        worksheet
            .write_string_with_format(0, col16, clip_cell(header), &bold)
            .map_err(|e| Error::write(path, e))?;
    }

    for (row_idx, row) in rows.iter().enumerate() {
        // rust_xlsxwriter uses 0-based row/col as u32/u16; row 0 is the header
        let row32 = u32::try_from(row_idx + 1).map_err(|e| Error::write(path, e))?;
        for (col, value) in row.iter().enumerate() {
            if value.is_empty() {
                continue;
            }
            let col16 = u16::try_from(col).map_err(|e| Error::write(path, e))?;
            match numeric_cell(value) {
                Some(n) => worksheet.write_number(row32, col16, n),
                None => worksheet.write_string(row32, col16, clip_cell(value)),
            }
            .map_err(|e| Error::write(path, e))?;
        }
    }

    workbook.save(path).map_err(|e| Error::write(path, e))?;
    Ok(())
}

/// Write `set` with an extra `Status` column looked up from `map`
///
/// Every original row is written, duplicates included. Rows whose key is
/// missing from the map get `Unknown`.
pub fn write_annotated_copy(set: &RecordSet, map: &MergedMap, output_path: &Path) -> Result<()> {
    let width = set.headers.len().max(set.rows.iter().map(Vec::len).max().unwrap_or(0)).max(1);

    let mut headers = set.headers.clone();
    headers.resize(width, String::new());
    headers.push(STATUS_HEADER.to_string());

    let rows: Vec<Vec<String>> = set
        .rows
        .iter()
        .map(|row| {
            let status = map.status_text(row.first().map(String::as_str).unwrap_or(""));
            let mut out = row.clone();
            out.resize(width, String::new());
            out.push(status);
            out
        })
        .collect();

    write_table(output_path, &headers, &rows)?;
    info!(path = %output_path.display(), rows = rows.len(), "annotated copy saved");
    Ok(())
}

#[derive(Serialize)]
struct SummaryRow<'a> {
    email: &'a str,
    status: String,
    /// 1-based, matching the "Was in file N" notes
    origin_file: usize,
}

/// Write the consolidated `Email`/`Status` table in insertion order
///
/// `.xlsx` and `.csv` produce a two-column table, `.json` an array of
/// `{email, status, origin_file}` objects.
pub fn write_summary(map: &MergedMap, output_path: &Path) -> Result<()> {
    let is_json = output_path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        let rows: Vec<SummaryRow> = map
            .iter()
            .map(|entry| SummaryRow {
                email: entry.key(),
                status: entry.status().to_string(),
                origin_file: entry.origin_index() + 1,
            })
            .collect();
        let mut writer = BufWriter::new(File::create(output_path)?);
        serde_json::to_writer_pretty(&mut writer, &rows)
            .map_err(|e| Error::write(output_path, e))?;
        writer.flush()?;
    } else {
        let headers = vec!["Email".to_string(), STATUS_HEADER.to_string()];
        let rows: Vec<Vec<String>> = map
            .iter()
            .map(|entry| vec![entry.key().to_string(), entry.status().to_string()])
            .collect();
        write_table(output_path, &headers, &rows)?;
    }

    info!(path = %output_path.display(), keys = map.len(), "summary saved");
    Ok(())
}

/// Write a plain-text validation report
///
/// # Arguments
/// * `output_path` - Path to output file
/// * `sources` - Input files in merge order
/// * `map` - Validated merged map
/// * `summary` - Counts from the validation pass
pub fn write_report(
    output_path: &Path,
    sources: &[PathBuf],
    map: &MergedMap,
    summary: &ValidationSummary,
) -> Result<()> {
    let mut file = BufWriter::new(File::create(output_path)?);

    // Write header with timestamp
    let now = std::time::SystemTime::now();
    writeln!(file, "Email Validation Report")?;
    writeln!(file, "=======================")?;
    writeln!(file, "Generated: {:?}", now)?;
    if summary.cancelled {
        writeln!(file, "Run was interrupted before all addresses were checked")?;
    }
    writeln!(file)?;

    writeln!(file, "Input Files:")?;
    writeln!(file, "------------")?;
    for (idx, source) in sources.iter().enumerate() {
        writeln!(file, "  {}. {}", idx + 1, source.display())?;
    }
    writeln!(file)?;

    writeln!(file, "Summary Statistics:")?;
    writeln!(file, "-------------------")?;
    writeln!(file, "  Unique addresses: {}", summary.total)?;
    writeln!(file, "  Checked: {}", summary.checked)?;
    writeln!(file, "  Valid: {}", summary.valid)?;
    writeln!(file, "  Invalid: {}", summary.invalid)?;
    writeln!(file, "  Errors: {}", summary.failed)?;
    writeln!(file, "  Not validated: {}", summary.total - summary.checked)?;

    if summary.checked > 0 {
        let valid_pct = (summary.valid as f64 / summary.checked as f64) * 100.0;
        writeln!(file, "  Valid rate: {:.2}%", valid_pct)?;
    }
    writeln!(file)?;

    let failed: Vec<_> = map
        .iter()
        .filter_map(|entry| match entry.status().outcome() {
            Outcome::Failed(message) => Some((entry.key(), message)),
            _ => None,
        })
        .collect();
    if !failed.is_empty() {
        writeln!(file, "Failed Checks:")?;
        writeln!(file, "--------------")?;
        for (key, message) in failed {
            writeln!(file, "  {}: {}", key, message)?;
        }
        writeln!(file)?;
    }

    let repeated: Vec<_> = map
        .iter()
        .filter(|entry| !entry.status().notes().is_empty())
        .collect();
    if !repeated.is_empty() {
        writeln!(file, "Seen In Multiple Files:")?;
        writeln!(file, "-----------------------")?;
        writeln!(file, "  Total: {}", repeated.len())?;
        writeln!(file)?;
        for entry in repeated {
            writeln!(
                file,
                "  {} (first in file {}, seen again {} time(s))",
                entry.key(),
                entry.origin_index() + 1,
                entry.status().notes().len()
            )?;
        }
    }

    file.flush()?;
    Ok(())
}
