//! Spreadsheet file discovery

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::record_reader::TableFormat;
use crate::reporting::report_writer::SUMMARY_FILE_NAME;

/// Suffix appended to the stem of annotated copies
pub const UPDATED_SUFFIX: &str = "_updated";

/// Whether a file should be read as an input record set
///
/// Skips unsupported extensions, Excel lock files (`~$name.xlsx`), annotated
/// copies and the default summary table written by an earlier run.
pub fn is_input_file(path: &Path) -> bool {
    if TableFormat::from_path(path).is_none() {
        return false;
    }
    let stem = match path.file_stem() {
        Some(stem) => stem.to_string_lossy(),
        None => return false,
    };
    let summary_stem = Path::new(SUMMARY_FILE_NAME)
        .file_stem()
        .map(|s| s.to_string_lossy());
    !stem.starts_with("~$")
        && !stem.ends_with(UPDATED_SUFFIX)
        && summary_stem.as_deref() != Some(&*stem)
}

/// Drop `output` from discovered inputs, so a summary written with a custom
/// name inside the scanned directory is not read back on the next run
pub fn exclude_output(files: Vec<PathBuf>, output: &Path) -> Vec<PathBuf> {
    let output = fs::canonicalize(output).unwrap_or_else(|_| output.to_path_buf());
    files
        .into_iter()
        .filter(|path| fs::canonicalize(path).unwrap_or_else(|_| path.clone()) != output)
        .collect()
}

/// Collect all spreadsheet files from a directory
///
/// # Arguments
/// * `dir` - Directory to scan
/// * `recursive` - Whether to scan subdirectories recursively
///
/// # Returns
/// Input file paths sorted by path; this order is the merge precedence
pub fn collect_spreadsheet_files(dir: &Path, recursive: bool) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    if recursive {
        for entry in WalkDir::new(dir).follow_links(false) {
            let entry = entry?;
            if entry.file_type().is_file() && is_input_file(entry.path()) {
                files.push(entry.path().to_path_buf());
            }
        }
    } else {
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            if entry.file_type()?.is_file() && is_input_file(&entry.path()) {
                files.push(entry.path());
            }
        }
    }

    files.sort();
    Ok(files)
}
