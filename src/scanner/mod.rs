//! Input discovery and reading

pub mod file_scanner;
pub mod record_reader;

pub use file_scanner::{collect_spreadsheet_files, exclude_output, is_input_file};
pub use record_reader::{read_record_set, RecordSet, TableFormat};
