//! Report generation functionality

pub mod report_writer;

pub use report_writer::{annotated_path, write_annotated_copy, write_report, write_summary};
