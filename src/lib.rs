//! Email Validator Library
//!
//! Merges email lists from several spreadsheets into one deduplicated map,
//! validates every address once, and writes status-annotated copies.

pub mod core;
pub mod scanner;
pub mod reporting;

pub use crate::core::error::{Error, Result};
pub use crate::core::merge;
pub use crate::core::validator;
pub use scanner::file_scanner;
pub use reporting::report_writer;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::core::error::{Error, Result};
    pub use crate::core::merge::{load_record_sets, merge, merge_files, MergedEntry, MergedMap};
    pub use crate::core::pacing::{NoPause, Pacer, RandomPause};
    pub use crate::core::status::{Outcome, ProvenanceNote, Status};
    pub use crate::core::validator::{ProgressSink, ValidationPipeline, ValidationSummary};
    pub use crate::core::verify::{CommandVerifier, SyntaxVerifier, VerificationError, Verifier};
    pub use crate::scanner::file_scanner::{collect_spreadsheet_files, exclude_output};
    pub use crate::scanner::record_reader::{read_record_set, RecordSet};
    pub use crate::reporting::report_writer::{
        annotated_path, write_annotated_copy, write_report, write_summary,
    };
}
