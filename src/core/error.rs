//! Error types for loading inputs and writing outputs
//!
//! Verification failures are not part of this enum: they are recovered per key
//! inside the validation pipeline (see [`crate::core::verify::VerificationError`]).

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// A declared input source does not exist. Aborts the run.
    #[error("{} not found", .0.display())]
    NotFound(PathBuf),

    /// Input exists but could not be parsed as a table
    #[error("failed to read {}: {message}", .path.display())]
    Read { path: PathBuf, message: String },

    /// Output could not be written
    #[error("failed to write {}: {message}", .path.display())]
    Write { path: PathBuf, message: String },

    /// Extension is not one of the supported tabular formats
    #[error("unsupported file type: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    pub(crate) fn read(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        Self::Read { path: path.into(), message: err.to_string() }
    }

    pub(crate) fn write(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        Self::Write { path: path.into(), message: err.to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message_names_path() {
        let err = Error::NotFound(PathBuf::from("tabs/missing.xlsx"));
        assert_eq!(err.to_string(), "tabs/missing.xlsx not found");
    }

    #[test]
    fn test_read_error_carries_message() {
        let err = Error::read("a.csv", "bad quote");
        assert_eq!(err.to_string(), "failed to read a.csv: bad quote");
    }
}
