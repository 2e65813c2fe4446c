//! Structured per-key status
//!
//! A status is an outcome plus the ordered provenance notes collected during
//! merge. It is only turned into text at the output boundary, so nothing has
//! to compare rendered strings to learn whether a key was checked.

use std::fmt;

/// Result of checking a single key
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Outcome {
    #[default]
    NotValidated,
    Valid,
    Invalid,
    /// Verification failed; holds the failure message verbatim
    Failed(String),
}

impl Outcome {
    pub fn from_check(is_valid: bool) -> Self {
        if is_valid {
            Self::Valid
        } else {
            Self::Invalid
        }
    }

    pub fn is_validated(&self) -> bool {
        !matches!(self, Self::NotValidated)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotValidated => f.write_str("Not validated"),
            Self::Valid => f.write_str("Valid"),
            Self::Invalid => f.write_str("Invalid"),
            Self::Failed(message) => write!(f, "Error: {message}"),
        }
    }
}

/// Records that a key seen again in a later file was first seen in `origin_index`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProvenanceNote {
    /// 0-based index of the file the key was first seen in
    pub origin_index: usize,
}

impl fmt::Display for ProvenanceNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // File numbers are 1-based in human-readable output
        write!(f, "Was in file {}", self.origin_index + 1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Status {
    outcome: Outcome,
    notes: Vec<ProvenanceNote>,
}

impl Status {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn outcome(&self) -> &Outcome {
        &self.outcome
    }

    pub fn notes(&self) -> &[ProvenanceNote] {
        &self.notes
    }

    pub fn set_outcome(&mut self, outcome: Outcome) {
        self.outcome = outcome;
    }

    pub fn push_note(&mut self, note: ProvenanceNote) {
        self.notes.push(note);
    }
}

impl fmt::Display for Status {
    /// `{outcome}` followed by `, {note}` for each provenance note
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.outcome)?;
        for note in &self.notes {
            write!(f, ", {note}")?;
        }
        Ok(())
    }
}
