//! Validation pipeline
//!
//! Walks the merged map in insertion order, checks every key once and folds
//! the outcome into its status. A failing or panicking verifier only marks
//! that key; the pass always moves on to the next one.

use indicatif::ProgressBar;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::merge::MergedMap;
use super::pacing::{NoPause, Pacer};
use super::status::Outcome;
use super::verify::Verifier;

/// Receives `checked/total` after every key
pub trait ProgressSink {
    fn report(&mut self, checked: usize, total: usize);
}

impl ProgressSink for ProgressBar {
    fn report(&mut self, checked: usize, total: usize) {
        self.set_length(total as u64);
        self.set_position(checked as u64);
    }
}

/// Discards progress
impl ProgressSink for () {
    fn report(&mut self, _checked: usize, _total: usize) {}
}

/// Counts for one validation pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidationSummary {
    pub total: usize,
    pub checked: usize,
    pub valid: usize,
    pub invalid: usize,
    pub failed: usize,
    /// Pass stopped early on a shutdown request
    pub cancelled: bool,
}

impl ValidationSummary {
    fn record(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Valid => self.valid += 1,
            Outcome::Invalid => self.invalid += 1,
            Outcome::Failed(_) => self.failed += 1,
            Outcome::NotValidated => {}
        }
    }
}

pub struct ValidationPipeline<'a> {
    verifier: &'a dyn Verifier,
    pacer: Box<dyn Pacer + 'a>,
    progress: Box<dyn ProgressSink + 'a>,
    shutdown: Option<Arc<AtomicBool>>,
}

impl<'a> ValidationPipeline<'a> {
    /// Pipeline with no pacing, no progress output and no shutdown flag
    pub fn new(verifier: &'a dyn Verifier) -> Self {
        Self {
            verifier,
            pacer: Box::new(NoPause),
            progress: Box::new(()),
            shutdown: None,
        }
    }

    pub fn with_pacer(mut self, pacer: impl Pacer + 'a) -> Self {
        self.pacer = Box::new(pacer);
        self
    }

    pub fn with_progress(mut self, progress: impl ProgressSink + 'a) -> Self {
        self.progress = Box::new(progress);
        self
    }

    /// Stop before the next key once `flag` is set
    pub fn with_shutdown(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown = Some(flag);
        self
    }

    fn shutdown_requested(&self) -> bool {
        self.shutdown
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::SeqCst))
    }

    /// Check one key, turning errors and panics into `Outcome::Failed`
    fn check(&self, key: &str) -> Outcome {
        let result = panic::catch_unwind(AssertUnwindSafe(|| self.verifier.verify(key)));

        match result {
            Ok(Ok(is_valid)) => Outcome::from_check(is_valid),
            Ok(Err(e)) => {
                warn!(key, error = %e, "verification failed");
                Outcome::Failed(e.to_string())
            }
            Err(panic) => {
                let message = panic
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                warn!(key, %message, "verifier panicked");
                Outcome::Failed(format!("verifier panicked: {message}"))
            }
        }
    }

    /// Validate every entry of `map` in insertion order
    pub fn run(&mut self, map: &mut MergedMap) -> ValidationSummary {
        let total = map.len();
        let mut summary = ValidationSummary { total, ..Default::default() };
        info!(total, "validating keys");

        for entry in map.entries_mut() {
            if self.shutdown_requested() {
                summary.cancelled = true;
                warn!(checked = summary.checked, total, "validation interrupted");
                break;
            }

            let outcome = self.check(entry.key());
            debug!(key = entry.key(), %outcome, "checked");
            summary.record(&outcome);
            entry.status_mut().set_outcome(outcome);

            summary.checked += 1;
            self.progress.report(summary.checked, total);
            self.pacer.pace(summary.checked);
        }

        info!(
            checked = summary.checked,
            valid = summary.valid,
            invalid = summary.invalid,
            failed = summary.failed,
            "validation finished"
        );
        summary
    }
}
