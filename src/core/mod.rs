//! Merge engine, status model and validation pipeline

pub mod error;
pub mod merge;
pub mod pacing;
pub mod status;
pub mod validator;
pub mod verify;

pub use error::{Error, Result};
pub use merge::{merge, MergedEntry, MergedMap};
pub use status::{Outcome, Status};
