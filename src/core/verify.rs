//! Verification capability: decides whether one key is a usable address

use regex::Regex;
use std::process::Command;
use thiserror::Error;
use tracing::trace;

lazy_static::lazy_static! {
    // Local part of dot-atoms, domain of dot-separated labels with a 2+ letter TLD
    static ref EMAIL_PATTERN: Regex = Regex::new(
        r"^[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+(\.[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+)*@([A-Za-z0-9]([A-Za-z0-9-]{0,61}[A-Za-z0-9])?\.)+[A-Za-z]{2,63}$"
    ).unwrap();
}

/// A failed check. The message ends up verbatim in the key's status.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct VerificationError {
    message: String,
}

impl VerificationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<std::io::Error> for VerificationError {
    fn from(err: std::io::Error) -> Self {
        Self::new(err.to_string())
    }
}

pub trait Verifier {
    /// `Ok(true)` valid, `Ok(false)` invalid, `Err` if the check itself failed
    fn verify(&self, key: &str) -> Result<bool, VerificationError>;
}

impl<F> Verifier for F
where
    F: Fn(&str) -> Result<bool, VerificationError>,
{
    fn verify(&self, key: &str) -> Result<bool, VerificationError> {
        self(key)
    }
}

/// Offline syntax check
#[derive(Debug, Clone, Copy, Default)]
pub struct SyntaxVerifier;

impl Verifier for SyntaxVerifier {
    fn verify(&self, key: &str) -> Result<bool, VerificationError> {
        Ok(key.len() <= 254 && EMAIL_PATTERN.is_match(key))
    }
}

/// Delegates to an external program, called as `<program> <args...> <key>`
///
/// Exit code 0 means valid, 1 means invalid. Any other exit, a signal, or a
/// failure to start the program is a verification error. Keys starting with
/// `-` are never passed on, since the program would read them as options.
#[derive(Debug, Clone)]
pub struct CommandVerifier {
    program: String,
    args: Vec<String>,
}

impl CommandVerifier {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self { program: program.into(), args }
    }

    /// Split a command line on whitespace: first word is the program
    pub fn from_command_line(command: &str) -> Option<Self> {
        let mut words = command.split_whitespace().map(str::to_string);
        let program = words.next()?;
        Some(Self::new(program, words.collect()))
    }
}

impl Verifier for CommandVerifier {
    fn verify(&self, key: &str) -> Result<bool, VerificationError> {
        if key.starts_with('-') {
            return Err(VerificationError::new("key starts with '-', not passed to verifier command"));
        }
        let output = Command::new(&self.program).args(&self.args).arg(key).output()?;
        trace!(key, status = ?output.status, "verifier command finished");

        match output.status.code() {
            Some(0) => Ok(true),
            Some(1) => Ok(false),
            code => {
                let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
                if !stderr.is_empty() {
                    Err(VerificationError::new(stderr))
                } else {
                    match code {
                        Some(code) => Err(VerificationError::new(format!(
                            "verifier exited with status {code}"
                        ))),
                        None => Err(VerificationError::new("verifier terminated by signal")),
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_accepts_common_addresses() {
        let v = SyntaxVerifier;
        for addr in ["alice@x.com", "first.last+tag@sub.example.org", "o'brien@mail.ie"] {
            assert!(v.verify(addr).unwrap(), "{addr} should be valid");
        }
    }

    #[test]
    fn test_syntax_rejects_malformed_addresses() {
        let v = SyntaxVerifier;
        for addr in ["", "plainaddress", "@x.com", "a@", "a@b", "a..b@x.com", "a@-x.com", "a b@x.com"] {
            assert!(!v.verify(addr).unwrap(), "{addr:?} should be invalid");
        }
    }

    #[test]
    fn test_closure_verifier() {
        let v = |key: &str| -> Result<bool, VerificationError> {
            if key == "boom" {
                Err(VerificationError::new("timeout"))
            } else {
                Ok(true)
            }
        };
        assert!(v.verify("ok").unwrap());
        assert_eq!(v.verify("boom").unwrap_err().to_string(), "timeout");
    }

    #[test]
    fn test_from_command_line() {
        let v = CommandVerifier::from_command_line("check-mail --strict").unwrap();
        assert_eq!(v.program, "check-mail");
        assert_eq!(v.args, vec!["--strict"]);
        assert!(CommandVerifier::from_command_line("   ").is_none());
    }

    #[test]
    fn test_missing_program_is_an_error() {
        let v = CommandVerifier::new("this-program-does-not-exist-4711", vec![]);
        assert!(v.verify("a@x.com").is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_option_like_key_is_not_passed_on() {
        // Would exit 0 (valid) if the key reached the program
        let v = CommandVerifier::new("sh", vec!["-c".into(), "exit 0".into()]);
        for key in ["--help", "-x"] {
            let err = v.verify(key).unwrap_err();
            assert!(err.message().contains("starts with '-'"), "{key}: {err}");
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_command_exit_codes() {
        let valid = CommandVerifier::new("sh", vec!["-c".into(), "exit 0".into()]);
        let invalid = CommandVerifier::new("sh", vec!["-c".into(), "exit 1".into()]);
        let failing = CommandVerifier::new("sh", vec!["-c".into(), "echo smtp down >&2; exit 3".into()]);

        assert_eq!(valid.verify("a@x.com"), Ok(true));
        assert_eq!(invalid.verify("a@x.com"), Ok(false));
        assert_eq!(failing.verify("a@x.com"), Err(VerificationError::new("smtp down")));
    }
}
