//! Consensus-violation error type.

use std::fmt;

use thiserror::Error;

/// How seriously a peer misbehaved.
///
/// The tree only classifies; whether to drop the message, disconnect, or ban
/// is the embedding session's policy decision.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Technically invalid but plausibly accidental.
    Minor,
    /// Suspicious; repeated occurrences warrant action.
    Warn,
    /// Unambiguous consensus violation.
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Minor => f.write_str("minor"),
            Severity::Warn => f.write_str("warn"),
            Severity::Critical => f.write_str("critical"),
        }
    }
}

/// A peer-attributable consensus-rule violation.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("peer misbehavior ({severity}): {message}")]
pub struct MisbehaveError {
    severity: Severity,
    message: String,
}

impl MisbehaveError {
    /// Create an error with an explicit severity.
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        MisbehaveError {
            severity,
            message: message.into(),
        }
    }

    /// Create a [`Severity::Critical`] error.
    pub fn critical(message: impl Into<String>) -> Self {
        Self::new(Severity::Critical, message)
    }

    /// The violation's severity.
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// The violation description.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Result type for tree operations.
pub type TreeResult<T> = Result<T, MisbehaveError>;
