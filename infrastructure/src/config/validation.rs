//! Configuration validation issues.
//!
//! Validation never aborts loading: each problem is reported as a
//! [`ConfigIssue`] and the offending value falls back to its default.

use thiserror::Error;

/// Severity level of a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The value was unusable and has been replaced by its default.
    Error,
    /// The value works but may not behave as expected.
    Warning,
}

impl Severity {
    pub fn as_str(&self) -> &str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
        }
    }
}

/// What was wrong with a configured value.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigValidationError {
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    #[error("{field} must be at least {min}, got {value}")]
    BelowMinimum {
        field: &'static str,
        min: f64,
        value: f64,
    },

    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        min: f64,
        max: f64,
        value: f64,
    },

    #[error("{field} is {value}; {consequence}")]
    Suspicious {
        field: &'static str,
        value: String,
        consequence: &'static str,
    },
}

/// A detected issue in the loaded configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigIssue {
    pub severity: Severity,
    pub error: ConfigValidationError,
}

impl ConfigIssue {
    /// The value was replaced by its default.
    pub fn replaced(error: ConfigValidationError) -> Self {
        Self {
            severity: Severity::Error,
            error,
        }
    }

    pub fn warning(error: ConfigValidationError) -> Self {
        Self {
            severity: Severity::Warning,
            error,
        }
    }

    pub fn message(&self) -> String {
        match self.severity {
            Severity::Error => format!("{}, falling back to default", self.error),
            Severity::Warning => self.error.to_string(),
        }
    }
}
