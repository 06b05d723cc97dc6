//! Unified Error Model
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A single input violation with a corrective suggestion.
///
/// Every client-facing rejection carries one of these, so the caller always
/// learns how to fix the input and not only that it is wrong.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub field: String,
    pub message: String,
    pub suggestion: String,
}

impl Violation {
    pub fn new(
        field: impl Into<String>,
        message: impl Into<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}: {}. Suggestion: {}",
            self.field, self.message, self.suggestion
        )
    }
}

impl std::error::Error for Violation {}

/// Failure reported by a PatternSource or ArtifactSource
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{source_id}: {message}")]
pub struct SourceError {
    pub source_id: String,
    pub message: String,
}

impl SourceError {
    pub fn new(source_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
            message: message.into(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum OseError {
    #[error("VALIDATION/{0}")]
    Validation(Violation),

    #[error("SOURCE/{0}")]
    Source(SourceError),

    #[error("TIMEOUT/{stage}: {source_id} did not respond within {budget_ms}ms")]
    Timeout {
        stage: &'static str,
        source_id: &'static str,
        budget_ms: u64,
    },

    #[error("STATE/{0}")]
    State(String),

    #[error("INTERNAL/{0}")]
    Internal(String),
}

impl OseError {
    /// Input errors are the caller's to fix; everything else is ours
    pub fn is_client_error(&self) -> bool {
        matches!(self, OseError::Validation(_))
    }

    pub fn violation(&self) -> Option<&Violation> {
        match self {
            OseError::Validation(v) => Some(v),
            _ => None,
        }
    }
}

impl From<Violation> for OseError {
    fn from(violation: Violation) -> Self {
        OseError::Validation(violation)
    }
}

impl From<SourceError> for OseError {
    fn from(err: SourceError) -> Self {
        OseError::Source(err)
    }
}
