//! Error types for the fallible edges of the crate (loading, validation, export)
//!
//! The projection engine itself never fails; it degrades to zero values instead.

use thiserror::Error;

/// Errors raised while loading inputs, validating assumptions, or writing output
#[derive(Debug, Error)]
pub enum UnderwritingError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid assumption: {field} ({reason})")]
    InvalidAssumption { field: String, reason: String },

    #[error("Invalid T12 row {row}: {reason}")]
    InvalidT12 { row: usize, reason: String },
}

impl UnderwritingError {
    pub(crate) fn invalid_assumption(field: &str, reason: impl Into<String>) -> Self {
        UnderwritingError::InvalidAssumption {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, UnderwritingError>;
