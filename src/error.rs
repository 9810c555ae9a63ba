//! Typed errors for the projection engine public API

use chrono::NaiveDate;
use thiserror::Error;

/// Errors produced by the core operations
#[derive(Debug, Error)]
pub enum EngineError {
    /// Malformed or out-of-domain input, detected before any projection math runs
    #[error("invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    /// A required currency conversion is unavailable; aborts the whole batch
    #[error("no fx rate for {currency}->{reporting} at or before {date}")]
    MissingRate {
        currency: String,
        reporting: String,
        date: NaiveDate,
    },

    /// Internal arithmetic inconsistency; unreachable given validated input
    #[error("arithmetic invariant violated: {0}")]
    Invariant(String),

    /// Failure reading external transaction or rate data
    #[error("load error in {path}: {message}")]
    Load { path: String, message: String },
}

impl EngineError {
    pub(crate) fn validation(field: &'static str, message: impl Into<String>) -> Self {
        EngineError::Validation {
            field,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
