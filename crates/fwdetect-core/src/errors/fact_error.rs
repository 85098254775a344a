//! Fact collection and fact acquisition errors.

use super::error_code::{self, FwdetectErrorCode};

/// A fact collection was assembled incorrectly.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FactError {
    #[error("snapshot '{fact_id}' for target '{target}' is already registered")]
    DuplicateSnapshot { fact_id: String, target: String },

    #[error("snapshot '{fact_id}' holds {existing} facts, cannot add {incoming} facts under the same id")]
    IncompatibleKind {
        fact_id: String,
        existing: String,
        incoming: String,
    },

    #[error("recorded payload for '{fact_id}' is malformed: {message}")]
    MalformedPayload { fact_id: String, message: String },
}

impl FwdetectErrorCode for FactError {
    fn error_code(&self) -> &'static str {
        error_code::FACT_ERROR
    }
}

/// A fact source could not produce its payload.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AcquisitionError {
    #[error("target '{target}' is not accessible: {message}")]
    Inaccessible { target: String, message: String },

    #[error("failed to read facts from '{target}': {message}")]
    ReadFailed { target: String, message: String },

    #[error("acquisition of '{target}' was cancelled")]
    Cancelled { target: String },
}

impl FwdetectErrorCode for AcquisitionError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Cancelled { .. } => error_code::CANCELLED,
            _ => error_code::ACQUISITION_FAILED,
        }
    }
}
