//! Run-level errors returned by the detection engine.

use super::error_code::{self, FwdetectErrorCode};
use super::{AcquisitionError, DefinitionError, FactError};

/// Errors that abort a whole detection run.
#[derive(Debug, thiserror::Error)]
pub enum DetectionError {
    #[error("fact acquisition failed for '{fact_id}' ({target}): {source}")]
    Acquisition {
        fact_id: String,
        target: String,
        #[source]
        source: AcquisitionError,
    },

    #[error("definition error: {0}")]
    Definition(#[from] DefinitionError),

    #[error("fact error: {0}")]
    Facts(#[from] FactError),

    #[error("failed to build worker pool: {message}")]
    ThreadPool { message: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl FwdetectErrorCode for DetectionError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Acquisition { .. } => error_code::ACQUISITION_FAILED,
            Self::Definition(e) => e.error_code(),
            Self::Facts(e) => e.error_code(),
            Self::ThreadPool { .. } => error_code::THREAD_POOL_ERROR,
            Self::Serialization(_) => error_code::SERIALIZATION_ERROR,
        }
    }
}

/// Convenience type alias.
pub type DetectionResult<T> = Result<T, DetectionError>;
