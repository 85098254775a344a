//! Faults raised by a check's evaluation function.
//!
//! A fault is different from a failed check: failure means the fact is absent,
//! a fault means the check itself could not run. The check definition turns
//! faults into an `error` status instead of propagating them.

use super::error_code::{self, FwdetectErrorCode};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CheckError {
    #[error("invalid check argument: {0}")]
    InvalidArgument(String),

    #[error("malformed facts in '{fact_id}': {message}")]
    MalformedFacts { fact_id: String, message: String },

    #[error("evidence could not be serialized: {0}")]
    Evidence(String),

    #[error("check panicked: {0}")]
    Panicked(String),

    #[error("{0}")]
    Internal(String),
}

impl FwdetectErrorCode for CheckError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => error_code::INVALID_CHECK_ARGS,
            Self::Evidence(_) => error_code::SERIALIZATION_ERROR,
            _ => error_code::CHECK_FAULT,
        }
    }
}
