//! Build-time errors for check registrations and detector definitions.
//!
//! All of these surface before the evaluation phase starts.

use super::error_code::{self, FwdetectErrorCode};

/// A detector or check registry was configured incorrectly.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DefinitionError {
    #[error("detector '{detector}' does not have any required checks")]
    NoRequiredChecks { detector: String },

    #[error("detector '{detector}': group '{group}' has no checks")]
    EmptyGroup { detector: String, group: String },

    #[error("detector '{detector}': group '{group}' is declared more than once")]
    DuplicateGroup { detector: String, group: String },

    #[error("detector '{detector}': any-of set '{set}' needs at least two alternatives, got {count}")]
    TooFewAlternatives {
        detector: String,
        set: String,
        count: usize,
    },

    #[error("no check registered under '{name}'")]
    UnknownCheck { name: String },

    #[error("check '{name}' is registered with different argument or evidence types")]
    ArgumentTypeMismatch { name: String },

    #[error("check '{name}' rejected its arguments: {message}")]
    InvalidArguments { name: String, message: String },

    #[error("check '{name}' is already registered")]
    DuplicateRegistration { name: String },

    #[error("detector '{name}' is already registered")]
    DuplicateDetector { name: String },

    #[error("detector '{detector}' panicked while defining its checks: {message}")]
    DefinitionPanicked { detector: String, message: String },
}

impl FwdetectErrorCode for DefinitionError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NoRequiredChecks { .. } => error_code::NO_REQUIRED_CHECKS,
            Self::UnknownCheck { .. } | Self::ArgumentTypeMismatch { .. } => {
                error_code::UNKNOWN_CHECK
            }
            Self::InvalidArguments { .. } => error_code::INVALID_CHECK_ARGS,
            _ => error_code::DEFINITION_ERROR,
        }
    }
}
