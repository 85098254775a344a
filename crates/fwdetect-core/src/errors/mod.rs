//! Error types for every fwdetect subsystem.
//!
//! Each enum implements [`FwdetectErrorCode`] so callers can map any failure to
//! a stable string code.

pub mod error_code;

mod check_error;
mod config_error;
mod definition_error;
mod detection_error;
mod fact_error;

pub use check_error::CheckError;
pub use config_error::ConfigError;
pub use definition_error::DefinitionError;
pub use detection_error::{DetectionError, DetectionResult};
pub use error_code::FwdetectErrorCode;
pub use fact_error::{AcquisitionError, FactError};
