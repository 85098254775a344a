//! Stable error codes shared by every error enum.

pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
pub const DEFINITION_ERROR: &str = "DEFINITION_ERROR";
pub const NO_REQUIRED_CHECKS: &str = "NO_REQUIRED_CHECKS";
pub const UNKNOWN_CHECK: &str = "UNKNOWN_CHECK";
pub const INVALID_CHECK_ARGS: &str = "INVALID_CHECK_ARGS";
pub const FACT_ERROR: &str = "FACT_ERROR";
pub const ACQUISITION_FAILED: &str = "ACQUISITION_FAILED";
pub const CHECK_FAULT: &str = "CHECK_FAULT";
pub const CANCELLED: &str = "CANCELLED";
pub const THREAD_POOL_ERROR: &str = "THREAD_POOL_ERROR";
pub const SERIALIZATION_ERROR: &str = "SERIALIZATION_ERROR";

/// Maps an error value to one of the constants above.
pub trait FwdetectErrorCode {
    /// Stable machine-readable code.
    fn error_code(&self) -> &'static str;

    /// `"[CODE] message"`, the form written to logs and handed to front ends.
    fn tagged(&self) -> String
    where
        Self: std::fmt::Display,
    {
        format!("[{}] {self}", self.error_code())
    }
}
