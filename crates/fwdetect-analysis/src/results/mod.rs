//! Result model: per-check, per-detector, and whole-run outcomes.
//!
//! Everything here serializes with camelCase keys and camelCase status tokens
//! and round-trips through JSON.

pub mod check_result;
pub mod detector_result;
pub mod run_result;

pub use check_result::{CheckResult, CheckStatus};
pub use detector_result::{DetectorResult, DetectorStatus};
pub use run_result::{run_result_schema, RunResult};
