//! # fwdetect-analysis
//!
//! Framework detection: fact snapshots, typed checks behind an erased `Check`
//! trait, detector definitions, the concurrent detection engine, and the
//! serializable run result.

pub mod checks;
pub mod detectors;
pub mod engine;
pub mod facts;
pub mod results;

pub use checks::{Check, CheckArgs, CheckDefinition, CheckOutcome, CheckRegistration, CheckRegistry};
pub use detectors::{
    create_default_registry, Detector, DetectorBuilder, DetectorCategory, DetectorDefinition,
    DetectorInfo, DetectorRegistry,
};
pub use engine::DetectionEngine;
pub use facts::{FactCollection, FactPayload, FactSnapshot, FactSource, StaticFacts};
pub use results::{CheckResult, CheckStatus, DetectorResult, DetectorStatus, RunResult};

/// Best-effort text of a caught panic payload.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
