//! Detectors: framework signatures built from check groups.

pub mod builder;
pub mod builtin;
pub mod definition;
pub mod registry;
pub mod traits;

pub use builder::{AlternativesBuilder, CheckGroupBuilder, DetectorBuilder};
pub use definition::{CheckGroup, DetectorDefinition, PlannedCheck, RequiredEntry};
pub use registry::{create_default_registry, DetectorRegistry};
pub use traits::{Detector, DetectorCategory, DetectorInfo};
