//! Facts: typed payloads, write-once snapshots, and the per-run collection.

pub mod collection;
pub mod snapshot;
pub mod types;

pub use collection::FactCollection;
pub use snapshot::{FactSnapshot, FactSource, FnFactSource, LoadState, StaticFacts};
pub use types::{
    ExecutableFacts, ExportedFunction, FactKind, FactPayload, FunctionMetadata, ImportedFunctions,
    ModuleMetadata, ProcessFacts, WindowMetadata, EXECUTABLE_FACTS, PROCESS_FACTS,
};
