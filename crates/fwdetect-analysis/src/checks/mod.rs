//! Check framework.
//!
//! A [`CheckRegistration`] is the typed, reusable half of a check: its name,
//! description template, fact ids, and evaluation function. Binding it to an
//! argument value yields a [`CheckDefinition`], which detectors hold as an
//! argument-erased [`Check`] trait object.

pub mod builtin;
pub mod definition;
pub mod registration;
pub mod registry;
pub mod types;

pub use builtin::custom_data::{CustomDataArgs, CustomDataEvidence};
pub use builtin::functions::{
    ExportedFunctionArgs, ExportedFunctionEvidence, ImportedFunctionArgs, ImportedFunctionEvidence,
};
pub use builtin::module::{ModuleArgs, ModuleEvidence};
pub use builtin::window::{WindowArgs, WindowEvidence};
pub use definition::{Check, CheckDefinition, FACTS_UNAVAILABLE};
pub use registration::CheckRegistration;
pub use registry::CheckRegistry;
pub use types::{CheckArgs, CheckOutcome};
