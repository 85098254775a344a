//! # fwdetect-core
//!
//! Foundation crate for the fwdetect framework detection engine.
//! Defines errors, config, run events, logging setup, and cooperative cancellation.
//! Every other crate in the workspace depends on this.

pub mod cancellation;
pub mod config;
pub mod errors;
pub mod events;
pub mod logging;

// Re-export the most commonly used types at the crate root.
pub use cancellation::Cancellation;
pub use config::FwdetectConfig;
pub use errors::error_code::FwdetectErrorCode;
pub use events::dispatcher::EventDispatcher;
pub use events::handler::DetectionEventHandler;

/// Tool name stamped into every run result.
pub const TOOL_NAME: &str = "fwdetect";

/// Tool version stamped into every run result.
pub const TOOL_VERSION: &str = env!("CARGO_PKG_VERSION");
