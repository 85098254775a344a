//! Detection engine.

pub mod detection;
mod progress;

pub use detection::DetectionEngine;
