//! Detection engine configuration.

use serde::{Deserialize, Serialize};

/// Upper bound accepted for `engine.threads`.
pub const MAX_THREADS: usize = 256;

/// Configuration for the detection engine.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// Worker threads. 0 or unset = available parallelism.
    pub threads: Option<usize>,
    /// Emit progress events while checks run. Default: true.
    pub progress_events: Option<bool>,
}

impl EngineConfig {
    /// Returns the configured thread count, resolving 0/unset to the host's
    /// available parallelism.
    pub fn effective_threads(&self) -> usize {
        match self.threads {
            Some(n) if n > 0 => n,
            _ => std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
        }
    }

    /// Returns whether progress events are emitted, defaulting to true.
    pub fn effective_progress_events(&self) -> bool {
        self.progress_events.unwrap_or(true)
    }
}
