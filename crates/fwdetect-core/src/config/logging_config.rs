//! Logging configuration.

use serde::{Deserialize, Serialize};

/// Level names accepted in `logging.level`.
pub const KNOWN_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error", "off"];

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset. Default: "warn".
    pub level: Option<String>,
    /// Emit JSON lines instead of human-readable output. Default: false.
    pub json: Option<bool>,
}

impl LoggingConfig {
    pub fn effective_level(&self) -> &str {
        self.level.as_deref().unwrap_or("warn")
    }

    pub fn effective_json(&self) -> bool {
        self.json.unwrap_or(false)
    }
}
