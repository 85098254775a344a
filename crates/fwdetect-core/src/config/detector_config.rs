//! Detector selection configuration.

use serde::{Deserialize, Serialize};

/// Category names accepted in `detectors.categories`.
pub const KNOWN_CATEGORIES: &[&str] = &["framework", "library"];

/// Which detectors take part in a run.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct DetectorConfig {
    /// Detector names to skip.
    pub disabled: Vec<String>,
    /// If set, only these detector names run.
    pub enabled_only: Option<Vec<String>>,
    /// If non-empty, only detectors in these categories run.
    pub categories: Vec<String>,
}

impl DetectorConfig {
    /// Whether a detector with the given name and category should run.
    pub fn is_enabled(&self, name: &str, category: &str) -> bool {
        if let Some(ref only) = self.enabled_only {
            if !only.iter().any(|n| n == name) {
                return false;
            }
        }
        if self.disabled.iter().any(|n| n == name) {
            return false;
        }
        self.categories.is_empty() || self.categories.iter().any(|c| c == category)
    }
}
