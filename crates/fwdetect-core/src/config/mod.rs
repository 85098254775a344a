//! Configuration system. TOML on disk, `#[serde(default)]` everywhere so a
//! partial file (or an empty one) still yields a complete config.

pub mod detector_config;
pub mod engine_config;
pub mod logging_config;

use std::path::Path;

use serde::{Deserialize, Serialize};

pub use detector_config::DetectorConfig;
pub use engine_config::EngineConfig;
pub use logging_config::LoggingConfig;

use crate::errors::ConfigError;

/// Default config file name looked up next to the inspected target.
pub const CONFIG_FILE_NAME: &str = "fwdetect.toml";

/// Top-level configuration aggregating all subsystem configs.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct FwdetectConfig {
    pub engine: EngineConfig,
    pub detectors: DetectorConfig,
    pub logging: LoggingConfig,
}

/// Values supplied by a front end that take precedence over the file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub threads: Option<usize>,
    pub disabled_detectors: Vec<String>,
    pub enabled_only: Option<Vec<String>>,
    pub log_level: Option<String>,
}

impl FwdetectConfig {
    /// Parse config from a TOML string, falling back to defaults for missing fields.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })
    }

    /// Load and validate a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;
        let config: Self = toml::from_str(&text).map_err(|e| ConfigError::ParseError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load `fwdetect.toml` from `dir` if present, otherwise defaults.
    pub fn load_or_default(dir: &Path) -> Result<Self, ConfigError> {
        let path = dir.join(CONFIG_FILE_NAME);
        if path.is_file() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Serialize back to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::InvalidValue {
            field: "<root>".to_string(),
            message: e.to_string(),
        })
    }

    /// Check cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(threads) = self.engine.threads {
            if threads > engine_config::MAX_THREADS {
                return Err(ConfigError::ValidationFailed {
                    field: "engine.threads".to_string(),
                    message: format!("must be at most {}", engine_config::MAX_THREADS),
                });
            }
        }
        for category in &self.detectors.categories {
            if !detector_config::KNOWN_CATEGORIES.contains(&category.as_str()) {
                return Err(ConfigError::ValidationFailed {
                    field: "detectors.categories".to_string(),
                    message: format!("unknown category '{category}'"),
                });
            }
        }
        if let Some(ref only) = self.detectors.enabled_only {
            if only.is_empty() {
                return Err(ConfigError::ValidationFailed {
                    field: "detectors.enabled_only".to_string(),
                    message: "must name at least one detector when set".to_string(),
                });
            }
        }
        if let Some(ref level) = self.logging.level {
            if !logging_config::KNOWN_LEVELS.contains(&level.to_ascii_lowercase().as_str()) {
                return Err(ConfigError::InvalidValue {
                    field: "logging.level".to_string(),
                    message: format!("unknown level '{level}'"),
                });
            }
        }
        Ok(())
    }

    /// Apply front-end overrides on top of the loaded values.
    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(threads) = overrides.threads {
            self.engine.threads = Some(threads);
        }
        for name in overrides.disabled_detectors {
            if !self.detectors.disabled.contains(&name) {
                self.detectors.disabled.push(name);
            }
        }
        if overrides.enabled_only.is_some() {
            self.detectors.enabled_only = overrides.enabled_only;
        }
        if overrides.log_level.is_some() {
            self.logging.level = overrides.log_level;
        }
    }
}
