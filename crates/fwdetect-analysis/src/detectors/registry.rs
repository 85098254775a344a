//! DetectorRegistry: register, enable/disable, filter by category, build definitions.

use std::panic::{catch_unwind, AssertUnwindSafe};

use fwdetect_core::config::DetectorConfig;
use fwdetect_core::errors::DefinitionError;
use rustc_hash::FxHashSet;

use super::builtin;
use super::definition::DetectorDefinition;
use super::traits::{Detector, DetectorCategory};
use crate::checks::CheckRegistry;

/// Registry of detectors in registration order.
pub struct DetectorRegistry {
    detectors: Vec<Box<dyn Detector>>,
    disabled: FxHashSet<String>,
    selection: DetectorConfig,
}

impl DetectorRegistry {
    pub fn new() -> Self {
        Self {
            detectors: Vec::new(),
            disabled: FxHashSet::default(),
            selection: DetectorConfig::default(),
        }
    }

    /// Register a detector. Names must be unique.
    pub fn register(&mut self, detector: Box<dyn Detector>) -> Result<(), DefinitionError> {
        let name = detector.info().name;
        if self.detectors.iter().any(|d| d.info().name == name) {
            return Err(DefinitionError::DuplicateDetector { name });
        }
        self.detectors.push(detector);
        Ok(())
    }

    /// Disable a detector by name.
    pub fn disable(&mut self, name: &str) {
        self.disabled.insert(name.to_string());
    }

    /// Enable a previously disabled detector.
    pub fn enable(&mut self, name: &str) {
        self.disabled.remove(name);
    }

    /// Disable every detector in a category.
    pub fn disable_category(&mut self, category: DetectorCategory) {
        for detector in &self.detectors {
            let info = detector.info();
            if info.category == category {
                self.disabled.insert(info.name);
            }
        }
    }

    /// Apply the `[detectors]` section of the configuration.
    pub fn apply_config(&mut self, config: &DetectorConfig) {
        self.selection = config.clone();
    }

    /// Total number of registered detectors.
    pub fn count(&self) -> usize {
        self.detectors.len()
    }

    /// Number of enabled detectors.
    pub fn enabled_count(&self) -> usize {
        self.enabled().count()
    }

    pub fn enabled_names(&self) -> Vec<String> {
        self.enabled().map(|d| d.info().name).collect()
    }

    /// Build the definitions of every enabled detector, in registration order.
    pub fn build_definitions(
        &self,
        checks: &CheckRegistry,
    ) -> Result<Vec<DetectorDefinition>, DefinitionError> {
        self.enabled()
            .map(|detector| {
                let name = detector.info().name;
                catch_unwind(AssertUnwindSafe(|| detector.create_definition(checks)))
                    .unwrap_or_else(|panic| {
                        Err(DefinitionError::DefinitionPanicked {
                            detector: name.clone(),
                            message: crate::panic_message(panic.as_ref()),
                        })
                    })
                    .inspect_err(|e| {
                        tracing::error!(detector = %name, error = %e, "detector definition rejected");
                    })
            })
            .collect()
    }

    fn enabled(&self) -> impl Iterator<Item = &dyn Detector> {
        self.detectors
            .iter()
            .map(Box::as_ref)
            .filter(move |d| self.should_run(*d))
    }

    fn should_run(&self, detector: &dyn Detector) -> bool {
        let info = detector.info();
        !self.disabled.contains(&info.name)
            && self.selection.is_enabled(&info.name, info.category.name())
    }
}

impl Default for DetectorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Create a registry holding every built-in detector.
pub fn create_default_registry() -> DetectorRegistry {
    let mut registry = DetectorRegistry::new();

    // Frameworks
    registry.detectors.push(Box::new(builtin::WpfDetector));
    registry.detectors.push(Box::new(builtin::WinFormsDetector));
    registry.detectors.push(Box::new(builtin::WinUiDetector));
    registry.detectors.push(Box::new(builtin::DotNetFrameworkDetector));
    registry.detectors.push(Box::new(builtin::DotNetDetector));

    // Libraries
    registry.detectors.push(Box::new(builtin::MvvmToolkitDetector));

    registry
}
