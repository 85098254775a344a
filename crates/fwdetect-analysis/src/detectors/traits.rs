//! Detector trait and detector identity.

use fwdetect_core::errors::DefinitionError;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::builder::DetectorBuilder;
use super::definition::DetectorDefinition;
use crate::checks::CheckRegistry;

/// What a detector identifies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum DetectorCategory {
    /// An application framework (UI stack, runtime).
    Framework,
    /// A library used on top of a framework.
    Library,
}

impl DetectorCategory {
    /// Name as used in `detectors.categories`.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Framework => "framework",
            Self::Library => "library",
        }
    }
}

impl std::fmt::Display for DetectorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectorInfo {
    pub name: String,
    pub description: String,
    pub framework_id: String,
    pub category: DetectorCategory,
    pub version: String,
}

impl DetectorInfo {
    pub fn new(
        name: impl Into<String>,
        framework_id: impl Into<String>,
        category: DetectorCategory,
    ) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            framework_id: framework_id.into(),
            category,
            version: fwdetect_core::TOOL_VERSION.to_string(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }
}

/// A framework signature.
///
/// Implementations declare their groups in [`define`](Detector::define);
/// the registry turns that into a frozen [`DetectorDefinition`].
pub trait Detector: Send + Sync {
    fn info(&self) -> DetectorInfo;

    fn define<'r>(&self, builder: DetectorBuilder<'r>) -> DetectorBuilder<'r>;

    fn create_definition(
        &self,
        checks: &CheckRegistry,
    ) -> Result<DetectorDefinition, DefinitionError> {
        self.define(DetectorDefinition::builder(self.info(), checks))
            .build()
    }
}
