use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use fwdetect_core::errors::DetectionResult;
use fwdetect_core::{TOOL_NAME, TOOL_VERSION};
use schemars::schema::RootSchema;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::detector_result::{DetectorResult, DetectorStatus};

/// Everything a detection run produced. Immutable once returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RunResult {
    pub tool_name: String,
    pub tool_version: String,
    /// UTC, RFC 3339 / ISO-8601.
    pub timestamp: DateTime<Utc>,
    /// Raw loaded payloads by fact id, kept for audit and offline replay.
    pub data_sources: BTreeMap<String, Vec<Value>>,
    pub detectors: Vec<DetectorResult>,
}

impl RunResult {
    /// Stamp a new result with this tool's identity and the current time.
    pub fn new(data_sources: BTreeMap<String, Vec<Value>>, detectors: Vec<DetectorResult>) -> Self {
        Self {
            tool_name: TOOL_NAME.to_string(),
            tool_version: TOOL_VERSION.to_string(),
            timestamp: Utc::now(),
            data_sources,
            detectors,
        }
    }

    pub fn detector(&self, name: &str) -> Option<&DetectorResult> {
        self.detectors.iter().find(|d| d.detector_name == name)
    }

    /// Detectors whose framework was found.
    pub fn found(&self) -> impl Iterator<Item = &DetectorResult> {
        self.detectors.iter().filter(|d| d.framework_found)
    }

    /// Whether any detector was cut short by cancellation.
    pub fn is_canceled(&self) -> bool {
        self.detectors
            .iter()
            .any(|d| d.status == DetectorStatus::Canceled)
    }

    pub fn to_json_pretty(&self) -> DetectionResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> DetectionResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// JSON Schema of [`RunResult`] for downstream renderers.
pub fn run_result_schema() -> RootSchema {
    schemars::schema_for!(RunResult)
}
