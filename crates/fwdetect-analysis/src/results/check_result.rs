use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Lifecycle of one check within a run.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "camelCase")]
pub enum CheckStatus {
    #[default]
    NotStarted,
    InProgress,
    Canceled,
    Passed,
    Failed,
    /// The check faulted (returned an error or panicked).
    Error,
}

impl CheckStatus {
    /// Passed, Failed and Error end a check; a detector whose checks all
    /// reached one of these is completed.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Passed | Self::Failed | Self::Error)
    }
}

/// Outcome of one check execution, placed in its detector group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckResult {
    pub name: String,
    pub description: String,
    pub group_name: String,
    /// Name of the any-of set this check's group is an alternative of.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub any_of: Option<String>,
    pub required: bool,
    pub status: CheckStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CheckResult {
    /// A result that has not started, with no group placement yet.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            group_name: String::new(),
            any_of: None,
            required: false,
            status: CheckStatus::NotStarted,
            evidence: None,
            error: None,
        }
    }

    /// Record where the check sits in its detector.
    pub fn placed(mut self, group_name: &str, any_of: Option<&str>, required: bool) -> Self {
        self.group_name = group_name.to_string();
        self.any_of = any_of.map(str::to_string);
        self.required = required;
        self
    }

    pub fn passed(&self) -> bool {
        self.status == CheckStatus::Passed
    }
}
