use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::check_result::{CheckResult, CheckStatus};
use crate::detectors::{DetectorCategory, DetectorInfo};

/// Lifecycle of one detector within a run.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "camelCase")]
pub enum DetectorStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
    Canceled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DetectorResult {
    pub detector_name: String,
    pub detector_version: String,
    pub detector_description: String,
    pub framework_id: String,
    pub category: DetectorCategory,
    pub framework_found: bool,
    pub status: DetectorStatus,
    pub check_results: Vec<CheckResult>,
}

impl DetectorResult {
    /// Aggregate finished check results into a verdict.
    ///
    /// Plain required groups must pass in full. For each any-of set, at least
    /// one alternative group must pass in full. A detector with no required
    /// results is never found. The detector is completed when every check
    /// reached a terminal status, canceled otherwise.
    pub fn from_checks(info: &DetectorInfo, check_results: Vec<CheckResult>) -> Self {
        let framework_found = framework_found(&check_results);
        let status = if check_results.iter().all(|c| c.status.is_terminal()) {
            DetectorStatus::Completed
        } else {
            DetectorStatus::Canceled
        };

        Self {
            detector_name: info.name.clone(),
            detector_version: info.version.clone(),
            detector_description: info.description.clone(),
            framework_id: info.framework_id.clone(),
            category: info.category,
            framework_found,
            status,
            check_results,
        }
    }

    pub fn required_results(&self) -> impl Iterator<Item = &CheckResult> {
        self.check_results.iter().filter(|c| c.required)
    }

    pub fn optional_results(&self) -> impl Iterator<Item = &CheckResult> {
        self.check_results.iter().filter(|c| !c.required)
    }

    pub fn count_with_status(&self, status: CheckStatus) -> usize {
        self.check_results.iter().filter(|c| c.status == status).count()
    }
}

fn framework_found(results: &[CheckResult]) -> bool {
    let mut any_required = false;
    // any-of set name -> (group name -> all passed so far), in first-seen order
    let mut sets: Vec<(&str, Vec<(&str, bool)>)> = Vec::new();

    for result in results.iter().filter(|c| c.required) {
        any_required = true;
        match result.any_of.as_deref() {
            None => {
                if !result.passed() {
                    return false;
                }
            }
            Some(set) => {
                let idx = match sets.iter().position(|(name, _)| *name == set) {
                    Some(idx) => idx,
                    None => {
                        sets.push((set, Vec::new()));
                        sets.len() - 1
                    }
                };
                let groups = &mut sets[idx].1;
                match groups
                    .iter_mut()
                    .find(|(group, _)| *group == result.group_name.as_str())
                {
                    Some((_, ok)) => *ok &= result.passed(),
                    None => groups.push((result.group_name.as_str(), result.passed())),
                }
            }
        }
    }

    any_required
        && sets
            .iter()
            .all(|(_, groups)| groups.iter().any(|(_, ok)| *ok))
}
