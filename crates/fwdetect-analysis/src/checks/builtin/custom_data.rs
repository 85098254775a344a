//! Free-form facts contributed by custom fact producers.

use fwdetect_core::errors::CheckError;
use fwdetect_core::Cancellation;
use serde::Serialize;
use serde_json::Value;
use smallvec::SmallVec;

use super::CONTAINS_CUSTOM_DATA;
use crate::checks::registration::CheckRegistration;
use crate::checks::types::{CheckArgs, CheckOutcome};
use crate::facts::{FactCollection, EXECUTABLE_FACTS, PROCESS_FACTS};

#[derive(Debug, Clone, PartialEq)]
pub struct CustomDataArgs {
    pub key: String,
    /// Required value. `None` accepts any value under the key.
    pub value: Option<Value>,
    /// Custom fact id to search besides process and executable facts.
    pub fact_id: Option<String>,
}

impl CustomDataArgs {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: None,
            fact_id: None,
        }
    }

    pub fn with_value(mut self, value: impl Into<Value>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn in_fact(mut self, fact_id: impl Into<String>) -> Self {
        self.fact_id = Some(fact_id.into());
        self
    }
}

impl CheckArgs for CustomDataArgs {
    fn describe(&self) -> String {
        match &self.value {
            Some(value) => format!("{}={value}", self.key),
            None => self.key.clone(),
        }
    }

    fn validate(&self) -> Result<(), String> {
        if self.key.trim().is_empty() {
            return Err("key is empty".to_string());
        }
        if self.fact_id.as_deref().is_some_and(|id| id.trim().is_empty()) {
            return Err("fact id is empty".to_string());
        }
        Ok(())
    }

    fn extra_fact_ids(&self) -> SmallVec<[String; 2]> {
        self.fact_id.iter().cloned().collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomDataEvidence {
    pub fact_id: String,
    pub key: String,
    pub value: Value,
    pub target: String,
}

pub fn custom_data_registration() -> CheckRegistration<CustomDataArgs, CustomDataEvidence> {
    CheckRegistration::new(
        CONTAINS_CUSTOM_DATA,
        "Find custom data {}",
        [PROCESS_FACTS, EXECUTABLE_FACTS],
        contains_custom_data,
    )
}

fn contains_custom_data(
    args: &CustomDataArgs,
    facts: &FactCollection,
    cancel: &Cancellation,
) -> Result<CheckOutcome<CustomDataEvidence>, CheckError> {
    let fact_ids = [PROCESS_FACTS, EXECUTABLE_FACTS]
        .into_iter()
        .chain(args.fact_id.as_deref());

    for fact_id in fact_ids {
        for snapshot in facts.get(fact_id) {
            if cancel.is_cancelled() {
                return Ok(CheckOutcome::Canceled);
            }
            let Some(payload) = snapshot.payload() else {
                continue;
            };
            let found = payload
                .custom_data(&args.key)
                .into_iter()
                .find(|v| args.value.as_ref().map_or(true, |want| *v == want));
            if let Some(value) = found {
                return Ok(CheckOutcome::Passed(CustomDataEvidence {
                    fact_id: fact_id.to_string(),
                    key: args.key.clone(),
                    value: value.clone(),
                    target: snapshot.target().to_string(),
                }));
            }
        }
    }
    Ok(CheckOutcome::Failed)
}
