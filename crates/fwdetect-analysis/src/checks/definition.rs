//! The erased half of a check: `Check` trait objects the engine drives.

use std::panic::{catch_unwind, AssertUnwindSafe};

use fwdetect_core::errors::CheckError;
use fwdetect_core::Cancellation;
use serde::Serialize;
use serde_json::Value;
use smallvec::SmallVec;

use super::registration::CheckRegistration;
use super::types::{CheckArgs, CheckOutcome};
use crate::facts::FactCollection;
use crate::results::{CheckResult, CheckStatus};

/// Error recorded when none of a check's fact ids has a loaded snapshot.
pub const FACTS_UNAVAILABLE: &str = "facts unavailable";

/// Argument-erased check, as held by detector definitions.
pub trait Check: Send + Sync {
    fn name(&self) -> &str;

    /// Description with the argument already interpolated.
    fn description(&self) -> &str;

    fn fact_ids(&self) -> &[String];

    /// Run the check. Each call returns its own result and never panics.
    fn execute(&self, facts: &FactCollection, cancel: &Cancellation) -> CheckResult;
}

/// A registration bound to one argument value. Immutable.
pub struct CheckDefinition<A, E> {
    registration: CheckRegistration<A, E>,
    args: A,
    description: String,
    fact_ids: SmallVec<[String; 2]>,
}

impl<A, E> CheckDefinition<A, E>
where
    A: CheckArgs,
    E: Serialize + Send + Sync + 'static,
{
    pub(crate) fn new(registration: CheckRegistration<A, E>, args: A) -> Self {
        let description = registration.describe(&args);
        let mut fact_ids: SmallVec<[String; 2]> = registration.fact_ids().iter().cloned().collect();
        for extra in args.extra_fact_ids() {
            if !fact_ids.contains(&extra) {
                fact_ids.push(extra);
            }
        }
        Self {
            registration,
            args,
            description,
            fact_ids,
        }
    }

    pub fn args(&self) -> &A {
        &self.args
    }

    fn evaluate(
        &self,
        facts: &FactCollection,
        cancel: &Cancellation,
    ) -> Result<CheckOutcome<E>, CheckError> {
        catch_unwind(AssertUnwindSafe(|| {
            self.registration.evaluate(&self.args, facts, cancel)
        }))
        .unwrap_or_else(|panic| {
            Err(CheckError::Panicked(crate::panic_message(panic.as_ref())))
        })
    }
}

impl<A, E> Check for CheckDefinition<A, E>
where
    A: CheckArgs,
    E: Serialize + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        self.registration.name()
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn fact_ids(&self) -> &[String] {
        &self.fact_ids
    }

    fn execute(&self, facts: &FactCollection, cancel: &Cancellation) -> CheckResult {
        let mut result = CheckResult::new(self.name(), self.description.as_str());

        if cancel.is_cancelled() {
            result.status = CheckStatus::Canceled;
            return result;
        }

        if !self.fact_ids.iter().any(|id| facts.has_loaded(id)) {
            result.status = CheckStatus::Failed;
            result.error = Some(FACTS_UNAVAILABLE.to_string());
            return result;
        }

        result.status = CheckStatus::InProgress;
        match self.evaluate(facts, cancel) {
            Ok(CheckOutcome::Passed(evidence)) => match serde_json::to_value(&evidence) {
                Ok(Value::Null) => result.status = CheckStatus::Passed,
                Ok(value) => {
                    result.status = CheckStatus::Passed;
                    result.evidence = Some(value);
                }
                Err(e) => {
                    let err = CheckError::Evidence(e.to_string());
                    tracing::warn!(check = self.name(), error = %err, "check evidence not serializable");
                    result.status = CheckStatus::Error;
                    result.error = Some(err.to_string());
                }
            },
            Ok(CheckOutcome::Failed) if cancel.is_cancelled() => {
                result.status = CheckStatus::Canceled;
            }
            Ok(CheckOutcome::Failed) => result.status = CheckStatus::Failed,
            Ok(CheckOutcome::Canceled) => result.status = CheckStatus::Canceled,
            Err(err) => {
                tracing::warn!(
                    check = self.name(),
                    description = %self.description,
                    error = %err,
                    "check faulted"
                );
                result.status = CheckStatus::Error;
                result.error = Some(err.to_string());
            }
        }
        result
    }
}

impl<A: std::fmt::Debug, E> std::fmt::Debug for CheckDefinition<A, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckDefinition")
            .field("name", &self.registration.name())
            .field("args", &self.args)
            .field("description", &self.description)
            .finish()
    }
}
