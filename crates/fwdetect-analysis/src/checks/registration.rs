//! CheckRegistration: the typed half of a check.

use std::marker::PhantomData;
use std::sync::Arc;

use fwdetect_core::errors::{CheckError, DefinitionError};
use fwdetect_core::Cancellation;
use serde::Serialize;
use smallvec::SmallVec;

use super::definition::CheckDefinition;
use super::types::{CheckArgs, CheckOutcome};
use crate::facts::FactCollection;

/// Evaluation function of a check kind.
pub type EvaluateFn<A, E> =
    dyn Fn(&A, &FactCollection, &Cancellation) -> Result<CheckOutcome<E>, CheckError> + Send + Sync;

/// One kind of check: name, description template, declared fact ids, and
/// the evaluation function. Stateless; bind it to arguments with [`bind`].
///
/// [`bind`]: CheckRegistration::bind
pub struct CheckRegistration<A, E> {
    name: String,
    description: String,
    fact_ids: SmallVec<[String; 2]>,
    evaluate: Arc<EvaluateFn<A, E>>,
    _evidence: PhantomData<fn() -> E>,
}

impl<A, E> CheckRegistration<A, E>
where
    A: CheckArgs,
    E: Serialize + Send + Sync + 'static,
{
    /// `description` may contain one `{}`, replaced by the argument's description.
    pub fn new<I, S, F>(
        name: impl Into<String>,
        description: impl Into<String>,
        fact_ids: I,
        evaluate: F,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: Fn(&A, &FactCollection, &Cancellation) -> Result<CheckOutcome<E>, CheckError>
            + Send
            + Sync
            + 'static,
    {
        Self {
            name: name.into(),
            description: description.into(),
            fact_ids: fact_ids.into_iter().map(Into::into).collect(),
            evaluate: Arc::new(evaluate),
            _evidence: PhantomData,
        }
    }

    pub fn describe(&self, args: &A) -> String {
        self.description.replacen("{}", &args.describe(), 1)
    }

    pub fn evaluate(
        &self,
        args: &A,
        facts: &FactCollection,
        cancel: &Cancellation,
    ) -> Result<CheckOutcome<E>, CheckError> {
        (self.evaluate)(args, facts, cancel)
    }

    /// Validate `args` and bind them into an executable definition.
    pub fn bind(&self, args: A) -> Result<CheckDefinition<A, E>, DefinitionError> {
        args.validate()
            .map_err(|message| DefinitionError::InvalidArguments {
                name: self.name.clone(),
                message,
            })?;
        Ok(CheckDefinition::new(self.clone(), args))
    }
}

impl<A, E> CheckRegistration<A, E> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fact_ids(&self) -> &[String] {
        &self.fact_ids
    }
}

impl<A, E> Clone for CheckRegistration<A, E> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            description: self.description.clone(),
            fact_ids: self.fact_ids.clone(),
            evaluate: Arc::clone(&self.evaluate),
            _evidence: PhantomData,
        }
    }
}

impl<A, E> std::fmt::Debug for CheckRegistration<A, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckRegistration")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("fact_ids", &self.fact_ids)
            .finish()
    }
}
