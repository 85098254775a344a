//! CheckRegistry: check kinds by name.

use std::any::Any;

use fwdetect_core::errors::DefinitionError;
use rustc_hash::FxHashMap;
use serde::Serialize;

use super::builtin;
use super::definition::CheckDefinition;
use super::registration::CheckRegistration;
use super::types::CheckArgs;

/// Registry of check kinds. Passed explicitly into detector construction.
///
/// Registrations are stored type-erased and recovered with [`resolve`],
/// which checks the argument and evidence types.
///
/// [`resolve`]: CheckRegistry::resolve
#[derive(Default)]
pub struct CheckRegistry {
    registrations: FxHashMap<String, Box<dyn Any + Send + Sync>>,
    order: Vec<String>,
}

impl CheckRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in check kind.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        builtin::register_all(&mut registry);
        registry
    }

    pub fn register<A, E>(
        &mut self,
        registration: CheckRegistration<A, E>,
    ) -> Result<(), DefinitionError>
    where
        A: CheckArgs,
        E: Serialize + Send + Sync + 'static,
    {
        if self.registrations.contains_key(registration.name()) {
            return Err(DefinitionError::DuplicateRegistration {
                name: registration.name().to_string(),
            });
        }
        self.insert(registration);
        Ok(())
    }

    pub(crate) fn insert<A, E>(&mut self, registration: CheckRegistration<A, E>)
    where
        A: CheckArgs,
        E: Serialize + Send + Sync + 'static,
    {
        let name = registration.name().to_string();
        if self
            .registrations
            .insert(name.clone(), Box::new(registration))
            .is_none()
        {
            self.order.push(name);
        }
    }

    /// Look up a registration by name, recovering its argument and evidence types.
    pub fn resolve<A, E>(&self, name: &str) -> Result<CheckRegistration<A, E>, DefinitionError>
    where
        A: CheckArgs,
        E: Serialize + Send + Sync + 'static,
    {
        let entry = self
            .registrations
            .get(name)
            .ok_or_else(|| DefinitionError::UnknownCheck {
                name: name.to_string(),
            })?;
        entry
            .downcast_ref::<CheckRegistration<A, E>>()
            .cloned()
            .ok_or_else(|| DefinitionError::ArgumentTypeMismatch {
                name: name.to_string(),
            })
    }

    /// Resolve `name` and bind `args`, validating them.
    pub fn bind<A, E>(
        &self,
        name: &str,
        args: A,
    ) -> Result<CheckDefinition<A, E>, DefinitionError>
    where
        A: CheckArgs,
        E: Serialize + Send + Sync + 'static,
    {
        self.resolve::<A, E>(name)?.bind(args)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.registrations.contains_key(name)
    }

    /// Registered names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl std::fmt::Debug for CheckRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckRegistry")
            .field("checks", &self.order)
            .finish()
    }
}
