//! Fluent detector builder.
//!
//! Resolution and validation errors are collected while the builder is
//! populated and reported by [`DetectorBuilder::build`], first error first.

use std::sync::Arc;

use fwdetect_core::errors::DefinitionError;
use rustc_hash::FxHashSet;
use serde::Serialize;

use super::definition::{CheckGroup, DetectorDefinition, RequiredEntry};
use super::traits::DetectorInfo;
use crate::checks::builtin::{
    CONTAINS_ACTIVE_WINDOW, CONTAINS_CUSTOM_DATA, CONTAINS_EXPORTED_FUNCTION,
    CONTAINS_IMPORTED_FUNCTION, CONTAINS_LOADED_MODULE, CONTAINS_MODULE,
};
use crate::checks::{
    Check, CheckArgs, CheckRegistry, CustomDataArgs, CustomDataEvidence, ExportedFunctionArgs,
    ExportedFunctionEvidence, ImportedFunctionArgs, ImportedFunctionEvidence, ModuleArgs,
    ModuleEvidence, WindowArgs, WindowEvidence,
};

pub struct DetectorBuilder<'r> {
    checks: &'r CheckRegistry,
    info: DetectorInfo,
    required: Vec<RequiredEntry>,
    optional: Vec<CheckGroup>,
    group_names: FxHashSet<String>,
    errors: Vec<DefinitionError>,
}

impl<'r> DetectorBuilder<'r> {
    pub fn new(info: DetectorInfo, checks: &'r CheckRegistry) -> Self {
        Self {
            checks,
            info,
            required: Vec::new(),
            optional: Vec::new(),
            group_names: FxHashSet::default(),
            errors: Vec::new(),
        }
    }

    /// Add a required group. Every check in it must pass.
    pub fn required<F>(mut self, group_name: impl Into<String>, build: F) -> Self
    where
        F: FnOnce(CheckGroupBuilder<'r>) -> CheckGroupBuilder<'r>,
    {
        let group = build(CheckGroupBuilder::new(self.checks));
        if let Some(group) = self.finish_group(group_name.into(), group) {
            self.required.push(RequiredEntry::Group(group));
        }
        self
    }

    /// Add a required set of alternatives. The set passes when at least one
    /// alternative group passes in full.
    pub fn required_any_of<F>(mut self, set_name: impl Into<String>, build: F) -> Self
    where
        F: FnOnce(AlternativesBuilder<'r>) -> AlternativesBuilder<'r>,
    {
        let set_name = set_name.into();
        let alternatives = build(AlternativesBuilder::new(self.checks)).alternatives;

        if !self.group_names.insert(set_name.clone()) {
            self.errors.push(DefinitionError::DuplicateGroup {
                detector: self.info.name.clone(),
                group: set_name.clone(),
            });
        }
        if alternatives.len() < 2 {
            self.errors.push(DefinitionError::TooFewAlternatives {
                detector: self.info.name.clone(),
                set: set_name.clone(),
                count: alternatives.len(),
            });
        }

        let groups: Vec<CheckGroup> = alternatives
            .into_iter()
            .filter_map(|(name, group)| self.finish_group(name, group))
            .collect();
        if !groups.is_empty() {
            self.required.push(RequiredEntry::AnyOf {
                name: set_name,
                alternatives: groups,
            });
        }
        self
    }

    /// Add an optional group. Its outcome is reported but never affects
    /// whether the framework is found.
    pub fn optional<F>(mut self, group_name: impl Into<String>, build: F) -> Self
    where
        F: FnOnce(CheckGroupBuilder<'r>) -> CheckGroupBuilder<'r>,
    {
        let group = build(CheckGroupBuilder::new(self.checks));
        if let Some(group) = self.finish_group(group_name.into(), group) {
            self.optional.push(group);
        }
        self
    }

    pub fn build(self) -> Result<DetectorDefinition, DefinitionError> {
        if let Some(first) = self.errors.into_iter().next() {
            return Err(first);
        }
        if self.required.is_empty() {
            return Err(DefinitionError::NoRequiredChecks {
                detector: self.info.name,
            });
        }
        Ok(DetectorDefinition {
            info: self.info,
            required: self.required,
            optional: self.optional,
        })
    }

    fn finish_group(&mut self, name: String, group: CheckGroupBuilder<'r>) -> Option<CheckGroup> {
        let mut ok = group.errors.is_empty();
        self.errors.extend(group.errors);

        if !self.group_names.insert(name.clone()) {
            self.errors.push(DefinitionError::DuplicateGroup {
                detector: self.info.name.clone(),
                group: name.clone(),
            });
            ok = false;
        }
        if group.checks.is_empty() && ok {
            self.errors.push(DefinitionError::EmptyGroup {
                detector: self.info.name.clone(),
                group: name.clone(),
            });
            ok = false;
        }

        ok.then(|| CheckGroup {
            name,
            checks: group.checks,
        })
    }
}

/// Populates one check group.
pub struct CheckGroupBuilder<'r> {
    registry: &'r CheckRegistry,
    checks: Vec<Arc<dyn Check>>,
    errors: Vec<DefinitionError>,
}

impl<'r> CheckGroupBuilder<'r> {
    fn new(registry: &'r CheckRegistry) -> Self {
        Self {
            registry,
            checks: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Bind `args` to the registered check `name`.
    pub fn check<A, E>(mut self, name: &str, args: A) -> Self
    where
        A: CheckArgs,
        E: Serialize + Send + Sync + 'static,
    {
        match self.registry.bind::<A, E>(name, args) {
            Ok(definition) => self.checks.push(Arc::new(definition)),
            Err(e) => self.errors.push(e),
        }
        self
    }

    /// Add a check that does not come from the registry.
    pub fn add(mut self, check: impl Check + 'static) -> Self {
        self.checks.push(Arc::new(check));
        self
    }

    pub fn contains_loaded_module(self, file_name: &str) -> Self {
        self.contains_loaded_module_with(ModuleArgs::new(file_name))
    }

    pub fn contains_loaded_module_with(self, args: ModuleArgs) -> Self {
        self.check::<ModuleArgs, ModuleEvidence>(CONTAINS_LOADED_MODULE, args)
    }

    /// Module loaded in a process or listed statically by an executable.
    pub fn contains_module(self, file_name: &str) -> Self {
        self.contains_module_with(ModuleArgs::new(file_name))
    }

    pub fn contains_module_with(self, args: ModuleArgs) -> Self {
        self.check::<ModuleArgs, ModuleEvidence>(CONTAINS_MODULE, args)
    }

    pub fn contains_active_window(self, class_name: &str) -> Self {
        self.contains_active_window_with(WindowArgs::new(class_name))
    }

    pub fn contains_active_window_with(self, args: WindowArgs) -> Self {
        self.check::<WindowArgs, WindowEvidence>(CONTAINS_ACTIVE_WINDOW, args)
    }

    pub fn contains_imported_function(self, module_name: &str, function_name: &str) -> Self {
        self.contains_imported_function_with(
            ImportedFunctionArgs::new(module_name).with_function(function_name),
        )
    }

    pub fn contains_imported_function_with(self, args: ImportedFunctionArgs) -> Self {
        self.check::<ImportedFunctionArgs, ImportedFunctionEvidence>(
            CONTAINS_IMPORTED_FUNCTION,
            args,
        )
    }

    pub fn contains_exported_function(self, function_name: &str) -> Self {
        self.check::<ExportedFunctionArgs, ExportedFunctionEvidence>(
            CONTAINS_EXPORTED_FUNCTION,
            ExportedFunctionArgs::new(function_name),
        )
    }

    pub fn contains_custom_data(self, args: CustomDataArgs) -> Self {
        self.check::<CustomDataArgs, CustomDataEvidence>(CONTAINS_CUSTOM_DATA, args)
    }
}

/// Collects the alternative groups of a `required_any_of` set.
pub struct AlternativesBuilder<'r> {
    registry: &'r CheckRegistry,
    alternatives: Vec<(String, CheckGroupBuilder<'r>)>,
}

impl<'r> AlternativesBuilder<'r> {
    fn new(registry: &'r CheckRegistry) -> Self {
        Self {
            registry,
            alternatives: Vec::new(),
        }
    }

    pub fn alternative<F>(mut self, group_name: impl Into<String>, build: F) -> Self
    where
        F: FnOnce(CheckGroupBuilder<'r>) -> CheckGroupBuilder<'r>,
    {
        let group = build(CheckGroupBuilder::new(self.registry));
        self.alternatives.push((group_name.into(), group));
        self
    }
}
