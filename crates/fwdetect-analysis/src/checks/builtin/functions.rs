//! Import and export table checks.

use fwdetect_core::errors::CheckError;
use fwdetect_core::Cancellation;
use glob::Pattern;
use serde::Serialize;

use super::{
    compile_pattern, matches, matches_file_name, CONTAINS_EXPORTED_FUNCTION,
    CONTAINS_IMPORTED_FUNCTION,
};
use crate::checks::registration::CheckRegistration;
use crate::checks::types::{CheckArgs, CheckOutcome};
use crate::facts::{
    ExportedFunction, FactCollection, FactSnapshot, FunctionMetadata, EXECUTABLE_FACTS,
    PROCESS_FACTS,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedFunctionArgs {
    /// Glob over the imported module name.
    pub module_name: String,
    /// Glob over the function name. `None` accepts any import from the module.
    pub function_name: Option<String>,
}

impl ImportedFunctionArgs {
    pub fn new(module_name: impl Into<String>) -> Self {
        Self {
            module_name: module_name.into(),
            function_name: None,
        }
    }

    pub fn with_function(mut self, function_name: impl Into<String>) -> Self {
        self.function_name = Some(function_name.into());
        self
    }

    fn patterns(&self) -> Result<(Pattern, Option<Pattern>), String> {
        let module = compile_pattern(&self.module_name)?;
        let function = self
            .function_name
            .as_deref()
            .map(compile_pattern)
            .transpose()?;
        Ok((module, function))
    }
}

impl CheckArgs for ImportedFunctionArgs {
    fn describe(&self) -> String {
        match &self.function_name {
            Some(function) => format!("{}!{function}", self.module_name),
            None => self.module_name.clone(),
        }
    }

    fn validate(&self) -> Result<(), String> {
        self.patterns().map(|_| ())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportedFunctionEvidence {
    pub module_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function: Option<FunctionMetadata>,
    pub target: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFunctionArgs {
    pub function_name: String,
}

impl ExportedFunctionArgs {
    pub fn new(function_name: impl Into<String>) -> Self {
        Self {
            function_name: function_name.into(),
        }
    }
}

impl CheckArgs for ExportedFunctionArgs {
    fn describe(&self) -> String {
        self.function_name.clone()
    }

    fn validate(&self) -> Result<(), String> {
        compile_pattern(&self.function_name).map(|_| ())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedFunctionEvidence {
    pub function: ExportedFunction,
    pub target: String,
}

pub fn imported_function_registration(
) -> CheckRegistration<ImportedFunctionArgs, ImportedFunctionEvidence> {
    CheckRegistration::new(
        CONTAINS_IMPORTED_FUNCTION,
        "Find imported function {}",
        [PROCESS_FACTS, EXECUTABLE_FACTS],
        contains_imported_function,
    )
}

pub fn exported_function_registration(
) -> CheckRegistration<ExportedFunctionArgs, ExportedFunctionEvidence> {
    CheckRegistration::new(
        CONTAINS_EXPORTED_FUNCTION,
        "Find exported function {}",
        [PROCESS_FACTS, EXECUTABLE_FACTS],
        contains_exported_function,
    )
}

fn all_snapshots(facts: &FactCollection) -> impl Iterator<Item = &FactSnapshot> {
    facts
        .get(PROCESS_FACTS)
        .iter()
        .chain(facts.get(EXECUTABLE_FACTS))
}

fn contains_imported_function(
    args: &ImportedFunctionArgs,
    facts: &FactCollection,
    cancel: &Cancellation,
) -> Result<CheckOutcome<ImportedFunctionEvidence>, CheckError> {
    let (module, function) = args.patterns().map_err(CheckError::InvalidArgument)?;

    for snapshot in all_snapshots(facts) {
        if cancel.is_cancelled() {
            return Ok(CheckOutcome::Canceled);
        }
        let Some(payload) = snapshot.payload() else {
            continue;
        };
        for imports in payload
            .imported_functions()
            .iter()
            .filter(|i| matches_file_name(&module, &i.module_name))
        {
            let hit = match &function {
                None => Some(None),
                Some(pattern) => imports
                    .functions
                    .iter()
                    .find(|f| matches(pattern, &f.name))
                    .map(|f| Some(f.clone())),
            };
            if let Some(function) = hit {
                return Ok(CheckOutcome::Passed(ImportedFunctionEvidence {
                    module_name: imports.module_name.clone(),
                    function,
                    target: snapshot.target().to_string(),
                }));
            }
        }
    }
    Ok(CheckOutcome::Failed)
}

fn contains_exported_function(
    args: &ExportedFunctionArgs,
    facts: &FactCollection,
    cancel: &Cancellation,
) -> Result<CheckOutcome<ExportedFunctionEvidence>, CheckError> {
    let pattern = compile_pattern(&args.function_name).map_err(CheckError::InvalidArgument)?;

    for snapshot in all_snapshots(facts) {
        if cancel.is_cancelled() {
            return Ok(CheckOutcome::Canceled);
        }
        let Some(payload) = snapshot.payload() else {
            continue;
        };
        if let Some(function) = payload
            .exported_functions()
            .iter()
            .find(|f| matches(&pattern, &f.name))
        {
            return Ok(CheckOutcome::Passed(ExportedFunctionEvidence {
                function: function.clone(),
                target: snapshot.target().to_string(),
            }));
        }
    }
    Ok(CheckOutcome::Failed)
}
