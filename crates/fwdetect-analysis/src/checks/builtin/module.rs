//! Module presence checks: loaded into a process, or known statically.

use fwdetect_core::errors::CheckError;
use fwdetect_core::Cancellation;
use glob::Pattern;
use serde::Serialize;
use smallvec::{smallvec, SmallVec};

use super::{compile_pattern, matches_file_name, CONTAINS_LOADED_MODULE, CONTAINS_MODULE};
use crate::checks::registration::CheckRegistration;
use crate::checks::types::{CheckArgs, CheckOutcome};
use crate::facts::{FactCollection, ModuleMetadata, EXECUTABLE_FACTS, PROCESS_FACTS};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleArgs {
    /// Glob over the module file name, e.g. `clr.dll` or `System.*.dll`.
    pub file_name: String,
    /// Exact product name from the version resource, compared case-insensitively.
    pub product_name: Option<String>,
    /// Also accept the native image (`<name>.ni.<ext>`) of the module.
    pub include_ngen: bool,
}

impl ModuleArgs {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            product_name: None,
            include_ngen: false,
        }
    }

    /// Match the file name literally, still ignoring case.
    pub fn exact(file_name: &str) -> Self {
        Self::new(Pattern::escape(file_name))
    }

    pub fn with_product_name(mut self, product_name: impl Into<String>) -> Self {
        self.product_name = Some(product_name.into());
        self
    }

    pub fn with_ngen(mut self) -> Self {
        self.include_ngen = true;
        self
    }

    fn patterns(&self) -> Result<SmallVec<[Pattern; 2]>, String> {
        let mut patterns: SmallVec<[Pattern; 2]> = smallvec![compile_pattern(&self.file_name)?];
        if self.include_ngen {
            if let Some((stem, ext)) = self.file_name.rsplit_once('.') {
                patterns.push(compile_pattern(&format!("{stem}.ni.{ext}"))?);
            }
        }
        Ok(patterns)
    }

    fn matches(&self, patterns: &[Pattern], module: &ModuleMetadata) -> bool {
        let name_matches = patterns.iter().any(|p| {
            matches_file_name(p, &module.file_name)
                || module
                    .original_file_name
                    .as_deref()
                    .is_some_and(|original| matches_file_name(p, original))
        });
        let product_matches = match self.product_name.as_deref() {
            None => true,
            Some(want) => module
                .product_name
                .as_deref()
                .is_some_and(|have| have.eq_ignore_ascii_case(want)),
        };
        name_matches && product_matches
    }
}

impl CheckArgs for ModuleArgs {
    fn describe(&self) -> String {
        match &self.product_name {
            Some(product) => format!("{} ({product})", self.file_name),
            None => self.file_name.clone(),
        }
    }

    fn validate(&self) -> Result<(), String> {
        self.patterns().map(|_| ())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleEvidence {
    pub module: ModuleMetadata,
    pub target: String,
}

pub fn loaded_module_registration() -> CheckRegistration<ModuleArgs, ModuleEvidence> {
    CheckRegistration::new(
        CONTAINS_LOADED_MODULE,
        "Find loaded module {}",
        [PROCESS_FACTS],
        contains_loaded_module,
    )
}

pub fn module_registration() -> CheckRegistration<ModuleArgs, ModuleEvidence> {
    CheckRegistration::new(
        CONTAINS_MODULE,
        "Find module {}",
        [PROCESS_FACTS, EXECUTABLE_FACTS],
        contains_module,
    )
}

fn contains_loaded_module(
    args: &ModuleArgs,
    facts: &FactCollection,
    cancel: &Cancellation,
) -> Result<CheckOutcome<ModuleEvidence>, CheckError> {
    let patterns = args.patterns().map_err(CheckError::InvalidArgument)?;
    for snapshot in facts.get(PROCESS_FACTS) {
        if cancel.is_cancelled() {
            return Ok(CheckOutcome::Canceled);
        }
        let Some(payload) = snapshot.payload() else {
            continue;
        };
        if let Some(module) = payload
            .loaded_modules()
            .iter()
            .find(|m| args.matches(&patterns, m))
        {
            return Ok(CheckOutcome::Passed(ModuleEvidence {
                module: module.clone(),
                target: snapshot.target().to_string(),
            }));
        }
    }
    Ok(CheckOutcome::Failed)
}

fn contains_module(
    args: &ModuleArgs,
    facts: &FactCollection,
    cancel: &Cancellation,
) -> Result<CheckOutcome<ModuleEvidence>, CheckError> {
    let patterns = args.patterns().map_err(CheckError::InvalidArgument)?;
    let snapshots = facts
        .get(PROCESS_FACTS)
        .iter()
        .chain(facts.get(EXECUTABLE_FACTS));
    for snapshot in snapshots {
        if cancel.is_cancelled() {
            return Ok(CheckOutcome::Canceled);
        }
        let Some(payload) = snapshot.payload() else {
            continue;
        };
        let found = payload
            .loaded_modules()
            .iter()
            .chain(payload.static_modules())
            .find(|m| args.matches(&patterns, m));
        if let Some(module) = found {
            return Ok(CheckOutcome::Passed(ModuleEvidence {
                module: module.clone(),
                target: snapshot.target().to_string(),
            }));
        }
    }
    Ok(CheckOutcome::Failed)
}
