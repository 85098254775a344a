//! Fact payload types.
//!
//! These are the shapes produced by the target-acquisition layer (process
//! enumeration, PE parsing, version resources). The engine never produces them
//! itself; it only caches, reads, and records them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Fact id of a running-process snapshot.
pub const PROCESS_FACTS: &str = "processFacts";

/// Fact id of an on-disk executable snapshot.
pub const EXECUTABLE_FACTS: &str = "executableFacts";

/// Version-resource metadata for one binary module.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleMetadata {
    pub file_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_version: Option<String>,
    #[serde(default)]
    pub is_loaded: bool,
}

impl ModuleMetadata {
    /// Metadata with only a file name, as reported by a module list without
    /// version resources.
    pub fn named(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            ..Default::default()
        }
    }

    pub fn loaded(file_name: impl Into<String>) -> Self {
        Self {
            is_loaded: true,
            ..Self::named(file_name)
        }
    }

    pub fn with_product_name(mut self, product_name: impl Into<String>) -> Self {
        self.product_name = Some(product_name.into());
        self
    }

    pub fn with_file_version(mut self, file_version: impl Into<String>) -> Self {
        self.file_version = Some(file_version.into());
        self
    }
}

/// A top-level window owned by the inspected process.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_visible: Option<bool>,
}

impl WindowMetadata {
    pub fn with_class(class_name: impl Into<String>) -> Self {
        Self {
            class_name: Some(class_name.into()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionMetadata {
    pub name: String,
    #[serde(default)]
    pub delay_loaded: bool,
}

/// Functions imported from one module (one PE import descriptor).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportedFunctions {
    pub module_name: String,
    #[serde(default)]
    pub functions: Vec<FunctionMetadata>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedFunction {
    pub name: String,
}

/// Facts about one running process.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProcessFacts {
    pub process_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub process_id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main_module: Option<ModuleMetadata>,
    pub loaded_modules: Vec<ModuleMetadata>,
    pub active_windows: Vec<WindowMetadata>,
    pub imported_functions: Vec<ImportedFunctions>,
    pub exported_functions: Vec<ExportedFunction>,
    pub custom_data: BTreeMap<String, Vec<Value>>,
}

impl ProcessFacts {
    pub fn new(process_name: impl Into<String>) -> Self {
        Self {
            process_name: process_name.into(),
            ..Default::default()
        }
    }

    /// Convenience for tests and replay: a process with the given loaded module names.
    pub fn with_loaded_modules<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.loaded_modules = names.into_iter().map(ModuleMetadata::loaded).collect();
        self
    }

    pub fn with_window_classes<I, S>(mut self, classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.active_windows = classes.into_iter().map(WindowMetadata::with_class).collect();
        self
    }
}

/// Facts about an executable file on disk.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExecutableFacts {
    pub executable: ModuleMetadata,
    pub imported_functions: Vec<ImportedFunctions>,
    pub exported_functions: Vec<ExportedFunction>,
    pub imported_modules: Vec<ModuleMetadata>,
    /// Managed dependencies listed by the app's `.deps.json`.
    pub dotnet_modules: Vec<ModuleMetadata>,
    pub custom_data: BTreeMap<String, Vec<Value>>,
}

/// Declared shape of a fact snapshot. Snapshots sharing a fact id must share a kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FactKind {
    Process,
    Executable,
    Custom,
}

impl FactKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Process => "process",
            Self::Executable => "executable",
            Self::Custom => "custom",
        }
    }

    /// Kind implied by a well-known fact id; anything else is custom.
    pub fn for_fact_id(fact_id: &str) -> Self {
        match fact_id {
            PROCESS_FACTS => Self::Process,
            EXECUTABLE_FACTS => Self::Executable,
            _ => Self::Custom,
        }
    }
}

/// A loaded snapshot payload.
#[derive(Debug, Clone, PartialEq)]
pub enum FactPayload {
    Process(ProcessFacts),
    Executable(ExecutableFacts),
    Custom(Value),
}

impl FactPayload {
    pub fn kind(&self) -> FactKind {
        match self {
            Self::Process(_) => FactKind::Process,
            Self::Executable(_) => FactKind::Executable,
            Self::Custom(_) => FactKind::Custom,
        }
    }

    /// Raw JSON form recorded in the run result.
    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        match self {
            Self::Process(p) => serde_json::to_value(p),
            Self::Executable(e) => serde_json::to_value(e),
            Self::Custom(v) => Ok(v.clone()),
        }
    }

    /// Rebuild a payload of `kind` from its recorded JSON form.
    pub fn from_value(kind: FactKind, value: Value) -> Result<Self, serde_json::Error> {
        Ok(match kind {
            FactKind::Process => Self::Process(serde_json::from_value(value)?),
            FactKind::Executable => Self::Executable(serde_json::from_value(value)?),
            FactKind::Custom => Self::Custom(value),
        })
    }

    /// Modules mapped into a live process.
    pub fn loaded_modules(&self) -> &[ModuleMetadata] {
        match self {
            Self::Process(p) => &p.loaded_modules,
            _ => &[],
        }
    }

    /// Modules known without running the target: the main module, static
    /// imports, and managed dependencies.
    pub fn static_modules(&self) -> Vec<&ModuleMetadata> {
        match self {
            Self::Process(p) => p.main_module.iter().collect(),
            Self::Executable(e) => std::iter::once(&e.executable)
                .chain(e.imported_modules.iter())
                .chain(e.dotnet_modules.iter())
                .collect(),
            Self::Custom(_) => Vec::new(),
        }
    }

    pub fn active_windows(&self) -> &[WindowMetadata] {
        match self {
            Self::Process(p) => &p.active_windows,
            _ => &[],
        }
    }

    pub fn imported_functions(&self) -> &[ImportedFunctions] {
        match self {
            Self::Process(p) => &p.imported_functions,
            Self::Executable(e) => &e.imported_functions,
            Self::Custom(_) => &[],
        }
    }

    pub fn exported_functions(&self) -> &[ExportedFunction] {
        match self {
            Self::Process(p) => &p.exported_functions,
            Self::Executable(e) => &e.exported_functions,
            Self::Custom(_) => &[],
        }
    }

    /// Custom facts under `key`. Custom payloads expose their top-level object
    /// fields, with non-array values treated as a single-element list.
    pub fn custom_data(&self, key: &str) -> Vec<&Value> {
        match self {
            Self::Process(p) => p.custom_data.get(key).map(|v| v.iter().collect()),
            Self::Executable(e) => e.custom_data.get(key).map(|v| v.iter().collect()),
            Self::Custom(v) => v.get(key).map(|field| match field {
                Value::Array(items) => items.iter().collect(),
                other => vec![other],
            }),
        }
        .unwrap_or_default()
    }
}
