//! Built-in check kinds.
//!
//! Name arguments are glob patterns matched case-insensitively; module names
//! are compared on their file name component. `ModuleArgs::exact` and
//! `WindowArgs::exact` escape the name for a literal comparison.

pub mod custom_data;
pub mod functions;
pub mod module;
pub mod window;

use glob::{MatchOptions, Pattern};

use super::registry::CheckRegistry;

pub const CONTAINS_LOADED_MODULE: &str = "ContainsLoadedModule";
pub const CONTAINS_MODULE: &str = "ContainsModule";
pub const CONTAINS_ACTIVE_WINDOW: &str = "ContainsActiveWindow";
pub const CONTAINS_IMPORTED_FUNCTION: &str = "ContainsImportedFunction";
pub const CONTAINS_EXPORTED_FUNCTION: &str = "ContainsExportedFunction";
pub const CONTAINS_CUSTOM_DATA: &str = "ContainsCustomData";

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: false,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

pub(crate) fn register_all(registry: &mut CheckRegistry) {
    registry.insert(module::loaded_module_registration());
    registry.insert(module::module_registration());
    registry.insert(window::active_window_registration());
    registry.insert(functions::imported_function_registration());
    registry.insert(functions::exported_function_registration());
    registry.insert(custom_data::custom_data_registration());
}

pub(crate) fn compile_pattern(pattern: &str) -> Result<Pattern, String> {
    if pattern.trim().is_empty() {
        return Err("pattern is empty".to_string());
    }
    Pattern::new(pattern).map_err(|e| format!("invalid pattern '{pattern}': {e}"))
}

pub(crate) fn matches(pattern: &Pattern, text: &str) -> bool {
    pattern.matches_with(text, MATCH_OPTIONS)
}

/// Match against the file name component of a module path.
pub(crate) fn matches_file_name(pattern: &Pattern, path: &str) -> bool {
    matches(pattern, file_name_of(path))
}

fn file_name_of(path: &str) -> &str {
    path.rsplit(['\\', '/']).next().unwrap_or(path)
}
