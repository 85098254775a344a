//! Active window check over process facts.

use fwdetect_core::errors::CheckError;
use fwdetect_core::Cancellation;
use regex::Regex;
use serde::Serialize;

use super::{compile_pattern, matches, CONTAINS_ACTIVE_WINDOW};
use crate::checks::registration::CheckRegistration;
use crate::checks::types::{CheckArgs, CheckOutcome};
use crate::facts::{FactCollection, WindowMetadata, PROCESS_FACTS};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowArgs {
    /// Glob over the window class name, e.g. `HwndWrapper*`.
    pub class_name: String,
    /// Optional regex the window text must match.
    pub text: Option<String>,
}

impl WindowArgs {
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            text: None,
        }
    }

    /// Match the class name literally, still ignoring case.
    pub fn exact(class_name: &str) -> Self {
        Self::new(glob::Pattern::escape(class_name))
    }

    pub fn with_text(mut self, text_regex: impl Into<String>) -> Self {
        self.text = Some(text_regex.into());
        self
    }

    fn text_regex(&self) -> Result<Option<Regex>, String> {
        self.text
            .as_deref()
            .map(|t| Regex::new(t).map_err(|e| e.to_string()))
            .transpose()
    }
}

impl CheckArgs for WindowArgs {
    fn describe(&self) -> String {
        match &self.text {
            Some(text) => format!("{} /{text}/", self.class_name),
            None => self.class_name.clone(),
        }
    }

    fn validate(&self) -> Result<(), String> {
        compile_pattern(&self.class_name)?;
        self.text_regex().map(|_| ())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowEvidence {
    pub window: WindowMetadata,
    pub target: String,
}

pub fn active_window_registration() -> CheckRegistration<WindowArgs, WindowEvidence> {
    CheckRegistration::new(
        CONTAINS_ACTIVE_WINDOW,
        "Find active window {}",
        [PROCESS_FACTS],
        contains_active_window,
    )
}

fn contains_active_window(
    args: &WindowArgs,
    facts: &FactCollection,
    cancel: &Cancellation,
) -> Result<CheckOutcome<WindowEvidence>, CheckError> {
    let class = compile_pattern(&args.class_name).map_err(CheckError::InvalidArgument)?;
    let text = args.text_regex().map_err(CheckError::InvalidArgument)?;

    for snapshot in facts.get(PROCESS_FACTS) {
        if cancel.is_cancelled() {
            return Ok(CheckOutcome::Canceled);
        }
        let Some(payload) = snapshot.payload() else {
            continue;
        };
        let found = payload.active_windows().iter().find(|w| {
            w.class_name.as_deref().is_some_and(|c| matches(&class, c))
                && text.as_ref().map_or(true, |re| {
                    w.text.as_deref().is_some_and(|t| re.is_match(t))
                })
        });
        if let Some(window) = found {
            return Ok(CheckOutcome::Passed(WindowEvidence {
                window: window.clone(),
                target: snapshot.target().to_string(),
            }));
        }
    }
    Ok(CheckOutcome::Failed)
}
