//! Check framework tests: registry, registration binding, execution rules.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use fwdetect_analysis::checks::builtin::{CONTAINS_ACTIVE_WINDOW, CONTAINS_LOADED_MODULE};
use fwdetect_analysis::checks::{
    Check, CheckArgs, CheckOutcome, CheckRegistration, CheckRegistry, ModuleArgs, ModuleEvidence,
    WindowArgs, WindowEvidence, FACTS_UNAVAILABLE,
};
use fwdetect_analysis::facts::{FactCollection, ProcessFacts, StaticFacts, PROCESS_FACTS};
use fwdetect_analysis::results::CheckStatus;
use fwdetect_core::errors::{CheckError, DefinitionError};
use fwdetect_core::{Cancellation, FwdetectErrorCode};
use serde::Serialize;

// ---- Helpers ----

#[derive(Debug, Clone)]
struct Label(String);

impl CheckArgs for Label {
    fn describe(&self) -> String {
        self.0.clone()
    }

    fn validate(&self) -> Result<(), String> {
        if self.0.is_empty() {
            Err("label is empty".into())
        } else {
            Ok(())
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Found {
    label_seen: String,
}

fn loaded_facts() -> FactCollection {
    let facts = FactCollection::new()
        .with_source(StaticFacts::process(
            "app.exe (7)",
            ProcessFacts::new("app.exe").with_loaded_modules(["PresentationCore.dll"]),
        ))
        .unwrap();
    for snapshot in facts.snapshots() {
        snapshot.load(&Cancellation::new());
    }
    facts
}

fn counting_registration(calls: Arc<AtomicUsize>) -> CheckRegistration<Label, Found> {
    CheckRegistration::new(
        "Counting",
        "Count {} invocations",
        [PROCESS_FACTS],
        move |args: &Label, _facts: &FactCollection, _cancel: &Cancellation| {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(CheckOutcome::Passed(Found {
                label_seen: args.0.clone(),
            }))
        },
    )
}

// ---- Registry ----

#[test]
fn builtin_registry_resolves_typed_registrations() {
    let registry = CheckRegistry::with_builtins();
    let loaded = registry
        .resolve::<ModuleArgs, ModuleEvidence>(CONTAINS_LOADED_MODULE)
        .unwrap();
    assert_eq!(loaded.name(), CONTAINS_LOADED_MODULE);
    assert_eq!(loaded.fact_ids(), [PROCESS_FACTS.to_string()]);
    assert!(registry
        .resolve::<WindowArgs, WindowEvidence>(CONTAINS_ACTIVE_WINDOW)
        .is_ok());
}

#[test]
fn registry_rejects_duplicates_and_unknown_names() {
    let mut registry = CheckRegistry::new();
    let calls = Arc::new(AtomicUsize::new(0));
    registry.register(counting_registration(calls.clone())).unwrap();
    let err = registry.register(counting_registration(calls)).unwrap_err();
    assert_eq!(
        err,
        DefinitionError::DuplicateRegistration {
            name: "Counting".into()
        }
    );

    let err = registry.resolve::<Label, Found>("Nope").unwrap_err();
    assert_eq!(err.error_code(), "UNKNOWN_CHECK");

    let err = registry
        .resolve::<ModuleArgs, ModuleEvidence>("Counting")
        .unwrap_err();
    assert!(matches!(err, DefinitionError::ArgumentTypeMismatch { .. }));
    assert_eq!(registry.names().collect::<Vec<_>>(), vec!["Counting"]);
}

#[test]
fn bind_validates_arguments() {
    let mut registry = CheckRegistry::new();
    registry
        .register(counting_registration(Arc::new(AtomicUsize::new(0))))
        .unwrap();
    let err = registry
        .bind::<Label, Found>("Counting", Label(String::new()))
        .unwrap_err();
    assert_eq!(
        err.tagged(),
        "[INVALID_CHECK_ARGS] check 'Counting' rejected its arguments: label is empty"
    );
}

// ---- Execution rules ----

#[test]
fn definition_interpolates_description_and_records_evidence() {
    let calls = Arc::new(AtomicUsize::new(0));
    let definition = counting_registration(calls.clone())
        .bind(Label("wpf".into()))
        .unwrap();
    assert_eq!(definition.description(), "Count wpf invocations");
    assert_eq!(definition.fact_ids(), [PROCESS_FACTS.to_string()]);

    let facts = loaded_facts();
    let first = definition.execute(&facts, &Cancellation::new());
    let second = definition.execute(&facts, &Cancellation::new());
    assert_eq!(first, second);
    assert_eq!(first.status, CheckStatus::Passed);
    assert_eq!(first.evidence.unwrap()["labelSeen"], "wpf");
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn cancelled_check_is_not_invoked() {
    let calls = Arc::new(AtomicUsize::new(0));
    let definition = counting_registration(calls.clone())
        .bind(Label("x".into()))
        .unwrap();
    let cancel = Cancellation::new();
    cancel.cancel();

    let result = definition.execute(&loaded_facts(), &cancel);
    assert_eq!(result.status, CheckStatus::Canceled);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn unavailable_facts_fail_without_invoking() {
    let calls = Arc::new(AtomicUsize::new(0));
    let definition = counting_registration(calls.clone())
        .bind(Label("x".into()))
        .unwrap();

    // Registered but never loaded.
    let facts = FactCollection::new()
        .with_source(StaticFacts::process("app.exe", ProcessFacts::new("app.exe")))
        .unwrap();
    let result = definition.execute(&facts, &Cancellation::new());
    assert_eq!(result.status, CheckStatus::Failed);
    assert_eq!(result.error.as_deref(), Some(FACTS_UNAVAILABLE));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn faults_become_error_status() {
    let registration: CheckRegistration<Label, Found> = CheckRegistration::new(
        "Faulty",
        "Faulty {}",
        [PROCESS_FACTS],
        |_: &Label, _: &FactCollection, _: &Cancellation| {
            Err(CheckError::MalformedFacts {
                fact_id: PROCESS_FACTS.into(),
                message: "truncated module list".into(),
            })
        },
    );
    let result = registration
        .bind(Label("x".into()))
        .unwrap()
        .execute(&loaded_facts(), &Cancellation::new());
    assert_eq!(result.status, CheckStatus::Error);
    assert!(result.error.unwrap().contains("truncated module list"));
}

#[test]
fn passed_with_unit_evidence_omits_evidence() {
    let registration: CheckRegistration<Label, ()> = CheckRegistration::new(
        "Unit",
        "Unit {}",
        [PROCESS_FACTS],
        |_: &Label, _: &FactCollection, _: &Cancellation| Ok(CheckOutcome::Passed(())),
    );
    let result = registration
        .bind(Label("x".into()))
        .unwrap()
        .execute(&loaded_facts(), &Cancellation::new());
    assert_eq!(result.status, CheckStatus::Passed);
    assert!(result.evidence.is_none());
}

#[test]
fn builtin_definition_executes_against_facts() {
    let registry = CheckRegistry::with_builtins();
    let definition = registry
        .bind::<ModuleArgs, ModuleEvidence>(
            CONTAINS_LOADED_MODULE,
            ModuleArgs::new("presentationcore.dll"),
        )
        .unwrap();
    let result = definition.execute(&loaded_facts(), &Cancellation::new());
    assert_eq!(result.status, CheckStatus::Passed);
    assert_eq!(result.name, CONTAINS_LOADED_MODULE);
    assert_eq!(result.description, "Find loaded module presentationcore.dll");
}
