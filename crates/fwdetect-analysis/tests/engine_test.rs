//! Detection engine tests: fact loading barrier, evaluation, aggregation,
//! cancellation, fault isolation, progress events.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use fwdetect_analysis::checks::{CheckOutcome, CheckRegistration, CheckRegistry, ModuleArgs};
use fwdetect_analysis::detectors::{DetectorCategory, DetectorDefinition, DetectorInfo};
use fwdetect_analysis::engine::DetectionEngine;
use fwdetect_analysis::facts::{
    FactCollection, FactKind, FactPayload, FnFactSource, ProcessFacts, StaticFacts,
    PROCESS_FACTS,
};
use fwdetect_analysis::results::{CheckStatus, DetectorStatus};
use fwdetect_core::config::EngineConfig;
use fwdetect_core::errors::{AcquisitionError, CheckError, DetectionError};
use fwdetect_core::events::types::{DetectorCompleteEvent, ProgressEvent, RunCompleteEvent};
use fwdetect_core::{Cancellation, DetectionEventHandler, EventDispatcher};

// ---- Helpers ----

fn engine(definitions: Vec<DetectorDefinition>) -> DetectionEngine {
    let config = EngineConfig {
        threads: Some(4),
        progress_events: Some(true),
    };
    DetectionEngine::new(definitions, &config).unwrap()
}

fn process_with(modules: &[&str]) -> FactCollection {
    FactCollection::new()
        .with_source(StaticFacts::process(
            "app.exe (4312)",
            ProcessFacts::new("app.exe").with_loaded_modules(modules.iter().copied()),
        ))
        .unwrap()
}

fn info(name: &str) -> DetectorInfo {
    DetectorInfo::new(name, name, DetectorCategory::Framework)
}

/// Requires both presentation assemblies, as separate required groups.
fn wpf_like(registry: &CheckRegistry) -> DetectorDefinition {
    DetectorDefinition::builder(info("WPF"), registry)
        .required("Presentation Framework", |g| {
            g.contains_loaded_module("PresentationFramework.dll")
        })
        .required("Presentation Core", |g| {
            g.contains_loaded_module("PresentationCore.dll")
        })
        .build()
        .unwrap()
}

fn faulting_registration() -> CheckRegistration<ModuleArgs, ()> {
    CheckRegistration::new("Faulting", "Always faults on {}", [PROCESS_FACTS], |_, _, _| {
        Err(CheckError::Internal("boom".into()))
    })
}

fn panicking_registration() -> CheckRegistration<ModuleArgs, ()> {
    CheckRegistration::new("Panicking", "Always panics on {}", [PROCESS_FACTS], |_, _, _| {
        panic!("check blew up")
    })
}

#[derive(Default)]
struct Recorder {
    progress: Mutex<Vec<ProgressEvent>>,
    detectors: Mutex<Vec<DetectorCompleteEvent>>,
    complete: Mutex<Vec<RunCompleteEvent>>,
}

impl DetectionEventHandler for Recorder {
    fn on_progress(&self, event: &ProgressEvent) {
        self.progress.lock().unwrap().push(event.clone());
    }

    fn on_detector_complete(&self, event: &DetectorCompleteEvent) {
        self.detectors.lock().unwrap().push(event.clone());
    }

    fn on_run_complete(&self, event: &RunCompleteEvent) {
        self.complete.lock().unwrap().push(event.clone());
    }
}

// ---- Scenario A: every required check passes ----

#[test]
fn scenario_a_all_required_pass() {
    let registry = CheckRegistry::with_builtins();
    let facts = process_with(&["PresentationFramework.dll", "PresentationCore.dll"]);
    let result = engine(vec![wpf_like(&registry)])
        .detect(&facts, &Cancellation::new())
        .unwrap();

    let wpf = result.detector("WPF").unwrap();
    assert!(wpf.framework_found);
    assert_eq!(wpf.status, DetectorStatus::Completed);
    assert_eq!(wpf.count_with_status(CheckStatus::Passed), 2);
    let evidence = wpf.check_results[0].evidence.as_ref().unwrap();
    assert_eq!(evidence["module"]["fileName"], "PresentationFramework.dll");
    assert_eq!(evidence["target"], "app.exe (4312)");
}

// ---- Scenario B: one required check fails ----

#[test]
fn scenario_b_missing_module_not_found() {
    let registry = CheckRegistry::with_builtins();
    let facts = process_with(&["PresentationCore.dll"]);
    let result = engine(vec![wpf_like(&registry)])
        .detect(&facts, &Cancellation::new())
        .unwrap();

    let wpf = result.detector("WPF").unwrap();
    assert!(!wpf.framework_found);
    assert_eq!(wpf.status, DetectorStatus::Completed);
    assert_eq!(wpf.check_results[0].status, CheckStatus::Failed);
    assert_eq!(wpf.check_results[1].status, CheckStatus::Passed);
    assert!(wpf.check_results[0].evidence.is_none());
}

// ---- Scenario C: acquisition failure aborts the run ----

#[test]
fn scenario_c_acquisition_failure_is_fatal() {
    let registry = CheckRegistry::with_builtins();
    let facts = FactCollection::new()
        .with_source(FnFactSource::new(
            PROCESS_FACTS,
            "protected.exe (4)",
            FactKind::Process,
            |_| {
                Err(AcquisitionError::Inaccessible {
                    target: "protected.exe (4)".into(),
                    message: "access denied".into(),
                })
            },
        ))
        .unwrap();

    let recorder = Arc::new(Recorder::default());
    let mut events = EventDispatcher::new();
    events.register(recorder.clone());

    let err = engine(vec![wpf_like(&registry)])
        .with_events(events)
        .detect(&facts, &Cancellation::new())
        .unwrap_err();
    match err {
        DetectionError::Acquisition { fact_id, target, .. } => {
            assert_eq!(fact_id, PROCESS_FACTS);
            assert_eq!(target, "protected.exe (4)");
        }
        other => panic!("expected acquisition error, got {other:?}"),
    }
    assert!(recorder.detectors.lock().unwrap().is_empty());
    assert!(recorder.complete.lock().unwrap().is_empty());
}

// ---- Scenario D: faulting optional check ----

#[test]
fn scenario_d_faulting_optional_check() {
    let mut registry = CheckRegistry::with_builtins();
    registry.register(faulting_registration()).unwrap();
    let definition = DetectorDefinition::builder(info("Mixed"), &registry)
        .required("Core", |g| g.contains_loaded_module("core.dll"))
        .optional("Extra", |g| g.check::<ModuleArgs, ()>("Faulting", ModuleArgs::new("x.dll")))
        .build()
        .unwrap();

    let result = engine(vec![definition])
        .detect(&process_with(&["core.dll"]), &Cancellation::new())
        .unwrap();
    let mixed = result.detector("Mixed").unwrap();
    assert_eq!(mixed.status, DetectorStatus::Completed);
    assert!(mixed.framework_found);
    let extra = &mixed.check_results[1];
    assert!(!extra.required);
    assert_eq!(extra.status, CheckStatus::Error);
    assert_eq!(extra.error.as_deref(), Some("boom"));
}

#[test]
fn panicking_check_is_isolated() {
    let mut registry = CheckRegistry::with_builtins();
    registry.register(panicking_registration()).unwrap();
    let broken = DetectorDefinition::builder(info("Broken"), &registry)
        .required("Core", |g| g.check::<ModuleArgs, ()>("Panicking", ModuleArgs::new("x.dll")))
        .build()
        .unwrap();

    let facts = process_with(&["PresentationFramework.dll", "PresentationCore.dll"]);
    let result = engine(vec![broken, wpf_like(&registry)])
        .detect(&facts, &Cancellation::new())
        .unwrap();

    let broken = result.detector("Broken").unwrap();
    assert_eq!(broken.check_results[0].status, CheckStatus::Error);
    assert!(broken.check_results[0]
        .error
        .as_deref()
        .unwrap()
        .contains("check blew up"));
    assert!(!broken.framework_found);
    assert_eq!(broken.status, DetectorStatus::Completed);
    assert!(result.detector("WPF").unwrap().framework_found);
}

// ---- Optional outcomes never decide the verdict ----

#[test]
fn optional_checks_do_not_affect_found() {
    let registry = CheckRegistry::with_builtins();
    let definition = DetectorDefinition::builder(info("Opt"), &registry)
        .required("Core", |g| g.contains_loaded_module("core.dll"))
        .optional("Extra", |g| g.contains_loaded_module("missing.dll"))
        .build()
        .unwrap();
    let engine = engine(vec![definition]);

    let found = engine
        .detect(&process_with(&["core.dll"]), &Cancellation::new())
        .unwrap();
    assert!(found.detectors[0].framework_found);
    assert_eq!(found.detectors[0].check_results[1].status, CheckStatus::Failed);

    let not_found = engine
        .detect(&process_with(&["missing.dll"]), &Cancellation::new())
        .unwrap();
    assert!(!not_found.detectors[0].framework_found);
    assert_eq!(not_found.detectors[0].check_results[1].status, CheckStatus::Passed);
}

// ---- Any-of sets ----

#[test]
fn any_of_set_needs_one_full_alternative() {
    let registry = CheckRegistry::with_builtins();
    let definition = DetectorDefinition::builder(info("Runtime"), &registry)
        .required_any_of("Runtime", |alts| {
            alts.alternative("Desktop", |g| {
                g.contains_loaded_module("clr.dll")
                    .contains_loaded_module("clrjit.dll")
            })
            .alternative("Core", |g| g.contains_loaded_module("coreclr.dll"))
        })
        .build()
        .unwrap();
    let engine = engine(vec![definition]);
    let cancel = Cancellation::new();

    let partial = engine.detect(&process_with(&["clr.dll"]), &cancel).unwrap();
    assert!(!partial.detectors[0].framework_found);

    let desktop = engine
        .detect(&process_with(&["clr.dll", "clrjit.dll"]), &cancel)
        .unwrap();
    assert!(desktop.detectors[0].framework_found);
    assert!(desktop.detectors[0]
        .check_results
        .iter()
        .all(|c| c.any_of.as_deref() == Some("Runtime")));

    let core = engine.detect(&process_with(&["coreclr.dll"]), &cancel).unwrap();
    assert!(core.detectors[0].framework_found);
}

// ---- Cancellation ----

#[test]
fn cancellation_before_run_cancels_every_detector() {
    let registry = CheckRegistry::with_builtins();
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let facts = FactCollection::new()
        .with_source(FnFactSource::new(
            PROCESS_FACTS,
            "app.exe",
            FactKind::Process,
            move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(FactPayload::Process(ProcessFacts::new("app.exe")))
            },
        ))
        .unwrap();

    let cancel = Cancellation::new();
    cancel.cancel();
    let result = engine(vec![wpf_like(&registry)]).detect(&facts, &cancel).unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 0, "loads are skipped");
    assert!(result.is_canceled());
    for detector in &result.detectors {
        assert_eq!(detector.status, DetectorStatus::Canceled);
        assert!(!detector.framework_found);
        assert!(detector
            .check_results
            .iter()
            .all(|c| c.status == CheckStatus::NotStarted));
    }
    assert!(result.data_sources.is_empty());
}

#[test]
fn cancellation_mid_run_skips_remaining_checks() {
    let mut registry = CheckRegistry::with_builtins();
    let cancel = Cancellation::new();
    let trigger = cancel.clone();
    registry
        .register(CheckRegistration::<ModuleArgs, ()>::new(
            "CancelsRun",
            "Cancels the run at {}",
            [PROCESS_FACTS],
            move |_, _, _| {
                trigger.cancel();
                Ok(CheckOutcome::Failed)
            },
        ))
        .unwrap();

    let definition = DetectorDefinition::builder(info("Stops"), &registry)
        .required("First", |g| g.check::<ModuleArgs, ()>("CancelsRun", ModuleArgs::new("a.dll")))
        .required("Second", |g| g.contains_loaded_module("a.dll"))
        .optional("Third", |g| g.contains_loaded_module("a.dll"))
        .build()
        .unwrap();

    let result = engine(vec![definition])
        .detect(&process_with(&["a.dll"]), &cancel)
        .unwrap();
    let stops = &result.detectors[0];
    assert_eq!(stops.status, DetectorStatus::Canceled);
    assert!(!stops.framework_found);
    // Failed after cancellation fired is reported as canceled.
    assert_eq!(stops.check_results[0].status, CheckStatus::Canceled);
    assert_eq!(stops.check_results[1].status, CheckStatus::NotStarted);
    assert_eq!(stops.check_results[2].status, CheckStatus::NotStarted);
    assert_eq!(stops.check_results.len(), 3);
}

// ---- Facts ----

#[test]
fn facts_are_loaded_once_across_runs() {
    let registry = CheckRegistry::with_builtins();
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let facts = FactCollection::new()
        .with_source(FnFactSource::new(
            PROCESS_FACTS,
            "app.exe",
            FactKind::Process,
            move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(FactPayload::Process(
                    ProcessFacts::new("app.exe").with_loaded_modules(["PresentationCore.dll"]),
                ))
            },
        ))
        .unwrap();

    let engine = engine(vec![wpf_like(&registry)]);
    let first = engine.detect(&facts, &Cancellation::new()).unwrap();
    let second = engine.detect(&facts, &Cancellation::new()).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(first.data_sources, second.data_sources);
    assert_eq!(first.detectors, second.detectors);
}

#[test]
fn load_cancelled_mid_acquisition_is_retried_after_reset() {
    let registry = CheckRegistry::with_builtins();
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let facts = FactCollection::new()
        .with_source(FnFactSource::new(
            PROCESS_FACTS,
            "app (1)",
            FactKind::Process,
            move |cancel: &Cancellation| {
                if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                    cancel.cancel();
                    return Err(AcquisitionError::Cancelled {
                        target: "app (1)".into(),
                    });
                }
                Ok(FactPayload::Process(
                    ProcessFacts::new("app.exe").with_loaded_modules(["PresentationCore.dll"]),
                ))
            },
        ))
        .unwrap();

    let engine = engine(vec![wpf_like(&registry)]);
    let cancel = Cancellation::new();
    let first = engine.detect(&facts, &cancel).unwrap();
    assert_eq!(first.detectors[0].status, DetectorStatus::Canceled);
    assert!(first.data_sources.is_empty());

    cancel.reset();
    let second = engine.detect(&facts, &cancel).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(second.detectors[0].status, DetectorStatus::Completed);
    assert_eq!(second.data_sources[PROCESS_FACTS].len(), 1);
}

#[test]
fn missing_facts_fail_gracefully() {
    let registry = CheckRegistry::with_builtins();
    let facts = FactCollection::new()
        .with_source(StaticFacts::custom("other", "x", serde_json::json!({})))
        .unwrap();
    let result = engine(vec![wpf_like(&registry)])
        .detect(&facts, &Cancellation::new())
        .unwrap();
    let wpf = &result.detectors[0];
    assert_eq!(wpf.status, DetectorStatus::Completed);
    assert!(wpf.check_results.iter().all(|c| c.status == CheckStatus::Failed
        && c.error.as_deref() == Some(fwdetect_analysis::checks::FACTS_UNAVAILABLE)));
}

#[test]
fn multiple_snapshots_are_searched() {
    let registry = CheckRegistry::with_builtins();
    let facts = FactCollection::new()
        .with_source(StaticFacts::process(
            "host.exe (1)",
            ProcessFacts::new("host.exe").with_loaded_modules(["PresentationFramework.dll"]),
        ))
        .unwrap()
        .with_source(StaticFacts::process(
            "child.exe (2)",
            ProcessFacts::new("child.exe").with_loaded_modules(["PresentationCore.dll"]),
        ))
        .unwrap();

    let result = engine(vec![wpf_like(&registry)])
        .detect(&facts, &Cancellation::new())
        .unwrap();
    let wpf = &result.detectors[0];
    assert!(wpf.framework_found);
    assert_eq!(wpf.check_results[1].evidence.as_ref().unwrap()["target"], "child.exe (2)");
    assert_eq!(result.data_sources[PROCESS_FACTS].len(), 2);
}

// ---- Ordering and events ----

#[test]
fn results_keep_detector_order_and_events_fire() {
    let registry = CheckRegistry::with_builtins();
    let definitions: Vec<_> = (0..16)
        .map(|i| {
            DetectorDefinition::builder(info(&format!("D{i}")), &registry)
                .required("Core", |g| g.contains_loaded_module(&format!("m{i}.dll")))
                .build()
                .unwrap()
        })
        .collect();

    let recorder = Arc::new(Recorder::default());
    let mut events = EventDispatcher::new();
    events.register(recorder.clone());

    let result = engine(definitions)
        .with_events(events)
        .detect(&process_with(&["m3.dll", "m7.dll"]), &Cancellation::new())
        .unwrap();

    let names: Vec<_> = result.detectors.iter().map(|d| d.detector_name.clone()).collect();
    let expected: Vec<_> = (0..16).map(|i| format!("D{i}")).collect();
    assert_eq!(names, expected);
    let found: Vec<_> = result.found().map(|d| d.detector_name.as_str()).collect();
    assert_eq!(found, vec!["D3", "D7"]);

    assert_eq!(recorder.detectors.lock().unwrap().len(), 16);
    let complete = recorder.complete.lock().unwrap();
    assert_eq!(complete.len(), 1);
    assert_eq!(complete[0].frameworks_found, 2);
    assert!(!complete[0].canceled);

    let progress = recorder.progress.lock().unwrap();
    assert!(!progress.is_empty());
    assert!(progress.iter().all(|p| p.total_checks == 16 && p.percent <= 100));
    assert!(progress.iter().any(|p| p.percent == 100));
}

#[test]
fn progress_events_can_be_disabled() {
    let registry = CheckRegistry::with_builtins();
    let config = EngineConfig {
        threads: Some(2),
        progress_events: Some(false),
    };
    let recorder = Arc::new(Recorder::default());
    let mut events = EventDispatcher::new();
    events.register(recorder.clone());

    DetectionEngine::new(vec![wpf_like(&registry)], &config)
        .unwrap()
        .with_events(events)
        .detect(&process_with(&["PresentationCore.dll"]), &Cancellation::new())
        .unwrap();
    assert!(recorder.progress.lock().unwrap().is_empty());
    assert_eq!(recorder.detectors.lock().unwrap().len(), 1);
}

#[test]
fn configured_thread_count_is_used() {
    let config = EngineConfig {
        threads: Some(3),
        progress_events: None,
    };
    let engine = DetectionEngine::new(Vec::new(), &config).unwrap();
    assert_eq!(engine.thread_count(), 3);

    let result = engine
        .detect(&FactCollection::new(), &Cancellation::new())
        .unwrap();
    assert!(result.detectors.is_empty());
    assert_eq!(result.tool_name, fwdetect_core::TOOL_NAME);
}
