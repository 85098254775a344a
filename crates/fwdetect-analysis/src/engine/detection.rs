//! DetectionEngine: load facts, evaluate detectors concurrently, aggregate.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Instant;

use fwdetect_core::config::EngineConfig;
use fwdetect_core::errors::{AcquisitionError, DetectionError, DetectionResult};
use fwdetect_core::events::types::*;
use fwdetect_core::{Cancellation, EventDispatcher};
use rayon::prelude::*;

use super::progress::ProgressTracker;
use crate::checks::CheckRegistry;
use crate::detectors::{DetectorDefinition, DetectorRegistry};
use crate::facts::{FactCollection, FactSnapshot, LoadState};
use crate::results::{CheckResult, CheckStatus, DetectorResult, DetectorStatus, RunResult};

/// Runs a fixed set of detector definitions against fact collections.
///
/// A run has two phases separated by a hard barrier: every snapshot is loaded
/// on the worker pool, then every detector is evaluated on the pool. Within a
/// detector, required checks run before optional ones, one at a time, with a
/// cancellation checkpoint before each.
pub struct DetectionEngine {
    definitions: Vec<DetectorDefinition>,
    pool: rayon::ThreadPool,
    events: EventDispatcher,
    progress_events: bool,
}

impl DetectionEngine {
    pub fn new(
        definitions: Vec<DetectorDefinition>,
        config: &EngineConfig,
    ) -> DetectionResult<Self> {
        let threads = config.effective_threads();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("fwdetect-worker-{i}"))
            .build()
            .map_err(|e| DetectionError::ThreadPool {
                message: e.to_string(),
            })?;

        Ok(Self {
            definitions,
            pool,
            events: EventDispatcher::new(),
            progress_events: config.effective_progress_events(),
        })
    }

    /// Build the definitions of every enabled detector in `detectors`.
    pub fn from_registry(
        detectors: &DetectorRegistry,
        checks: &CheckRegistry,
        config: &EngineConfig,
    ) -> DetectionResult<Self> {
        let definitions = detectors.build_definitions(checks)?;
        Self::new(definitions, config)
    }

    pub fn with_events(mut self, events: EventDispatcher) -> Self {
        self.events = events;
        self
    }

    pub fn definitions(&self) -> &[DetectorDefinition] {
        &self.definitions
    }

    pub fn thread_count(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Run every detector against `facts`.
    ///
    /// A snapshot that fails to load aborts the run. Cancellation never does:
    /// the run returns with the affected detectors marked canceled.
    pub fn detect(
        &self,
        facts: &FactCollection,
        cancel: &Cancellation,
    ) -> DetectionResult<RunResult> {
        let run_start = Instant::now();
        let total_checks: usize = self
            .definitions
            .iter()
            .map(DetectorDefinition::total_check_count)
            .sum();

        tracing::info!(
            detectors = self.definitions.len(),
            snapshots = facts.len(),
            total_checks,
            threads = self.thread_count(),
            "detection run started"
        );
        self.events.emit_run_started(&RunStartedEvent {
            detector_count: self.definitions.len(),
            snapshot_count: facts.len(),
            total_checks,
        });

        // Phase 1: fact acquisition
        let load_start = Instant::now();
        self.load_facts(facts, cancel)?;
        let loaded = facts
            .snapshots()
            .filter(|s| s.state() == LoadState::Loaded)
            .count();
        let load_ms = load_start.elapsed().as_millis() as u64;
        tracing::debug!(loaded, duration_ms = load_ms, "facts loaded");
        self.events.emit_facts_loaded(&FactsLoadedEvent {
            loaded,
            duration_ms: load_ms,
        });

        // Phase 2: evaluation
        let progress = ProgressTracker::new(
            self.progress_events.then_some(&self.events),
            total_checks,
        );
        let detectors: Vec<DetectorResult> = self.pool.install(|| {
            self.definitions
                .par_iter()
                .map(|definition| self.run_detector(definition, facts, cancel, &progress))
                .collect()
        });

        // Phase 3: result assembly
        let data_sources = facts.recorded_payloads()?;
        let result = RunResult::new(data_sources, detectors);

        let frameworks_found = result.found().count();
        let canceled = result.is_canceled();
        let duration_ms = run_start.elapsed().as_millis() as u64;
        tracing::info!(
            frameworks_found,
            checks_started = progress.started(),
            canceled,
            duration_ms,
            "detection run complete"
        );
        self.events.emit_run_complete(&RunCompleteEvent {
            detectors: result.detectors.len(),
            frameworks_found,
            canceled,
            duration_ms,
        });
        Ok(result)
    }

    fn load_facts(&self, facts: &FactCollection, cancel: &Cancellation) -> DetectionResult<()> {
        let snapshots: Vec<&FactSnapshot> = facts.snapshots().collect();
        self.pool.install(|| {
            snapshots.par_iter().for_each(|snapshot| {
                snapshot.load(cancel);
            })
        });

        let mut first_failure = None;
        for snapshot in &snapshots {
            let Some(err) = snapshot.load_error() else {
                continue;
            };
            if matches!(err, AcquisitionError::Cancelled { .. }) && cancel.is_cancelled() {
                continue;
            }
            tracing::error!(
                fact_id = snapshot.fact_id(),
                target = snapshot.target(),
                error = %err,
                "fact acquisition failed"
            );
            self.events.emit_fact_load_failed(&FactLoadFailedEvent {
                fact_id: snapshot.fact_id().to_string(),
                target: snapshot.target().to_string(),
                message: err.to_string(),
            });
            if first_failure.is_none() {
                first_failure = Some(DetectionError::Acquisition {
                    fact_id: snapshot.fact_id().to_string(),
                    target: snapshot.target().to_string(),
                    source: err.clone(),
                });
            }
        }

        match first_failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn run_detector(
        &self,
        definition: &DetectorDefinition,
        facts: &FactCollection,
        cancel: &Cancellation,
        progress: &ProgressTracker<'_>,
    ) -> DetectorResult {
        let plan = definition.planned_checks();
        let mut results = Vec::with_capacity(plan.len());

        for planned in &plan {
            if cancel.is_cancelled() {
                break;
            }
            progress.check_started();

            let check = planned.check;
            let result = catch_unwind(AssertUnwindSafe(|| check.execute(facts, cancel)))
                .unwrap_or_else(|panic| {
                    let message = crate::panic_message(panic.as_ref());
                    tracing::warn!(check = check.name(), error = %message, "check panicked");
                    let mut result = CheckResult::new(check.name(), check.description());
                    result.status = CheckStatus::Error;
                    result.error = Some(format!("check panicked: {message}"));
                    result
                });
            results.push(result.placed(planned.group_name, planned.any_of, planned.required));
        }

        // Checks skipped by cancellation stay not started.
        for planned in &plan[results.len()..] {
            results.push(
                CheckResult::new(planned.check.name(), planned.check.description()).placed(
                    planned.group_name,
                    planned.any_of,
                    planned.required,
                ),
            );
        }

        let result = DetectorResult::from_checks(definition.info(), results);
        tracing::debug!(
            detector = %result.detector_name,
            framework_found = result.framework_found,
            status = ?result.status,
            "detector complete"
        );
        self.events.emit_detector_complete(&DetectorCompleteEvent {
            detector: result.detector_name.clone(),
            framework_id: result.framework_id.clone(),
            framework_found: result.framework_found,
            canceled: result.status == DetectorStatus::Canceled,
        });
        result
    }
}

impl std::fmt::Debug for DetectionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DetectionEngine")
            .field("definitions", &self.definitions.len())
            .field("threads", &self.pool.current_num_threads())
            .field("events", &self.events)
            .finish()
    }
}
