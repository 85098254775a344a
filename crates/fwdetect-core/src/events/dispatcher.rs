//! Fan-out dispatcher. A panicking handler is logged and skipped; the
//! remaining handlers still receive the event.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use super::handler::DetectionEventHandler;
use super::types::*;

#[derive(Default, Clone)]
pub struct EventDispatcher {
    handlers: Vec<Arc<dyn DetectionEventHandler>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, handler: Arc<dyn DetectionEventHandler>) {
        self.handlers.push(handler);
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    fn dispatch(&self, event_name: &'static str, f: impl Fn(&dyn DetectionEventHandler)) {
        for handler in &self.handlers {
            let result = catch_unwind(AssertUnwindSafe(|| f(handler.as_ref())));
            if result.is_err() {
                tracing::error!(event = event_name, "event handler panicked");
            }
        }
    }

    pub fn emit_run_started(&self, event: &RunStartedEvent) {
        self.dispatch("run_started", |h| h.on_run_started(event));
    }

    pub fn emit_facts_loaded(&self, event: &FactsLoadedEvent) {
        self.dispatch("facts_loaded", |h| h.on_facts_loaded(event));
    }

    pub fn emit_fact_load_failed(&self, event: &FactLoadFailedEvent) {
        self.dispatch("fact_load_failed", |h| h.on_fact_load_failed(event));
    }

    pub fn emit_progress(&self, event: &ProgressEvent) {
        self.dispatch("progress", |h| h.on_progress(event));
    }

    pub fn emit_detector_complete(&self, event: &DetectorCompleteEvent) {
        self.dispatch("detector_complete", |h| h.on_detector_complete(event));
    }

    pub fn emit_run_complete(&self, event: &RunCompleteEvent) {
        self.dispatch("run_complete", |h| h.on_run_complete(event));
    }
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("handlers", &self.handlers.len())
            .finish()
    }
}
