//! Event handler trait. Every method defaults to a no-op so handlers only
//! implement what they care about.

use super::types::*;

pub trait DetectionEventHandler: Send + Sync {
    fn on_run_started(&self, _event: &RunStartedEvent) {}
    fn on_facts_loaded(&self, _event: &FactsLoadedEvent) {}
    fn on_fact_load_failed(&self, _event: &FactLoadFailedEvent) {}
    fn on_progress(&self, _event: &ProgressEvent) {}
    fn on_detector_complete(&self, _event: &DetectorCompleteEvent) {}
    fn on_run_complete(&self, _event: &RunCompleteEvent) {}
}

/// Handler that ignores everything.
pub struct NoOpHandler;

impl DetectionEventHandler for NoOpHandler {}
