//! Event payloads emitted during a detection run.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunStartedEvent {
    pub detector_count: usize,
    pub snapshot_count: usize,
    pub total_checks: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactsLoadedEvent {
    pub loaded: usize,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactLoadFailedEvent {
    pub fact_id: String,
    pub target: String,
    pub message: String,
}

/// Coarse progress: checks started out of checks declared. Advisory only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEvent {
    pub checks_started: usize,
    pub total_checks: usize,
    pub percent: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectorCompleteEvent {
    pub detector: String,
    pub framework_id: String,
    pub framework_found: bool,
    pub canceled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunCompleteEvent {
    pub detectors: usize,
    pub frameworks_found: usize,
    pub canceled: bool,
    pub duration_ms: u64,
}
