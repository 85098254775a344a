//! Progress: checks started out of checks declared, as an integer percentage.

use std::sync::atomic::{AtomicUsize, Ordering};

use fwdetect_core::events::types::ProgressEvent;
use fwdetect_core::EventDispatcher;

pub(crate) struct ProgressTracker<'a> {
    events: Option<&'a EventDispatcher>,
    total: usize,
    started: AtomicUsize,
    last_percent: AtomicUsize,
}

impl<'a> ProgressTracker<'a> {
    /// `events` is `None` when progress events are turned off.
    pub(crate) fn new(events: Option<&'a EventDispatcher>, total: usize) -> Self {
        Self {
            events,
            total,
            started: AtomicUsize::new(0),
            last_percent: AtomicUsize::new(0),
        }
    }

    /// Record one started check; emits only when the percentage increases.
    pub(crate) fn check_started(&self) {
        let started = self.started.fetch_add(1, Ordering::Relaxed) + 1;
        let Some(events) = self.events else {
            return;
        };
        if self.total == 0 {
            return;
        }
        let percent = (started.min(self.total) * 100) / self.total;
        if self.last_percent.fetch_max(percent, Ordering::Relaxed) < percent {
            events.emit_progress(&ProgressEvent {
                checks_started: started,
                total_checks: self.total,
                percent: percent as u8,
            });
        }
    }

    pub(crate) fn started(&self) -> usize {
        self.started.load(Ordering::Relaxed)
    }
}
