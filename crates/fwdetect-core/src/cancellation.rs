//! Cooperative cancellation shared by fact loaders, checks, and the engine.
//!
//! A single flag is threaded through every load and check call. Nothing is
//! interrupted preemptively: workers poll `is_cancelled()` at their own
//! checkpoints and stop starting new work once it flips.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cloneable handle to a shared cancellation flag.
///
/// Clones observe the same flag, so the caller keeps one handle and passes
/// another into the engine.
#[derive(Debug, Clone, Default)]
pub struct Cancellation {
    flag: Arc<AtomicBool>,
}

impl Cancellation {
    /// Create a new, un-raised cancellation handle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the cancellation signal. Idempotent.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }

    /// Clear the flag so the handle can drive another run.
    pub fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}
