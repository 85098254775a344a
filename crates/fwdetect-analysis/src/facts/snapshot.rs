//! Fact sources and the write-once snapshots that cache them.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Mutex, OnceLock, PoisonError};

use fwdetect_core::errors::AcquisitionError;
use fwdetect_core::Cancellation;
use serde_json::Value;

use super::types::{
    ExecutableFacts, FactKind, FactPayload, ProcessFacts, EXECUTABLE_FACTS, PROCESS_FACTS,
};

/// Producer of one snapshot's payload.
///
/// Implemented by the target-acquisition layer. `acquire` is called at most
/// once per snapshot, plus once more after a load cut short by cancellation.
/// It may poll `cancel` while it works.
pub trait FactSource: Send + Sync {
    fn fact_id(&self) -> &str;

    /// Label unique per snapshot instance, e.g. `"notepad.exe (4312)"`.
    fn target(&self) -> &str;

    fn kind(&self) -> FactKind;

    fn acquire(&self, cancel: &Cancellation) -> Result<FactPayload, AcquisitionError>;
}

/// A payload that was assembled before the run started.
#[derive(Debug, Clone)]
pub struct StaticFacts {
    fact_id: String,
    target: String,
    payload: FactPayload,
}

impl StaticFacts {
    pub fn process(target: impl Into<String>, facts: ProcessFacts) -> Self {
        Self {
            fact_id: PROCESS_FACTS.to_string(),
            target: target.into(),
            payload: FactPayload::Process(facts),
        }
    }

    pub fn executable(target: impl Into<String>, facts: ExecutableFacts) -> Self {
        Self {
            fact_id: EXECUTABLE_FACTS.to_string(),
            target: target.into(),
            payload: FactPayload::Executable(facts),
        }
    }

    pub fn custom(fact_id: impl Into<String>, target: impl Into<String>, value: Value) -> Self {
        Self {
            fact_id: fact_id.into(),
            target: target.into(),
            payload: FactPayload::Custom(value),
        }
    }
}

impl FactSource for StaticFacts {
    fn fact_id(&self) -> &str {
        &self.fact_id
    }

    fn target(&self) -> &str {
        &self.target
    }

    fn kind(&self) -> FactKind {
        self.payload.kind()
    }

    fn acquire(&self, _cancel: &Cancellation) -> Result<FactPayload, AcquisitionError> {
        Ok(self.payload.clone())
    }
}

/// Closure-backed source.
pub struct FnFactSource<F> {
    fact_id: String,
    target: String,
    kind: FactKind,
    acquire: F,
}

impl<F> FnFactSource<F>
where
    F: Fn(&Cancellation) -> Result<FactPayload, AcquisitionError> + Send + Sync,
{
    pub fn new(
        fact_id: impl Into<String>,
        target: impl Into<String>,
        kind: FactKind,
        acquire: F,
    ) -> Self {
        Self {
            fact_id: fact_id.into(),
            target: target.into(),
            kind,
            acquire,
        }
    }
}

impl<F> FactSource for FnFactSource<F>
where
    F: Fn(&Cancellation) -> Result<FactPayload, AcquisitionError> + Send + Sync,
{
    fn fact_id(&self) -> &str {
        &self.fact_id
    }

    fn target(&self) -> &str {
        &self.target
    }

    fn kind(&self) -> FactKind {
        self.kind
    }

    fn acquire(&self, cancel: &Cancellation) -> Result<FactPayload, AcquisitionError> {
        (self.acquire)(cancel)
    }
}

impl<F> std::fmt::Debug for FnFactSource<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnFactSource")
            .field("fact_id", &self.fact_id)
            .field("target", &self.target)
            .field("kind", &self.kind)
            .finish()
    }
}

/// Load state of a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Unloaded,
    Loaded,
    Failed,
}

/// One cached fact bundle about one inspection target.
///
/// The payload is written once. After a failed acquisition the snapshot stays
/// failed; `load` never calls the source again. A load that errors while
/// cancellation is raised is not recorded, so a later run can retry it.
pub struct FactSnapshot {
    fact_id: String,
    target: String,
    kind: FactKind,
    source: Option<Box<dyn FactSource>>,
    cell: OnceLock<Result<FactPayload, AcquisitionError>>,
    loading: Mutex<()>,
}

impl FactSnapshot {
    pub fn new(source: impl FactSource + 'static) -> Self {
        Self::from_boxed(Box::new(source))
    }

    pub fn from_boxed(source: Box<dyn FactSource>) -> Self {
        Self {
            fact_id: source.fact_id().to_string(),
            target: source.target().to_string(),
            kind: source.kind(),
            source: Some(source),
            cell: OnceLock::new(),
            loading: Mutex::new(()),
        }
    }

    /// A snapshot that is already loaded, used for replaying recorded runs.
    pub fn preloaded(
        fact_id: impl Into<String>,
        target: impl Into<String>,
        payload: FactPayload,
    ) -> Self {
        let cell = OnceLock::new();
        let kind = payload.kind();
        let _ = cell.set(Ok(payload));
        Self {
            fact_id: fact_id.into(),
            target: target.into(),
            kind,
            source: None,
            cell,
            loading: Mutex::new(()),
        }
    }

    pub fn fact_id(&self) -> &str {
        &self.fact_id
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn kind(&self) -> FactKind {
        self.kind
    }

    /// Populate the snapshot. Returns whether a payload is available.
    ///
    /// If cancellation is already raised and nothing was loaded yet, the
    /// source is not called and the snapshot stays `Unloaded`. The same holds
    /// when the source fails after cancellation was raised mid-load.
    pub fn load(&self, cancel: &Cancellation) -> bool {
        if let Some(result) = self.cell.get() {
            return result.is_ok();
        }
        if cancel.is_cancelled() {
            return false;
        }

        let _guard = self.loading.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(result) = self.cell.get() {
            return result.is_ok();
        }
        let result = self.acquire(cancel);
        if result.is_err() && cancel.is_cancelled() {
            tracing::debug!(
                fact_id = %self.fact_id,
                target = %self.target,
                "fact load interrupted by cancellation"
            );
            return false;
        }
        let loaded = result.is_ok();
        // Guarded by `loading`, so the cell is still empty here.
        let _ = self.cell.set(result);
        loaded
    }

    fn acquire(&self, cancel: &Cancellation) -> Result<FactPayload, AcquisitionError> {
        let Some(source) = self.source.as_ref() else {
            return Err(AcquisitionError::ReadFailed {
                target: self.target.clone(),
                message: "snapshot has no fact source".to_string(),
            });
        };

        let payload = catch_unwind(AssertUnwindSafe(|| source.acquire(cancel))).unwrap_or_else(
            |panic| {
                Err(AcquisitionError::ReadFailed {
                    target: self.target.clone(),
                    message: format!(
                        "fact source panicked: {}",
                        crate::panic_message(panic.as_ref())
                    ),
                })
            },
        )?;

        if payload.kind() != self.kind {
            return Err(AcquisitionError::ReadFailed {
                target: self.target.clone(),
                message: format!(
                    "expected {} facts, source produced {} facts",
                    self.kind.name(),
                    payload.kind().name()
                ),
            });
        }
        Ok(payload)
    }

    pub fn state(&self) -> LoadState {
        match self.cell.get() {
            None => LoadState::Unloaded,
            Some(Ok(_)) => LoadState::Loaded,
            Some(Err(_)) => LoadState::Failed,
        }
    }

    /// The payload, if loaded.
    pub fn payload(&self) -> Option<&FactPayload> {
        self.cell.get().and_then(|r| r.as_ref().ok())
    }

    pub fn load_error(&self) -> Option<&AcquisitionError> {
        self.cell.get().and_then(|r| r.as_ref().err())
    }
}

impl std::fmt::Debug for FactSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FactSnapshot")
            .field("fact_id", &self.fact_id)
            .field("target", &self.target)
            .field("kind", &self.kind)
            .field("state", &self.state())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;

    #[test]
    fn load_is_idempotent() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let snapshot = FactSnapshot::new(FnFactSource::new(
            PROCESS_FACTS,
            "app.exe (1)",
            FactKind::Process,
            move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(FactPayload::Process(ProcessFacts::new("app.exe")))
            },
        ));

        assert_eq!(snapshot.state(), LoadState::Unloaded);
        assert!(snapshot.load(&Cancellation::new()));
        let first = snapshot.payload().cloned();
        assert!(snapshot.load(&Cancellation::new()));
        assert_eq!(snapshot.payload().cloned(), first);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn failed_load_is_not_retried() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let snapshot = FactSnapshot::new(FnFactSource::new(
            PROCESS_FACTS,
            "gone.exe",
            FactKind::Process,
            move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(AcquisitionError::Inaccessible {
                    target: "gone.exe".into(),
                    message: "access denied".into(),
                })
            },
        ));

        assert!(!snapshot.load(&Cancellation::new()));
        assert!(!snapshot.load(&Cancellation::new()));
        assert_eq!(snapshot.state(), LoadState::Failed);
        assert!(snapshot.payload().is_none());
        assert!(snapshot.load_error().is_some());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn cancelled_before_load_stays_unloaded() {
        let cancel = Cancellation::new();
        cancel.cancel();
        let snapshot = FactSnapshot::new(StaticFacts::process("a", ProcessFacts::new("a.exe")));
        assert!(!snapshot.load(&cancel));
        assert_eq!(snapshot.state(), LoadState::Unloaded);
    }

    #[test]
    fn interrupted_load_is_not_recorded() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let snapshot = FactSnapshot::new(FnFactSource::new(
            PROCESS_FACTS,
            "slow.exe (9)",
            FactKind::Process,
            move |cancel: &Cancellation| {
                if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                    cancel.cancel();
                    return Err(AcquisitionError::Cancelled {
                        target: "slow.exe (9)".into(),
                    });
                }
                Ok(FactPayload::Process(ProcessFacts::new("slow.exe")))
            },
        ));

        let cancel = Cancellation::new();
        assert!(!snapshot.load(&cancel));
        assert_eq!(snapshot.state(), LoadState::Unloaded);
        assert!(snapshot.load_error().is_none());

        cancel.reset();
        assert!(snapshot.load(&cancel));
        assert_eq!(snapshot.state(), LoadState::Loaded);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn kind_mismatch_fails_the_load() {
        let snapshot = FactSnapshot::new(FnFactSource::new(
            PROCESS_FACTS,
            "odd",
            FactKind::Process,
            |_| Ok(FactPayload::Custom(serde_json::json!({}))),
        ));
        assert!(!snapshot.load(&Cancellation::new()));
        assert!(matches!(
            snapshot.load_error(),
            Some(AcquisitionError::ReadFailed { .. })
        ));
    }

    #[test]
    fn panicking_source_becomes_read_failure() {
        let snapshot = FactSnapshot::new(FnFactSource::new(
            "custom",
            "boom",
            FactKind::Custom,
            |_| panic!("source exploded"),
        ));
        assert!(!snapshot.load(&Cancellation::new()));
        let err = snapshot.load_error().map(|e| e.to_string()).unwrap_or_default();
        assert!(err.contains("source exploded"), "{err}");
    }
}
