//! FactCollection: fact id → ordered snapshots.

use std::collections::BTreeMap;

use fwdetect_core::errors::FactError;
use rustc_hash::FxHashMap;
use serde_json::Value;

use super::snapshot::{FactSnapshot, FactSource, LoadState};
use super::types::{
    ExecutableFacts, FactKind, FactPayload, ProcessFacts, EXECUTABLE_FACTS, PROCESS_FACTS,
};

/// All snapshots for one inspection run.
///
/// Written during setup and the load phase, read-only afterwards. Lookups of
/// an unknown fact id yield an empty slice.
#[derive(Debug, Default)]
pub struct FactCollection {
    snapshots: FxHashMap<String, Vec<FactSnapshot>>,
    /// Fact ids in first-insertion order, for stable iteration.
    order: Vec<String>,
}

impl FactCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a source. Rejects a repeated (fact id, target) pair and a
    /// kind that conflicts with snapshots already under the same id.
    pub fn insert(&mut self, source: impl FactSource + 'static) -> Result<(), FactError> {
        self.insert_snapshot(FactSnapshot::new(source))
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with_source(mut self, source: impl FactSource + 'static) -> Result<Self, FactError> {
        self.insert(source)?;
        Ok(self)
    }

    pub fn insert_snapshot(&mut self, snapshot: FactSnapshot) -> Result<(), FactError> {
        if let Some(existing) = self.snapshots.get(snapshot.fact_id()) {
            if let Some(first) = existing.first() {
                if first.kind() != snapshot.kind() {
                    return Err(FactError::IncompatibleKind {
                        fact_id: snapshot.fact_id().to_string(),
                        existing: first.kind().name().to_string(),
                        incoming: snapshot.kind().name().to_string(),
                    });
                }
            }
            if existing.iter().any(|s| s.target() == snapshot.target()) {
                return Err(FactError::DuplicateSnapshot {
                    fact_id: snapshot.fact_id().to_string(),
                    target: snapshot.target().to_string(),
                });
            }
        }

        let fact_id = snapshot.fact_id().to_string();
        if !self.snapshots.contains_key(&fact_id) {
            self.order.push(fact_id.clone());
        }
        self.snapshots.entry(fact_id).or_default().push(snapshot);
        Ok(())
    }

    pub fn get(&self, fact_id: &str) -> &[FactSnapshot] {
        self.snapshots.get(fact_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every snapshot, grouped by fact id in insertion order.
    pub fn snapshots(&self) -> impl Iterator<Item = &FactSnapshot> {
        self.order.iter().flat_map(move |id| self.get(id).iter())
    }

    pub fn fact_ids(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Loaded payloads under `fact_id`; unloaded and failed snapshots are skipped.
    pub fn payloads<'a>(&'a self, fact_id: &str) -> impl Iterator<Item = &'a FactPayload> + 'a {
        self.get(fact_id).iter().filter_map(FactSnapshot::payload)
    }

    pub fn process_facts(&self) -> impl Iterator<Item = &ProcessFacts> {
        self.payloads(PROCESS_FACTS).filter_map(|p| match p {
            FactPayload::Process(facts) => Some(facts),
            _ => None,
        })
    }

    pub fn executable_facts(&self) -> impl Iterator<Item = &ExecutableFacts> {
        self.payloads(EXECUTABLE_FACTS).filter_map(|p| match p {
            FactPayload::Executable(facts) => Some(facts),
            _ => None,
        })
    }

    /// Whether at least one snapshot under `fact_id` has a payload.
    pub fn has_loaded(&self, fact_id: &str) -> bool {
        self.get(fact_id)
            .iter()
            .any(|s| s.state() == LoadState::Loaded)
    }

    /// Total number of snapshots.
    pub fn len(&self) -> usize {
        self.snapshots.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Raw loaded payloads keyed by fact id, as recorded in a run result.
    pub fn recorded_payloads(&self) -> Result<BTreeMap<String, Vec<Value>>, serde_json::Error> {
        let mut recorded = BTreeMap::new();
        for fact_id in &self.order {
            let values = self
                .payloads(fact_id)
                .map(FactPayload::to_value)
                .collect::<Result<Vec<_>, _>>()?;
            if !values.is_empty() {
                recorded.insert(fact_id.clone(), values);
            }
        }
        Ok(recorded)
    }

    /// Rebuild a collection of pre-loaded snapshots from recorded payloads.
    ///
    /// Well-known fact ids are decoded into their typed payloads; every other
    /// id becomes custom facts. Targets are labelled `"<factId>[<index>]"`.
    pub fn from_recorded(recorded: &BTreeMap<String, Vec<Value>>) -> Result<Self, FactError> {
        let mut collection = Self::new();
        for (fact_id, values) in recorded {
            let kind = FactKind::for_fact_id(fact_id);
            for (index, value) in values.iter().enumerate() {
                let payload = FactPayload::from_value(kind, value.clone()).map_err(|e| {
                    FactError::MalformedPayload {
                        fact_id: fact_id.clone(),
                        message: e.to_string(),
                    }
                })?;
                collection.insert_snapshot(FactSnapshot::preloaded(
                    fact_id.clone(),
                    format!("{fact_id}[{index}]"),
                    payload,
                ))?;
            }
        }
        Ok(collection)
    }
}
