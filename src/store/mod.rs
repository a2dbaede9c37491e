//! Keyed store abstractions for escalation events and assessment
//! history, with in-memory implementations.
//!
//! The stores are injected into the services that use them instead of
//! living in ambient global state. Any durable backend satisfying these
//! access patterns can replace the in-memory maps.

use crate::core::{Error, EscalationEvent, Result, RiskAssessment};
use dashmap::DashMap;
use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

/// Keyed, append-only store of escalation events.
///
/// Events are never deleted; in-place mutation happens only through
/// [`EscalationStore::transition`], which must apply the closure under
/// exclusive access to the targeted event so that at most one state
/// transition per id is in flight at a time. The closure must leave the
/// event untouched when it returns an error.
pub trait EscalationStore: Send + Sync {
    /// Append a newly created event
    fn insert(&self, event: EscalationEvent);

    /// Snapshot of one event
    fn get(&self, id: &Uuid) -> Option<EscalationEvent>;

    /// Apply a state transition to one event under exclusive access,
    /// returning the updated snapshot
    fn transition(
        &self,
        id: &Uuid,
        apply: &dyn Fn(&mut EscalationEvent) -> Result<()>,
    ) -> Result<EscalationEvent>;

    /// Snapshots of all events for one subject, in insertion order
    fn events_for_subject(&self, subject_id: &str) -> Vec<EscalationEvent>;

    /// Snapshots of every stored event
    fn all_events(&self) -> Vec<EscalationEvent>;
}

/// In-memory escalation store backed by a concurrent map keyed by event
/// id, with a per-subject index.
///
/// Readers clone events out (copy-on-read), so dashboard snapshots never
/// observe a half-updated event.
#[derive(Default)]
pub struct InMemoryEscalationStore {
    events: DashMap<Uuid, EscalationEvent>,
    by_subject: DashMap<String, Vec<Uuid>>,
}

impl InMemoryEscalationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EscalationStore for InMemoryEscalationStore {
    fn insert(&self, event: EscalationEvent) {
        self.by_subject
            .entry(event.subject_id.clone())
            .or_default()
            .push(event.id);
        self.events.insert(event.id, event);
    }

    fn get(&self, id: &Uuid) -> Option<EscalationEvent> {
        self.events.get(id).map(|entry| entry.clone())
    }

    fn transition(
        &self,
        id: &Uuid,
        apply: &dyn Fn(&mut EscalationEvent) -> Result<()>,
    ) -> Result<EscalationEvent> {
        // get_mut holds the entry exclusively for the whole
        // read-modify-write, so racing transitions serialize here and
        // the loser sees the winner's status.
        let mut entry = self
            .events
            .get_mut(id)
            .ok_or(Error::NotFound { escalation_id: *id })?;
        apply(entry.value_mut())?;
        Ok(entry.value().clone())
    }

    fn events_for_subject(&self, subject_id: &str) -> Vec<EscalationEvent> {
        let Some(ids) = self.by_subject.get(subject_id) else {
            return Vec::new();
        };
        ids.iter()
            .filter_map(|id| self.events.get(id).map(|entry| entry.clone()))
            .collect()
    }

    fn all_events(&self) -> Vec<EscalationEvent> {
        self.events.iter().map(|entry| entry.clone()).collect()
    }
}

/// Keyed store of successive risk assessments per subject
pub trait AssessmentStore: Send + Sync {
    /// Append an assessment to its subject's history
    fn record(&self, assessment: RiskAssessment);

    /// Most recent assessment for a subject
    fn latest(&self, subject_id: &str) -> Option<RiskAssessment>;

    /// Full assessment history for a subject, oldest first
    fn history(&self, subject_id: &str) -> Vec<RiskAssessment>;

    /// The latest assessment of every known subject
    fn latest_all(&self) -> Vec<RiskAssessment>;
}

/// In-memory assessment history keyed by subject id
#[derive(Default)]
pub struct InMemoryAssessmentStore {
    history: RwLock<HashMap<String, Vec<RiskAssessment>>>,
}

impl InMemoryAssessmentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AssessmentStore for InMemoryAssessmentStore {
    fn record(&self, assessment: RiskAssessment) {
        let mut history = self.history.write();
        let entries = history
            .entry(assessment.subject_id.clone())
            .or_default();
        entries.push(assessment);
        entries.sort_by_key(|a| a.assessed_at);
    }

    fn latest(&self, subject_id: &str) -> Option<RiskAssessment> {
        self.history
            .read()
            .get(subject_id)
            .and_then(|entries| entries.last().cloned())
    }

    fn history(&self, subject_id: &str) -> Vec<RiskAssessment> {
        self.history
            .read()
            .get(subject_id)
            .cloned()
            .unwrap_or_default()
    }

    fn latest_all(&self) -> Vec<RiskAssessment> {
        self.history
            .read()
            .values()
            .filter_map(|entries| entries.last().cloned())
            .collect()
    }
}
