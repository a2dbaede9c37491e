//! Escalation case lifecycle.
//!
//! The workflow manager turns fired triggers into escalation events and
//! owns every status transition. Transitions run under the store's
//! exclusive entry access, so concurrent actors serialize per event and
//! the loser of a race gets `InvalidTransition` with the winner's status.

use crate::config::EscalationRuleConfig;
use crate::core::{
    Error, EscalationEvent, EscalationLevel, EscalationStatus, EscalationTrigger, Result,
    RiskAssessment,
};
use crate::escalation::dashboard::{self, EscalationDashboard, EscalationReport, ReportFilter};
use crate::escalation::routing::route;
use crate::escalation::templates::{render_message, template_for};
use crate::escalation::triggers::EscalationTriggerEvaluator;
use crate::store::{EscalationStore, InMemoryEscalationStore};
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use uuid::Uuid;

/// Follow-up is initially scheduled this long after creation
const INITIAL_FOLLOW_UP_HOURS: i64 = 24;
/// Follow-up requested at resolution lands this long after resolving
const RESOLUTION_FOLLOW_UP_DAYS: i64 = 7;

/// Orchestrates escalation creation and the case state machine over an
/// injected event store.
pub struct EscalationWorkflowManager {
    store: Arc<dyn EscalationStore>,
    evaluator: EscalationTriggerEvaluator,
    rules: EscalationRuleConfig,
}

impl EscalationWorkflowManager {
    pub fn new(rules: EscalationRuleConfig, store: Arc<dyn EscalationStore>) -> Self {
        Self {
            store,
            evaluator: EscalationTriggerEvaluator::new(rules.clone()),
            rules,
        }
    }

    /// Manager over a fresh in-memory store
    pub fn in_memory(rules: EscalationRuleConfig) -> Self {
        Self::new(rules, Arc::new(InMemoryEscalationStore::new()))
    }

    pub fn rules(&self) -> &EscalationRuleConfig {
        &self.rules
    }

    /// Evaluate the escalation rules against an assessment and create an
    /// event for every trigger that fires
    pub fn process_assessment(
        &self,
        current: &RiskAssessment,
        previous: Option<&RiskAssessment>,
    ) -> Vec<EscalationEvent> {
        self.evaluator
            .evaluate(current, previous)
            .iter()
            .map(|trigger| self.create_event(trigger, current))
            .collect()
    }

    /// Materialize a fired trigger into a pending escalation event.
    ///
    /// The message is rendered and the routing decision computed here,
    /// once. Neither changes for the life of the event.
    pub fn create_event(
        &self,
        trigger: &EscalationTrigger,
        assessment: &RiskAssessment,
    ) -> EscalationEvent {
        let now = Utc::now();
        let template = template_for(trigger.trigger_type);
        let event = EscalationEvent {
            id: Uuid::new_v4(),
            subject_id: assessment.subject_id.clone(),
            created_at: now,
            trigger_type: trigger.trigger_type,
            level: trigger.level,
            urgency: trigger.urgency,
            status: EscalationStatus::Pending,
            title: template.title.to_string(),
            message: render_message(trigger, &assessment.subject_id, assessment.overall_score),
            recommended_action: template.recommended_action.to_string(),
            priority: template.priority,
            reason: trigger.reason.clone(),
            risk_score_at_creation: assessment.overall_score,
            routing: route(trigger.level, trigger.urgency),
            acknowledged_by: None,
            acknowledged_at: None,
            acknowledgment_notes: None,
            resolved_by: None,
            resolved_at: None,
            resolution_notes: None,
            follow_up_required: true,
            follow_up_date: Some(now + Duration::hours(INITIAL_FOLLOW_UP_HOURS)),
        };
        log::info!(
            "escalation {} created for subject {}: {:?} ({:?}/{:?})",
            event.id,
            event.subject_id,
            event.trigger_type,
            event.level,
            event.urgency
        );
        self.store.insert(event.clone());
        event
    }

    /// Acknowledge a pending or in-progress escalation
    pub fn acknowledge(
        &self,
        id: Uuid,
        actor: &str,
        notes: Option<&str>,
    ) -> Result<EscalationEvent> {
        let updated = self.store.transition(&id, &|event| {
            match event.status {
                EscalationStatus::Pending | EscalationStatus::InProgress => {}
                status => {
                    return Err(Error::InvalidTransition {
                        escalation_id: id,
                        status,
                        operation: "acknowledge",
                    })
                }
            }
            event.status = EscalationStatus::Acknowledged;
            event.acknowledged_by = Some(actor.to_string());
            event.acknowledged_at = Some(Utc::now());
            event.acknowledgment_notes = notes.map(str::to_string);
            Ok(())
        })?;
        log::info!("escalation {} acknowledged by {}", id, actor);
        Ok(updated)
    }

    /// Move a pending or acknowledged escalation into active work
    pub fn start_progress(&self, id: Uuid, actor: &str) -> Result<EscalationEvent> {
        let updated = self.store.transition(&id, &|event| {
            match event.status {
                EscalationStatus::Pending | EscalationStatus::Acknowledged => {}
                status => {
                    return Err(Error::InvalidTransition {
                        escalation_id: id,
                        status,
                        operation: "start_progress",
                    })
                }
            }
            event.status = EscalationStatus::InProgress;
            Ok(())
        })?;
        log::info!("escalation {} work started by {}", id, actor);
        Ok(updated)
    }

    /// Resolve an active escalation. When `follow_up_required` is set,
    /// a follow-up date one week out is recorded; otherwise the
    /// follow-up is cleared.
    pub fn resolve(
        &self,
        id: Uuid,
        actor: &str,
        notes: &str,
        follow_up_required: bool,
    ) -> Result<EscalationEvent> {
        let updated = self.store.transition(&id, &|event| {
            if event.status.is_terminal() {
                return Err(Error::InvalidTransition {
                    escalation_id: id,
                    status: event.status,
                    operation: "resolve",
                });
            }
            let now = Utc::now();
            event.status = EscalationStatus::Resolved;
            event.resolved_by = Some(actor.to_string());
            event.resolved_at = Some(now);
            event.resolution_notes = Some(notes.to_string());
            event.follow_up_required = follow_up_required;
            event.follow_up_date = follow_up_required
                .then(|| now + Duration::days(RESOLUTION_FOLLOW_UP_DAYS));
            Ok(())
        })?;
        log::info!("escalation {} resolved by {}", id, actor);
        Ok(updated)
    }

    /// Cancel an active escalation
    pub fn cancel(&self, id: Uuid, actor: &str, reason: &str) -> Result<EscalationEvent> {
        let updated = self.store.transition(&id, &|event| {
            if event.status.is_terminal() {
                return Err(Error::InvalidTransition {
                    escalation_id: id,
                    status: event.status,
                    operation: "cancel",
                });
            }
            event.status = EscalationStatus::Cancelled;
            event.resolved_by = Some(actor.to_string());
            event.resolved_at = Some(Utc::now());
            event.resolution_notes = Some(reason.to_string());
            event.follow_up_required = false;
            event.follow_up_date = None;
            Ok(())
        })?;
        log::info!("escalation {} cancelled by {}: {}", id, actor, reason);
        Ok(updated)
    }

    /// Snapshot of one escalation
    pub fn get_event(&self, id: Uuid) -> Result<EscalationEvent> {
        self.store
            .get(&id)
            .ok_or(Error::NotFound { escalation_id: id })
    }

    /// A subject's escalations, newest first, optionally restricted to
    /// one status
    pub fn subject_events(
        &self,
        subject_id: &str,
        status: Option<EscalationStatus>,
    ) -> Vec<EscalationEvent> {
        let mut events = self.store.events_for_subject(subject_id);
        if let Some(status) = status {
            events.retain(|event| event.status == status);
        }
        events.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        events
    }

    /// All active escalations in display order, optionally restricted to
    /// one escalation level
    pub fn active_escalations(&self, level: Option<EscalationLevel>) -> Vec<EscalationEvent> {
        let mut events: Vec<EscalationEvent> = self
            .store
            .all_events()
            .into_iter()
            .filter(|event| event.is_active())
            .filter(|event| level.map_or(true, |l| event.level == l))
            .collect();
        dashboard::sort_active(&mut events);
        events
    }

    /// Dashboard snapshot against the current clock
    pub fn dashboard(&self) -> EscalationDashboard {
        self.dashboard_at(Utc::now())
    }

    /// Dashboard snapshot against an explicit clock. Overdue status is
    /// derived here at read time.
    pub fn dashboard_at(&self, now: DateTime<Utc>) -> EscalationDashboard {
        dashboard::build_dashboard(
            self.store.all_events(),
            now,
            Duration::hours(self.rules.overdue_after_hours),
        )
    }

    /// Resolution report over the events matching the filter
    pub fn report(&self, filter: &ReportFilter) -> EscalationReport {
        let events = match &filter.subject_id {
            Some(subject_id) => self.store.events_for_subject(subject_id),
            None => self.store.all_events(),
        };
        dashboard::build_report(events, filter, Utc::now())
    }
}
