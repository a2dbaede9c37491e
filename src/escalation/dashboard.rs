//! Dashboard aggregation and reporting over escalation events.
//!
//! Everything here is a pure function of an event snapshot and the
//! caller's clock. Overdue is a read-time classification, never a
//! stored flag or a scheduled action.

use crate::core::{
    EscalationEvent, EscalationLevel, EscalationStatus, TriggerType, Urgency,
};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The dashboard's active list is capped to the most urgent entries
const ACTIVE_LIST_LIMIT: usize = 20;
/// The recent list is capped to the newest entries
const RECENT_LIST_LIMIT: usize = 10;
/// Window for the recent-escalations list
const RECENT_WINDOW_HOURS: i64 = 24;
/// Days covered by the escalation trend counts
const TREND_DAYS: i64 = 7;

/// Aggregate counts over the active escalations
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub total_active: usize,
    pub by_status: BTreeMap<EscalationStatus, usize>,
    pub by_level: BTreeMap<EscalationLevel, usize>,
    pub by_urgency: BTreeMap<Urgency, usize>,
    pub overdue_count: usize,
    pub last_updated: DateTime<Utc>,
}

/// Daily escalation counts over the trend window
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EscalationTrends {
    /// Creation counts keyed by day (YYYY-MM-DD), oldest to newest
    pub daily_counts: BTreeMap<String, usize>,
    pub total_last_7_days: usize,
    pub average_per_day: f64,
}

/// Complete dashboard payload
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EscalationDashboard {
    pub summary: DashboardSummary,
    pub active_escalations: Vec<EscalationEvent>,
    pub recent_escalations: Vec<EscalationEvent>,
    pub overdue_escalations: Vec<EscalationEvent>,
    pub trends: EscalationTrends,
}

/// Subset selection for escalation reports
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportFilter {
    pub subject_id: Option<String>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl ReportFilter {
    fn matches(&self, event: &EscalationEvent) -> bool {
        if let Some(subject_id) = &self.subject_id {
            if &event.subject_id != subject_id {
                return false;
            }
        }
        if let Some(start) = self.start {
            if event.created_at < start {
                return false;
            }
        }
        if let Some(end) = self.end {
            if event.created_at > end {
                return false;
            }
        }
        true
    }
}

/// Resolution statistics over a filtered event subset
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EscalationReport {
    pub generated_at: DateTime<Utc>,
    pub total_escalations: usize,
    pub resolved_count: usize,
    /// Percentage of escalations resolved
    pub resolution_rate: f64,
    pub avg_resolution_time_hours: f64,
    pub active_count: usize,
    pub escalations_by_trigger_type: BTreeMap<TriggerType, usize>,
    /// Matching escalations, newest first
    pub escalations: Vec<EscalationEvent>,
}

/// Sort active escalations for display: urgency rank first (immediate
/// before urgent before routine), then creation time ascending
pub fn sort_active(events: &mut [EscalationEvent]) {
    events.sort_by(|a, b| {
        a.urgency
            .cmp(&b.urgency)
            .then(a.created_at.cmp(&b.created_at))
    });
}

/// Build the full dashboard from an event snapshot
pub fn build_dashboard(
    events: Vec<EscalationEvent>,
    now: DateTime<Utc>,
    overdue_after: Duration,
) -> EscalationDashboard {
    let mut active: Vec<EscalationEvent> = events
        .iter()
        .filter(|event| event.is_active())
        .cloned()
        .collect();
    sort_active(&mut active);

    let mut by_status = BTreeMap::new();
    let mut by_level = BTreeMap::new();
    let mut by_urgency = BTreeMap::new();
    for event in &active {
        *by_status.entry(event.status).or_insert(0) += 1;
        *by_level.entry(event.level).or_insert(0) += 1;
        *by_urgency.entry(event.urgency).or_insert(0) += 1;
    }

    let overdue_escalations: Vec<EscalationEvent> = active
        .iter()
        .filter(|event| event.is_overdue(now, overdue_after))
        .cloned()
        .collect();

    let mut recent_escalations: Vec<EscalationEvent> = events
        .iter()
        .filter(|event| now - event.created_at <= Duration::hours(RECENT_WINDOW_HOURS))
        .cloned()
        .collect();
    recent_escalations.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    recent_escalations.truncate(RECENT_LIST_LIMIT);

    let summary = DashboardSummary {
        total_active: active.len(),
        by_status,
        by_level,
        by_urgency,
        overdue_count: overdue_escalations.len(),
        last_updated: now,
    };

    let trends = build_trends(&events, now);

    let mut active_escalations = active;
    active_escalations.truncate(ACTIVE_LIST_LIMIT);

    EscalationDashboard {
        summary,
        active_escalations,
        recent_escalations,
        overdue_escalations,
        trends,
    }
}

/// Daily creation counts for the trailing trend window
fn build_trends(events: &[EscalationEvent], now: DateTime<Utc>) -> EscalationTrends {
    let mut daily_counts = BTreeMap::new();
    for offset in 0..TREND_DAYS {
        let day = (now - Duration::days(offset)).date_naive();
        let count = events
            .iter()
            .filter(|event| event.created_at.date_naive() == day)
            .count();
        daily_counts.insert(day.format("%Y-%m-%d").to_string(), count);
    }

    let total: usize = daily_counts.values().sum();
    EscalationTrends {
        daily_counts,
        total_last_7_days: total,
        average_per_day: total as f64 / TREND_DAYS as f64,
    }
}

/// Build a resolution report over the events matching the filter
pub fn build_report(
    events: Vec<EscalationEvent>,
    filter: &ReportFilter,
    now: DateTime<Utc>,
) -> EscalationReport {
    let mut matching: Vec<EscalationEvent> =
        events.into_iter().filter(|e| filter.matches(e)).collect();
    matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let total = matching.len();
    let resolved: Vec<&EscalationEvent> = matching
        .iter()
        .filter(|e| e.status == EscalationStatus::Resolved)
        .collect();

    let resolution_rate = if total > 0 {
        resolved.len() as f64 / total as f64 * 100.0
    } else {
        0.0
    };

    let resolution_hours: Vec<f64> = resolved
        .iter()
        .filter_map(|e| e.resolution_time())
        .map(|d| d.num_seconds() as f64 / 3600.0)
        .collect();
    let avg_resolution_time_hours = if resolution_hours.is_empty() {
        0.0
    } else {
        resolution_hours.iter().sum::<f64>() / resolution_hours.len() as f64
    };

    let mut escalations_by_trigger_type = BTreeMap::new();
    for event in &matching {
        *escalations_by_trigger_type
            .entry(event.trigger_type)
            .or_insert(0) += 1;
    }

    let active_count = matching.iter().filter(|e| e.is_active()).count();

    EscalationReport {
        generated_at: now,
        total_escalations: total,
        resolved_count: resolved.len(),
        resolution_rate,
        avg_resolution_time_hours,
        active_count,
        escalations_by_trigger_type,
        escalations: matching,
    }
}
