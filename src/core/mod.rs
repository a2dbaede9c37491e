//! Core domain types for risk assessment and escalation tracking.
//!
//! Every entity that crosses a module boundary is an explicit tagged
//! struct or enum here, validated at construction, instead of the loose
//! string-keyed records the upstream data sources use.

pub mod errors;
pub mod inputs;

pub use errors::{Error, Result};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Overall risk category for a patient assessment
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskCategory {
    Low,
    Medium,
    High,
}

impl RiskCategory {
    /// Dashboard color indicator for this category
    pub fn color(&self) -> &'static str {
        match self {
            RiskCategory::Low => "green",
            RiskCategory::Medium => "yellow",
            RiskCategory::High => "red",
        }
    }

    /// How urgently the assessment should be reviewed
    pub fn urgency(&self) -> AssessmentUrgency {
        match self {
            RiskCategory::Low => AssessmentUrgency::Routine,
            RiskCategory::Medium => AssessmentUrgency::Soon,
            RiskCategory::High => AssessmentUrgency::Immediate,
        }
    }

    /// Recommended cadence for the next assessment
    pub fn next_assessment_interval(&self) -> &'static str {
        match self {
            RiskCategory::Low => "Every 24 hours",
            RiskCategory::Medium => "Every 12 hours",
            RiskCategory::High => "Every 4 hours",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskCategory::Low => "Low",
            RiskCategory::Medium => "Medium",
            RiskCategory::High => "High",
        }
    }
}

impl std::fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Review urgency attached to a risk assessment (distinct from the
/// escalation [`Urgency`] buckets used for routing)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentUrgency {
    Immediate,
    Soon,
    Routine,
}

/// Adherence level as reported by the adherence collaborator
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdherenceLevel {
    Excellent,
    Good,
    Fair,
    Poor,
    Critical,
}

/// No-show risk bucket as reported by the no-show collaborator
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoShowRiskCategory {
    Low,
    Medium,
    High,
}

/// Per-condition contribution inside the chronic risk breakdown
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConditionContribution {
    pub condition: String,
    pub severity: f64,
    pub risk_contribution: f64,
}

/// Component-specific sub-scores behind a [`ComponentRisk`]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "component", rename_all = "snake_case")]
pub enum RiskBreakdown {
    Vitals {
        base_stability_risk: f64,
        trend_risk: f64,
        abnormality_risk: f64,
    },
    Chronic {
        condition_risk: f64,
        age_risk: f64,
        conditions: Vec<ConditionContribution>,
        age: i64,
    },
    Adherence {
        adherence_score: f64,
        adherence_level: AdherenceLevel,
    },
    NoShow {
        probability: f64,
        category: NoShowRiskCategory,
    },
}

/// One risk dimension's contribution to the overall score.
///
/// The score is clamped to `[0, 100]` per component, never on the sum,
/// so driver attribution survives aggregation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ComponentRisk {
    pub score: f64,
    pub weight: f64,
    pub breakdown: RiskBreakdown,
    pub contributing_factors: Vec<String>,
}

/// The four component risks of an assessment
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ComponentRisks {
    pub vitals_stability: ComponentRisk,
    pub chronic_conditions: ComponentRisk,
    pub adherence: ComponentRisk,
    pub no_show: ComponentRisk,
}

/// One entry in the ordered risk-driver explanation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RiskDriver {
    pub category: String,
    pub contribution: f64,
    pub description: String,
    pub factors: Vec<String>,
}

/// A complete, immutable risk assessment for one subject.
///
/// A new assessment for the same subject never mutates an old one;
/// history is preserved by storing successive assessments.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub subject_id: String,
    pub overall_score: f64,
    pub category: RiskCategory,
    pub color_indicator: String,
    pub urgency: AssessmentUrgency,
    pub component_risks: ComponentRisks,
    pub risk_drivers: Vec<RiskDriver>,
    pub recommendations: Vec<String>,
    pub assessed_at: DateTime<Utc>,
    pub next_assessment_recommended: String,
}

impl RiskAssessment {
    /// Raw adherence score reported by the collaborator, as carried in
    /// the adherence breakdown
    pub fn raw_adherence_score(&self) -> f64 {
        match self.component_risks.adherence.breakdown {
            RiskBreakdown::Adherence {
                adherence_score, ..
            } => adherence_score,
            _ => 100.0,
        }
    }

    /// No-show probability carried in the no-show breakdown
    pub fn no_show_probability(&self) -> f64 {
        match self.component_risks.no_show.breakdown {
            RiskBreakdown::NoShow { probability, .. } => probability,
            _ => 0.0,
        }
    }
}

/// Escalation levels, ordered by severity
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EscalationLevel {
    Nurse,
    Physician,
    Specialist,
    Emergency,
}

impl EscalationLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            EscalationLevel::Nurse => "nurse",
            EscalationLevel::Physician => "physician",
            EscalationLevel::Specialist => "specialist",
            EscalationLevel::Emergency => "emergency",
        }
    }
}

impl std::fmt::Display for EscalationLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Escalation urgency buckets. The declaration order doubles as the
/// dashboard sort rank: immediate sorts before urgent before routine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Immediate,
    Urgent,
    Routine,
}

impl Urgency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Urgency::Immediate => "immediate",
            Urgency::Urgent => "urgent",
            Urgency::Routine => "routine",
        }
    }
}

impl std::fmt::Display for Urgency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle status of an escalation event
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EscalationStatus {
    Pending,
    Acknowledged,
    InProgress,
    Resolved,
    Cancelled,
}

impl EscalationStatus {
    /// Terminal statuses admit no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, EscalationStatus::Resolved | EscalationStatus::Cancelled)
    }

    /// Active statuses appear on the dashboard
    pub fn is_active(&self) -> bool {
        !self.is_terminal()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EscalationStatus::Pending => "pending",
            EscalationStatus::Acknowledged => "acknowledged",
            EscalationStatus::InProgress => "in_progress",
            EscalationStatus::Resolved => "resolved",
            EscalationStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for EscalationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why an escalation fired
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerType {
    CriticalRiskScore,
    HighRiskScore,
    RapidRiskIncrease,
    CriticalVitals,
    AdherenceCrisis,
    HighNoShowRisk,
}

impl TriggerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TriggerType::CriticalRiskScore => "critical_risk_score",
            TriggerType::HighRiskScore => "high_risk_score",
            TriggerType::RapidRiskIncrease => "rapid_risk_increase",
            TriggerType::CriticalVitals => "critical_vitals",
            TriggerType::AdherenceCrisis => "adherence_crisis",
            TriggerType::HighNoShowRisk => "high_no_show_risk",
        }
    }
}

impl std::fmt::Display for TriggerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Template priority attached to the rendered escalation message
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventPriority {
    Critical,
    High,
    Medium,
}

/// A fired rule condition describing why an escalation should be created.
///
/// Produced by the trigger evaluator; only the workflow manager turns
/// triggers into events.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EscalationTrigger {
    pub trigger_type: TriggerType,
    pub level: EscalationLevel,
    pub urgency: Urgency,
    pub reason: String,
    /// Score delta for rapid-increase triggers
    pub risk_increase: Option<f64>,
    /// Raw adherence score for adherence-crisis triggers
    pub adherence_score: Option<f64>,
    /// Probability for no-show triggers
    pub no_show_probability: Option<f64>,
    /// Rendered factor summary for critical-vitals triggers
    pub vitals_details: Option<String>,
}

impl EscalationTrigger {
    pub fn new(
        trigger_type: TriggerType,
        level: EscalationLevel,
        urgency: Urgency,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            trigger_type,
            level,
            urgency,
            reason: reason.into(),
            risk_increase: None,
            adherence_score: None,
            no_show_probability: None,
            vitals_details: None,
        }
    }
}

/// Care-team roles an escalation can be routed to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CareRole {
    EmergencyDepartment,
    OnCallPhysician,
    ChargeNurse,
    PrimaryCarePhysician,
    Specialist,
    CaseManager,
}

/// Channels an escalation notification can be delivered over
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryChannel {
    SmsAlert,
    PhoneCall,
    DashboardNotification,
    Email,
}

/// Deterministic routing derived from (level, urgency) at creation time.
///
/// Stored with the event and never recomputed, so historical reports
/// reflect the routing decision actually made.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoutingDecision {
    pub routed_to: Vec<CareRole>,
    pub delivery_methods: Vec<DeliveryChannel>,
    pub estimated_response_minutes: u32,
}

impl RoutingDecision {
    /// Human-readable response-time estimate, e.g. "5 minutes" or "2 hours"
    pub fn estimated_response_display(&self) -> String {
        let minutes = self.estimated_response_minutes;
        if minutes >= 60 && minutes % 60 == 0 {
            let hours = minutes / 60;
            if hours == 1 {
                "1 hour".to_string()
            } else {
                format!("{} hours", hours)
            }
        } else {
            format!("{} minutes", minutes)
        }
    }
}

/// One tracked escalation case.
///
/// Created once by the workflow manager and owned by its event store for
/// life; never deleted, only transitioned, to preserve the audit trail.
/// The acknowledgment and resolution fields are populated only by their
/// respective transitions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EscalationEvent {
    pub id: Uuid,
    pub subject_id: String,
    pub created_at: DateTime<Utc>,
    pub trigger_type: TriggerType,
    pub level: EscalationLevel,
    pub urgency: Urgency,
    pub status: EscalationStatus,
    pub title: String,
    pub message: String,
    pub recommended_action: String,
    pub priority: EventPriority,
    pub reason: String,
    /// Overall risk score of the assessment that triggered this event
    pub risk_score_at_creation: f64,
    pub routing: RoutingDecision,
    pub acknowledged_by: Option<String>,
    pub acknowledged_at: Option<DateTime<Utc>>,
    pub acknowledgment_notes: Option<String>,
    pub resolved_by: Option<String>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub resolution_notes: Option<String>,
    pub follow_up_required: bool,
    pub follow_up_date: Option<DateTime<Utc>>,
}

impl EscalationEvent {
    /// Whether the event still needs attention
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// Overdue = still active and older than the SLA window. Derived from
    /// the caller's clock at read time, never stored.
    pub fn is_overdue(&self, now: DateTime<Utc>, overdue_after: Duration) -> bool {
        self.is_active() && now - self.created_at > overdue_after
    }

    /// Wall-clock time from creation to resolution, if resolved
    pub fn resolution_time(&self) -> Option<Duration> {
        self.resolved_at.map(|resolved| resolved - self.created_at)
    }
}
