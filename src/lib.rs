// Export modules for library usage
pub mod config;
pub mod core;
pub mod escalation;
pub mod population;
pub mod scoring;
pub mod store;

// Re-export commonly used types
pub use crate::core::{
    AdherenceLevel, AssessmentUrgency, ComponentRisk, ComponentRisks, Error, EscalationEvent,
    EscalationLevel, EscalationStatus, EscalationTrigger, EventPriority, NoShowRiskCategory,
    Result, RiskAssessment, RiskBreakdown, RiskCategory, RiskDriver, RoutingDecision,
    TriggerType, Urgency,
};

pub use crate::core::inputs::{
    AdherenceInput, NoShowInput, PatientProfile, VitalAbnormality, VitalTrend, VitalsInput,
};

pub use crate::config::{EscalationRuleConfig, RiskConfig, RiskThresholds, RiskWeights};

pub use crate::scoring::RiskScoringEngine;

pub use crate::escalation::{
    route, DashboardSummary, EscalationDashboard, EscalationReport, EscalationTriggerEvaluator,
    EscalationWorkflowManager, ReportFilter,
};

pub use crate::population::{
    population_overview, risk_trend, PopulationOverview, RiskTrend, TrendDirection,
};

pub use crate::store::{
    AssessmentStore, EscalationStore, InMemoryAssessmentStore, InMemoryEscalationStore,
};
