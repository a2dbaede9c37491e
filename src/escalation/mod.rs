//! Escalation pipeline: rule-based trigger evaluation, message
//! rendering, deterministic routing, and the case workflow state
//! machine with its dashboard and reporting reads.

pub mod dashboard;
pub mod routing;
pub mod templates;
pub mod triggers;
pub mod workflow;

pub use dashboard::{
    DashboardSummary, EscalationDashboard, EscalationReport, EscalationTrends, ReportFilter,
};
pub use routing::route;
pub use triggers::EscalationTriggerEvaluator;
pub use workflow::EscalationWorkflowManager;
