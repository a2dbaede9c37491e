//! Input shapes supplied by external collaborators.
//!
//! Vitals monitoring, adherence scoring, and no-show prediction run
//! outside this crate. Their outputs arrive as the structures below;
//! any of them may be absent, in which case scoring substitutes a
//! documented neutral default instead of failing the assessment.

use crate::core::{AdherenceLevel, NoShowRiskCategory};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Trend observation for a single vital sign
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VitalTrend {
    #[serde(default)]
    pub trend_concern: bool,
    #[serde(default)]
    pub direction: String,
}

/// Abnormality flag for a single vital sign
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VitalAbnormality {
    #[serde(default)]
    pub is_abnormal: bool,
}

/// Output of the vitals monitoring collaborator
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VitalsInput {
    pub stability_score: f64,
    #[serde(default)]
    pub trends: HashMap<String, VitalTrend>,
    #[serde(default)]
    pub abnormalities: HashMap<String, VitalAbnormality>,
}

impl VitalsInput {
    /// Number of vitals flagged with a concerning trend
    pub fn concerning_trend_count(&self) -> usize {
        self.trends.values().filter(|t| t.trend_concern).count()
    }

    /// Number of vitals flagged as consistently abnormal
    pub fn abnormal_count(&self) -> usize {
        self.abnormalities.values().filter(|a| a.is_abnormal).count()
    }
}

/// Output of the treatment adherence collaborator
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AdherenceInput {
    pub overall_score: f64,
    pub adherence_level: AdherenceLevel,
    #[serde(default)]
    pub component_scores: HashMap<String, f64>,
}

/// Output of the appointment no-show classifier
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NoShowInput {
    pub no_show_probability: f64,
    pub risk_category: NoShowRiskCategory,
    #[serde(default)]
    pub contributing_factors: Vec<String>,
}

/// Severity of a chronic condition: the upstream record keeps either a
/// bool flag or a graded 0-1 value, so both deserialize here
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionSeverity {
    Flag(bool),
    Graded(f64),
}

impl ConditionSeverity {
    /// Numeric severity: flags map to 1.0/0.0
    pub fn value(&self) -> f64 {
        match self {
            ConditionSeverity::Flag(true) => 1.0,
            ConditionSeverity::Flag(false) => 0.0,
            ConditionSeverity::Graded(v) => *v,
        }
    }
}

/// Chronic-condition and demographic data for a subject
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PatientProfile {
    #[serde(default = "default_age")]
    pub age: i64,
    #[serde(default)]
    pub chronic_conditions: HashMap<String, ConditionSeverity>,
}

fn default_age() -> i64 {
    50
}

impl Default for PatientProfile {
    fn default() -> Self {
        Self {
            age: default_age(),
            chronic_conditions: HashMap::new(),
        }
    }
}
