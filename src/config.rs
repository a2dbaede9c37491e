//! Immutable configuration: risk weights, category thresholds, chronic
//! condition severities, and escalation rule thresholds.
//!
//! Everything is deserializable from TOML with per-field defaults, so a
//! partial config file overrides only what it names.

use crate::core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Severity assumed for chronic conditions missing from the table
pub const UNKNOWN_CONDITION_SEVERITY: f64 = 0.3;

/// Per-component weights applied during risk scoring
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskWeights {
    /// Weight for the vitals stability component (0.0-1.0)
    #[serde(default = "default_vitals_weight")]
    pub vitals_stability: f64,

    /// Weight for the chronic conditions component (0.0-1.0)
    #[serde(default = "default_chronic_weight")]
    pub chronic_conditions: f64,

    /// Weight for the treatment adherence component (0.0-1.0)
    #[serde(default = "default_adherence_weight")]
    pub adherence: f64,

    /// Weight for the age band inside the chronic component (0.0-1.0)
    #[serde(default = "default_age_weight")]
    pub age: f64,

    /// Weight for the no-show component (0.0-1.0)
    #[serde(default = "default_no_show_weight")]
    pub no_show: f64,
}

fn default_vitals_weight() -> f64 {
    0.35
}

fn default_chronic_weight() -> f64 {
    0.25
}

fn default_adherence_weight() -> f64 {
    0.20
}

fn default_age_weight() -> f64 {
    0.10
}

fn default_no_show_weight() -> f64 {
    0.10
}

impl Default for RiskWeights {
    fn default() -> Self {
        Self {
            vitals_stability: default_vitals_weight(),
            chronic_conditions: default_chronic_weight(),
            adherence: default_adherence_weight(),
            age: default_age_weight(),
            no_show: default_no_show_weight(),
        }
    }
}

impl RiskWeights {
    fn is_valid_weight(weight: f64) -> bool {
        (0.0..=1.0).contains(&weight)
    }

    fn validate_weight(weight: f64, name: &str) -> Result<()> {
        if Self::is_valid_weight(weight) {
            Ok(())
        } else {
            Err(Error::Configuration(format!(
                "{} weight must be between 0.0 and 1.0",
                name
            )))
        }
    }

    /// Validate individual weight ranges and that the weights sum to 1.0
    /// (with a small tolerance for floating point)
    pub fn validate(&self) -> Result<()> {
        Self::validate_weight(self.vitals_stability, "vitals_stability")?;
        Self::validate_weight(self.chronic_conditions, "chronic_conditions")?;
        Self::validate_weight(self.adherence, "adherence")?;
        Self::validate_weight(self.age, "age")?;
        Self::validate_weight(self.no_show, "no_show")?;

        let sum = self.vitals_stability
            + self.chronic_conditions
            + self.adherence
            + self.age
            + self.no_show;
        if (sum - 1.0).abs() > 0.001 {
            return Err(Error::Configuration(format!(
                "Risk weights must sum to 1.0, but sum to {:.3}",
                sum
            )));
        }
        Ok(())
    }
}

/// Category boundaries for the overall risk score.
///
/// One constant serves both as Medium's upper bound and High's lower
/// bound, so the bands can neither gap nor overlap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskThresholds {
    /// Scores at or above this are at least Medium
    #[serde(default = "default_medium_threshold")]
    pub medium: f64,

    /// Scores at or above this are High
    #[serde(default = "default_high_threshold")]
    pub high: f64,
}

fn default_medium_threshold() -> f64 {
    30.0
}

fn default_high_threshold() -> f64 {
    70.0
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            medium: default_medium_threshold(),
            high: default_high_threshold(),
        }
    }
}

impl RiskThresholds {
    pub fn validate(&self) -> Result<()> {
        if self.medium < 0.0 {
            return Err(Error::Configuration(
                "medium risk threshold must be non-negative".to_string(),
            ));
        }
        if self.medium >= self.high {
            return Err(Error::Configuration(format!(
                "medium risk threshold ({}) must be below high threshold ({})",
                self.medium, self.high
            )));
        }
        Ok(())
    }
}

/// Thresholds for the declarative escalation rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EscalationRuleConfig {
    /// Overall score at which the high-risk rule fires
    #[serde(default = "default_high_risk_threshold")]
    pub high_risk_threshold: f64,

    /// Overall score at which the critical-risk rule fires instead
    #[serde(default = "default_critical_risk_threshold")]
    pub critical_risk_threshold: f64,

    /// Points of score increase between assessments that count as rapid
    #[serde(default = "default_rapid_increase_threshold")]
    pub rapid_increase_threshold: f64,

    /// Vitals component score above which vitals count as critical
    #[serde(default = "default_vitals_critical_threshold")]
    pub vitals_critical_threshold: f64,

    /// Raw adherence score below which adherence is in crisis
    #[serde(default = "default_adherence_critical_threshold")]
    pub adherence_critical_threshold: f64,

    /// No-show probability at or above which outreach is escalated
    #[serde(default = "default_no_show_critical_threshold")]
    pub no_show_critical_threshold: f64,

    /// Hours after which an unresolved escalation counts as overdue
    #[serde(default = "default_overdue_after_hours")]
    pub overdue_after_hours: i64,
}

fn default_high_risk_threshold() -> f64 {
    70.0
}

fn default_critical_risk_threshold() -> f64 {
    85.0
}

fn default_rapid_increase_threshold() -> f64 {
    15.0
}

fn default_vitals_critical_threshold() -> f64 {
    50.0
}

fn default_adherence_critical_threshold() -> f64 {
    30.0
}

fn default_no_show_critical_threshold() -> f64 {
    0.7
}

fn default_overdue_after_hours() -> i64 {
    24
}

impl Default for EscalationRuleConfig {
    fn default() -> Self {
        Self {
            high_risk_threshold: default_high_risk_threshold(),
            critical_risk_threshold: default_critical_risk_threshold(),
            rapid_increase_threshold: default_rapid_increase_threshold(),
            vitals_critical_threshold: default_vitals_critical_threshold(),
            adherence_critical_threshold: default_adherence_critical_threshold(),
            no_show_critical_threshold: default_no_show_critical_threshold(),
            overdue_after_hours: default_overdue_after_hours(),
        }
    }
}

impl EscalationRuleConfig {
    pub fn validate(&self) -> Result<()> {
        if self.critical_risk_threshold < self.high_risk_threshold {
            return Err(Error::Configuration(format!(
                "critical risk threshold ({}) must not be below high threshold ({})",
                self.critical_risk_threshold, self.high_risk_threshold
            )));
        }
        if !(0.0..=1.0).contains(&self.no_show_critical_threshold) {
            return Err(Error::Configuration(
                "no-show critical threshold must be a probability in [0, 1]".to_string(),
            ));
        }
        if self.overdue_after_hours <= 0 {
            return Err(Error::Configuration(
                "overdue window must be a positive number of hours".to_string(),
            ));
        }
        Ok(())
    }
}

/// Top-level configuration bundle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskConfig {
    #[serde(default)]
    pub weights: RiskWeights,

    #[serde(default)]
    pub thresholds: RiskThresholds,

    #[serde(default)]
    pub escalation: EscalationRuleConfig,

    /// Severity table for known chronic conditions, keyed by lowercased
    /// condition name
    #[serde(default = "default_condition_severities")]
    pub condition_severities: HashMap<String, f64>,
}

fn default_condition_severities() -> HashMap<String, f64> {
    [
        ("diabetes", 0.7),
        ("hypertension", 0.5),
        ("heart_disease", 0.8),
        ("kidney_disease", 0.9),
        ("respiratory_disease", 0.6),
        ("obesity", 0.4),
    ]
    .into_iter()
    .map(|(name, severity)| (name.to_string(), severity))
    .collect()
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            weights: RiskWeights::default(),
            thresholds: RiskThresholds::default(),
            escalation: EscalationRuleConfig::default(),
            condition_severities: default_condition_severities(),
        }
    }
}

impl RiskConfig {
    /// Severity for a condition name, falling back to the unknown-condition
    /// default. Lookup is case-insensitive.
    pub fn condition_severity(&self, condition: &str) -> f64 {
        self.condition_severities
            .get(&condition.to_lowercase())
            .copied()
            .unwrap_or(UNKNOWN_CONDITION_SEVERITY)
    }

    /// Validate all sections
    pub fn validate(&self) -> Result<()> {
        self.weights.validate()?;
        self.thresholds.validate()?;
        self.escalation.validate()?;
        for (condition, severity) in &self.condition_severities {
            if !(0.0..=1.0).contains(severity) {
                return Err(Error::Configuration(format!(
                    "severity for condition '{}' must be between 0.0 and 1.0",
                    condition
                )));
            }
        }
        Ok(())
    }

    /// Parse and validate a config from a TOML string
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: RiskConfig = toml::from_str(contents)
            .map_err(|e| Error::Configuration(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config file
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config = Self::from_toml_str(&contents)?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load a config file, falling back to defaults when it is missing or
    /// invalid. Only real read failures and parse errors are logged.
    pub fn load_or_default(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match Self::from_toml_str(&contents) {
                Ok(config) => {
                    log::debug!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    log::warn!("{}. Using defaults.", e);
                    Self::default()
                }
            },
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    log::warn!("Failed to read config file {}: {}", path.display(), e);
                }
                Self::default()
            }
        }
    }
}
