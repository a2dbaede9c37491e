//! Rule-based escalation trigger evaluation.
//!
//! Inspects a current (and optionally previous) risk assessment against
//! the configured rule thresholds and emits every rule that fires. The
//! triggers are independent and all are emitted, because each maps to a
//! distinct routing decision; only the overall-score rules (critical vs
//! high) are mutually exclusive.

use crate::config::EscalationRuleConfig;
use crate::core::{EscalationLevel, EscalationTrigger, RiskAssessment, TriggerType, Urgency};

/// Fallback details string when a critical-vitals trigger has no
/// contributing factors to report
const GENERIC_VITALS_DETAILS: &str = "Multiple vital sign abnormalities";

/// How many vitals factors are carried into the trigger details
const VITALS_DETAIL_FACTORS: usize = 3;

/// Pure evaluator over the configured escalation rules
#[derive(Clone, Debug)]
pub struct EscalationTriggerEvaluator {
    rules: EscalationRuleConfig,
}

impl EscalationTriggerEvaluator {
    pub fn new(rules: EscalationRuleConfig) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &EscalationRuleConfig {
        &self.rules
    }

    /// Evaluate all escalation rules against an assessment.
    ///
    /// Triggers are emitted in a fixed order for deterministic output:
    /// overall score (critical xor high), rapid increase, critical
    /// vitals, adherence crisis, high no-show risk.
    pub fn evaluate(
        &self,
        current: &RiskAssessment,
        previous: Option<&RiskAssessment>,
    ) -> Vec<EscalationTrigger> {
        let mut triggers = Vec::new();

        self.check_overall_score(current, &mut triggers);
        self.check_rapid_increase(current, previous, &mut triggers);
        self.check_critical_vitals(current, &mut triggers);
        self.check_adherence_crisis(current, &mut triggers);
        self.check_no_show_risk(current, &mut triggers);

        if !triggers.is_empty() {
            log::debug!(
                "{} escalation trigger(s) fired for subject {}",
                triggers.len(),
                current.subject_id
            );
        }
        triggers
    }

    /// Critical and high overall-score rules; only the higher-severity
    /// one fires
    fn check_overall_score(&self, current: &RiskAssessment, triggers: &mut Vec<EscalationTrigger>) {
        let score = current.overall_score;
        if score >= self.rules.critical_risk_threshold {
            triggers.push(EscalationTrigger::new(
                TriggerType::CriticalRiskScore,
                EscalationLevel::Physician,
                Urgency::Immediate,
                format!("Critical risk score: {}", score),
            ));
        } else if score >= self.rules.high_risk_threshold {
            triggers.push(EscalationTrigger::new(
                TriggerType::HighRiskScore,
                EscalationLevel::Nurse,
                Urgency::Urgent,
                format!("High risk score: {}", score),
            ));
        }
    }

    fn check_rapid_increase(
        &self,
        current: &RiskAssessment,
        previous: Option<&RiskAssessment>,
        triggers: &mut Vec<EscalationTrigger>,
    ) {
        let Some(previous) = previous else {
            return;
        };
        let increase = current.overall_score - previous.overall_score;
        if increase >= self.rules.rapid_increase_threshold {
            let mut trigger = EscalationTrigger::new(
                TriggerType::RapidRiskIncrease,
                EscalationLevel::Physician,
                Urgency::Urgent,
                format!("Rapid risk increase: {} points", increase),
            );
            trigger.risk_increase = Some(increase);
            triggers.push(trigger);
        }
    }

    fn check_critical_vitals(
        &self,
        current: &RiskAssessment,
        triggers: &mut Vec<EscalationTrigger>,
    ) {
        let vitals = &current.component_risks.vitals_stability;
        if vitals.score > self.rules.vitals_critical_threshold {
            let factors: Vec<&str> = vitals
                .contributing_factors
                .iter()
                .take(VITALS_DETAIL_FACTORS)
                .map(String::as_str)
                .collect();
            let details = if factors.is_empty() {
                GENERIC_VITALS_DETAILS.to_string()
            } else {
                factors.join("; ")
            };

            let mut trigger = EscalationTrigger::new(
                TriggerType::CriticalVitals,
                EscalationLevel::Emergency,
                Urgency::Immediate,
                "Critical vital signs detected",
            );
            trigger.vitals_details = Some(details);
            triggers.push(trigger);
        }
    }

    fn check_adherence_crisis(
        &self,
        current: &RiskAssessment,
        triggers: &mut Vec<EscalationTrigger>,
    ) {
        let adherence_score = current.raw_adherence_score();
        if adherence_score < self.rules.adherence_critical_threshold {
            let mut trigger = EscalationTrigger::new(
                TriggerType::AdherenceCrisis,
                EscalationLevel::Nurse,
                Urgency::Routine,
                format!("Critical adherence score: {}", adherence_score),
            );
            trigger.adherence_score = Some(adherence_score);
            triggers.push(trigger);
        }
    }

    fn check_no_show_risk(&self, current: &RiskAssessment, triggers: &mut Vec<EscalationTrigger>) {
        let probability = current.no_show_probability();
        if probability >= self.rules.no_show_critical_threshold {
            let mut trigger = EscalationTrigger::new(
                TriggerType::HighNoShowRisk,
                EscalationLevel::Nurse,
                Urgency::Routine,
                format!("High no-show probability: {}", probability),
            );
            trigger.no_show_probability = Some(probability);
            triggers.push(trigger);
        }
    }
}
