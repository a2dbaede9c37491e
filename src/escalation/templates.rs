//! Escalation message templates keyed by trigger type.
//!
//! Rendering is typed: each trigger carries the context its template
//! needs, so there is no string-keyed substitution to drift out of sync.

use crate::core::{EscalationTrigger, EventPriority, TriggerType};

/// Static parts of an escalation message
#[derive(Clone, Copy, Debug)]
pub struct MessageTemplate {
    pub title: &'static str,
    pub recommended_action: &'static str,
    pub priority: EventPriority,
}

/// Template for a trigger type. The two overall-score rules share the
/// high-risk template.
pub fn template_for(trigger_type: TriggerType) -> MessageTemplate {
    match trigger_type {
        TriggerType::CriticalRiskScore | TriggerType::HighRiskScore => MessageTemplate {
            title: "High Risk Patient Alert",
            recommended_action: "Clinical assessment within 2 hours",
            priority: EventPriority::High,
        },
        TriggerType::CriticalVitals => MessageTemplate {
            title: "Critical Vitals Alert",
            recommended_action: "Emergency assessment",
            priority: EventPriority::Critical,
        },
        TriggerType::RapidRiskIncrease => MessageTemplate {
            title: "Rapid Deterioration Alert",
            recommended_action: "Urgent clinical evaluation",
            priority: EventPriority::High,
        },
        TriggerType::AdherenceCrisis => MessageTemplate {
            title: "Adherence Crisis Alert",
            recommended_action: "Case manager intervention",
            priority: EventPriority::Medium,
        },
        TriggerType::HighNoShowRisk => MessageTemplate {
            title: "High No-Show Risk",
            recommended_action: "Patient contact and reminder",
            priority: EventPriority::Medium,
        },
    }
}

/// Render the message body for a fired trigger
pub fn render_message(trigger: &EscalationTrigger, subject_id: &str, risk_score: f64) -> String {
    match trigger.trigger_type {
        TriggerType::CriticalRiskScore | TriggerType::HighRiskScore => format!(
            "Patient {} has been identified as high risk (score: {}). Immediate review required.",
            subject_id, risk_score
        ),
        TriggerType::CriticalVitals => format!(
            "Patient {} has critical vitals readings: {}. Immediate intervention required.",
            subject_id,
            trigger.vitals_details.as_deref().unwrap_or("N/A")
        ),
        TriggerType::RapidRiskIncrease => format!(
            "Patient {} shows rapid deterioration (risk increase: {} points).",
            subject_id,
            trigger.risk_increase.unwrap_or(0.0)
        ),
        TriggerType::AdherenceCrisis => format!(
            "Patient {} has critical adherence issues (score: {}). Care coordination needed.",
            subject_id,
            trigger.adherence_score.unwrap_or(0.0)
        ),
        TriggerType::HighNoShowRisk => format!(
            "Patient {} at high risk of missing appointment (probability: {}). Outreach recommended.",
            subject_id,
            trigger.no_show_probability.unwrap_or(0.0)
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{EscalationLevel, Urgency};

    #[test]
    fn score_rules_share_the_high_risk_template() {
        let critical = template_for(TriggerType::CriticalRiskScore);
        let high = template_for(TriggerType::HighRiskScore);
        assert_eq!(critical.title, "High Risk Patient Alert");
        assert_eq!(high.title, critical.title);
        assert_eq!(high.recommended_action, "Clinical assessment within 2 hours");
    }

    #[test]
    fn vitals_template_is_critical_priority() {
        let template = template_for(TriggerType::CriticalVitals);
        assert!(matches!(template.priority, EventPriority::Critical));
        assert_eq!(template.recommended_action, "Emergency assessment");
    }

    #[test]
    fn rapid_deterioration_message_carries_the_delta() {
        let mut trigger = EscalationTrigger::new(
            TriggerType::RapidRiskIncrease,
            EscalationLevel::Physician,
            Urgency::Urgent,
            "Rapid risk increase: 18 points",
        );
        trigger.risk_increase = Some(18.0);
        let message = render_message(&trigger, "P0042", 68.0);
        assert_eq!(
            message,
            "Patient P0042 shows rapid deterioration (risk increase: 18 points)."
        );
    }

    #[test]
    fn vitals_message_embeds_the_details_string() {
        let mut trigger = EscalationTrigger::new(
            TriggerType::CriticalVitals,
            EscalationLevel::Emergency,
            Urgency::Immediate,
            "Critical vital signs detected",
        );
        trigger.vitals_details = Some("Consistently abnormal heart rate".to_string());
        let message = render_message(&trigger, "P0042", 90.0);
        assert!(message.contains("critical vitals readings: Consistently abnormal heart rate"));
    }
}
