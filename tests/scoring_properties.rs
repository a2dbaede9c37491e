//! Property-based tests for risk scoring
//!
//! These tests verify invariants that should hold for all inputs:
//! - Every component score stays within [0, 100]
//! - Scoring is deterministic
//! - Categorization is monotone in the overall score
//! - Trigger evaluation never emits both overall-score rules at once

use careguard::*;
use proptest::prelude::*;
use std::collections::HashMap;

fn vitals_input() -> impl Strategy<Value = VitalsInput> {
    (0.0f64..=100.0, 0usize..6, 0usize..6).prop_map(|(stability, concerning, abnormal)| {
        let mut trends = HashMap::new();
        for i in 0..concerning {
            trends.insert(
                format!("vital_{}", i),
                VitalTrend {
                    trend_concern: true,
                    direction: "increasing".to_string(),
                },
            );
        }
        let mut abnormalities = HashMap::new();
        for i in 0..abnormal {
            abnormalities.insert(
                format!("vital_{}", i),
                VitalAbnormality { is_abnormal: true },
            );
        }
        VitalsInput {
            stability_score: stability,
            trends,
            abnormalities,
        }
    })
}

fn adherence_input() -> impl Strategy<Value = AdherenceInput> {
    (0.0f64..=100.0, 0usize..5).prop_map(|(score, level)| AdherenceInput {
        overall_score: score,
        adherence_level: [
            AdherenceLevel::Excellent,
            AdherenceLevel::Good,
            AdherenceLevel::Fair,
            AdherenceLevel::Poor,
            AdherenceLevel::Critical,
        ][level],
        component_scores: HashMap::new(),
    })
}

fn no_show_input() -> impl Strategy<Value = NoShowInput> {
    (0.0f64..=1.0).prop_map(|probability| NoShowInput {
        no_show_probability: probability,
        risk_category: NoShowRiskCategory::Medium,
        contributing_factors: vec![],
    })
}

fn patient_profile() -> impl Strategy<Value = PatientProfile> {
    (
        0i64..110,
        proptest::collection::hash_map(
            "[a-z_]{3,20}",
            (0.0f64..=1.0).prop_map(careguard::core::inputs::ConditionSeverity::Graded),
            0..6,
        ),
    )
        .prop_map(|(age, chronic_conditions)| PatientProfile {
            age,
            chronic_conditions,
        })
}

proptest! {
    /// Property: each component score stays within [0, 100] for any
    /// collaborator input
    #[test]
    fn prop_component_scores_stay_in_range(
        profile in patient_profile(),
        vitals in vitals_input(),
        adherence in adherence_input(),
        no_show in no_show_input(),
    ) {
        let engine = RiskScoringEngine::new(RiskConfig::default());
        let assessment = engine
            .score("P0001", Some(&profile), Some(&vitals), Some(&adherence), Some(&no_show))
            .unwrap();

        for component in [
            &assessment.component_risks.vitals_stability,
            &assessment.component_risks.chronic_conditions,
            &assessment.component_risks.adherence,
            &assessment.component_risks.no_show,
        ] {
            prop_assert!(
                (0.0..=100.0).contains(&component.score),
                "component score {} out of range",
                component.score
            );
        }
        prop_assert!(assessment.overall_score >= 0.0);
    }

    /// Property: scoring the same inputs twice yields the same assessment
    /// apart from the timestamp
    #[test]
    fn prop_scoring_is_deterministic(
        profile in patient_profile(),
        vitals in vitals_input(),
    ) {
        let engine = RiskScoringEngine::new(RiskConfig::default());
        let first = engine.score("P0001", Some(&profile), Some(&vitals), None, None).unwrap();
        let second = engine.score("P0001", Some(&profile), Some(&vitals), None, None).unwrap();

        prop_assert_eq!(first.overall_score, second.overall_score);
        prop_assert_eq!(first.category, second.category);
        prop_assert_eq!(&first.component_risks, &second.component_risks);
        prop_assert_eq!(&first.risk_drivers, &second.risk_drivers);
        prop_assert_eq!(&first.recommendations, &second.recommendations);
    }

    /// Property: category never decreases as the overall score grows
    #[test]
    fn prop_categorization_is_monotone(a in 0.0f64..=150.0, b in 0.0f64..=150.0) {
        let engine = RiskScoringEngine::new(RiskConfig::default());
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(engine.categorize(low) <= engine.categorize(high));
    }

    /// Property: the two overall-score rules are mutually exclusive, and
    /// any trigger set holds at most one of them
    #[test]
    fn prop_score_rules_are_mutually_exclusive(
        vitals in vitals_input(),
        adherence in adherence_input(),
        no_show in no_show_input(),
    ) {
        let engine = RiskScoringEngine::new(RiskConfig::default());
        let evaluator = EscalationTriggerEvaluator::new(EscalationRuleConfig::default());
        let assessment = engine
            .score("P0001", None, Some(&vitals), Some(&adherence), Some(&no_show))
            .unwrap();

        let triggers = evaluator.evaluate(&assessment, None);
        let critical = triggers
            .iter()
            .filter(|t| t.trigger_type == TriggerType::CriticalRiskScore)
            .count();
        let high = triggers
            .iter()
            .filter(|t| t.trigger_type == TriggerType::HighRiskScore)
            .count();
        prop_assert!(critical + high <= 1, "score rules fired together");

        if assessment.overall_score >= 85.0 {
            prop_assert_eq!(critical, 1);
        } else if assessment.overall_score >= 70.0 {
            prop_assert_eq!(high, 1);
        }
    }
}
