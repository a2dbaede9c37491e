//! Risk aggregation engine.
//!
//! Combines four component risk evaluations (vitals stability, chronic
//! conditions, treatment adherence, appointment no-show) into a single
//! categorized [`RiskAssessment`]. Scoring is a pure function of its
//! inputs: no shared mutable state, safe for unlimited parallel use.
//!
//! A missing or failed collaborator input never aborts scoring; each
//! component falls back to a documented neutral default. Only a missing
//! subject id is a hard failure.

pub mod recommendations;

use crate::config::RiskConfig;
use crate::core::inputs::{AdherenceInput, NoShowInput, PatientProfile, VitalsInput};
use crate::core::{
    AdherenceLevel, ComponentRisk, ComponentRisks, ConditionContribution, Error,
    NoShowRiskCategory, Result, RiskAssessment, RiskBreakdown, RiskCategory,
};
use chrono::Utc;

/// Stability score assumed when the vitals collaborator is unavailable
const DEFAULT_STABILITY_SCORE: f64 = 50.0;
/// Adherence component risk assumed when adherence data is unavailable
const DEFAULT_ADHERENCE_RISK: f64 = 35.0;
/// Raw adherence score recorded alongside the default adherence risk
const DEFAULT_ADHERENCE_SCORE: f64 = 50.0;
/// No-show component risk assumed when no prediction is available
const DEFAULT_NO_SHOW_RISK: f64 = 20.0;
/// No-show probability recorded alongside the default no-show risk
const DEFAULT_NO_SHOW_PROBABILITY: f64 = 0.2;

/// Risk points added per concerning vital trend
const TREND_RISK_POINTS: f64 = 5.0;
/// Risk points added per consistently abnormal vital
const ABNORMALITY_RISK_POINTS: f64 = 8.0;
/// Scale factor turning a 0-1 condition severity into risk points
const CONDITION_RISK_SCALE: f64 = 20.0;
/// Flat risk added when adherence level is critical
const CRITICAL_ADHERENCE_PENALTY: f64 = 10.0;
/// Flat risk added when adherence level is poor
const POOR_ADHERENCE_PENALTY: f64 = 5.0;
/// At most this many vitals factors are reported
const MAX_VITALS_FACTORS: usize = 5;

/// Round to one decimal place, matching the precision of all reported
/// component and overall scores
pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Deterministic weighted scoring over the four risk components
pub struct RiskScoringEngine {
    config: RiskConfig,
}

impl RiskScoringEngine {
    pub fn new(config: RiskConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RiskConfig {
        &self.config
    }

    /// Produce a complete risk assessment for one subject.
    ///
    /// All collaborator inputs are optional; absence substitutes the
    /// neutral default for that component. A blank subject id fails with
    /// [`Error::MissingInput`].
    pub fn score(
        &self,
        subject_id: &str,
        profile: Option<&PatientProfile>,
        vitals: Option<&VitalsInput>,
        adherence: Option<&AdherenceInput>,
        no_show: Option<&NoShowInput>,
    ) -> Result<RiskAssessment> {
        if subject_id.trim().is_empty() {
            return Err(Error::missing_input("subject_id"));
        }

        let default_profile = PatientProfile::default();
        let profile = match profile {
            Some(profile) => profile,
            None => {
                log::debug!(
                    "No patient profile for {}; using neutral demographics",
                    subject_id
                );
                &default_profile
            }
        };

        let vitals_risk = self.vitals_component(vitals);
        let chronic_risk = self.chronic_component(profile);
        let adherence_risk = self.adherence_component(adherence);
        let no_show_risk = self.no_show_component(no_show);

        // Components already carry their own weight factor; the overall
        // score is a plain sum with no further capping.
        let overall_score = round1(
            vitals_risk.score + chronic_risk.score + adherence_risk.score + no_show_risk.score,
        );
        let category = self.categorize(overall_score);

        let component_risks = ComponentRisks {
            vitals_stability: vitals_risk,
            chronic_conditions: chronic_risk,
            adherence: adherence_risk,
            no_show: no_show_risk,
        };

        let risk_drivers = recommendations::build_risk_drivers(&component_risks);
        let recs = recommendations::build_recommendations(category, &component_risks);

        Ok(RiskAssessment {
            subject_id: subject_id.to_string(),
            overall_score,
            category,
            color_indicator: category.color().to_string(),
            urgency: category.urgency(),
            component_risks,
            risk_drivers,
            recommendations: recs,
            assessed_at: Utc::now(),
            next_assessment_recommended: category.next_assessment_interval().to_string(),
        })
    }

    /// Category for an overall score. Boundaries land exactly: a score
    /// equal to the medium threshold is Medium, equal to high is High.
    pub fn categorize(&self, overall_score: f64) -> RiskCategory {
        let thresholds = &self.config.thresholds;
        if overall_score >= thresholds.high {
            RiskCategory::High
        } else if overall_score >= thresholds.medium {
            RiskCategory::Medium
        } else {
            RiskCategory::Low
        }
    }

    /// Vitals component: inverted stability plus flat points per
    /// concerning trend and per abnormal vital.
    ///
    /// The component weight applies to the stability term only, while the
    /// 100-point cap applies to the sum of all three terms. That asymmetry
    /// (the other components weight the whole term) is preserved observed
    /// behavior; downstream trigger thresholds are calibrated against it.
    pub fn vitals_component(&self, vitals: Option<&VitalsInput>) -> ComponentRisk {
        let weight = self.config.weights.vitals_stability;

        let (stability_score, trend_count, abnormal_count) = match vitals {
            Some(input) => (
                input.stability_score,
                input.concerning_trend_count(),
                input.abnormal_count(),
            ),
            None => {
                log::debug!("No vitals input; assuming moderate stability");
                (DEFAULT_STABILITY_SCORE, 0, 0)
            }
        };

        let base_risk = (100.0 - stability_score) * weight;
        let trend_risk = trend_count as f64 * TREND_RISK_POINTS;
        let abnormality_risk = abnormal_count as f64 * ABNORMALITY_RISK_POINTS;
        let score = (base_risk + trend_risk + abnormality_risk).clamp(0.0, 100.0);

        ComponentRisk {
            score: round1(score),
            weight,
            breakdown: RiskBreakdown::Vitals {
                base_stability_risk: round1(base_risk),
                trend_risk: round1(trend_risk),
                abnormality_risk: round1(abnormality_risk),
            },
            contributing_factors: vitals_factors(vitals),
        }
    }

    /// Chronic/demographic component: severity-scaled condition points
    /// weighted by the chronic weight, plus an age-band term weighted by
    /// the age weight
    pub fn chronic_component(&self, profile: &PatientProfile) -> ComponentRisk {
        let chronic_weight = self.config.weights.chronic_conditions;
        let age_weight = self.config.weights.age;

        let mut condition_names: Vec<&String> = profile.chronic_conditions.keys().collect();
        condition_names.sort();

        let mut raw_condition_risk = 0.0;
        let mut conditions = Vec::with_capacity(condition_names.len());
        for name in condition_names {
            let severity = profile.chronic_conditions[name].value();
            let contribution = self.config.condition_severity(name) * severity * CONDITION_RISK_SCALE;
            raw_condition_risk += contribution;
            conditions.push(ConditionContribution {
                condition: name.clone(),
                severity,
                risk_contribution: round1(contribution),
            });
        }

        let age_band_risk = age_band_risk(profile.age);
        let condition_risk = raw_condition_risk * chronic_weight;
        let age_risk = age_band_risk * age_weight;
        let score = (condition_risk + age_risk).clamp(0.0, 100.0);

        let contributing_factors = conditions
            .iter()
            .map(|c| format!("{}: {}", c.condition, c.risk_contribution))
            .collect();

        ComponentRisk {
            score: round1(score),
            weight: chronic_weight + age_weight,
            breakdown: RiskBreakdown::Chronic {
                condition_risk: round1(condition_risk),
                age_risk: round1(age_risk),
                conditions,
                age: profile.age,
            },
            contributing_factors,
        }
    }

    /// Adherence component: inverted adherence score with flat penalties
    /// for poor and critical adherence levels
    pub fn adherence_component(&self, adherence: Option<&AdherenceInput>) -> ComponentRisk {
        let weight = self.config.weights.adherence;

        let Some(input) = adherence else {
            log::debug!("No adherence input; assuming medium adherence risk");
            return ComponentRisk {
                score: DEFAULT_ADHERENCE_RISK,
                weight,
                breakdown: RiskBreakdown::Adherence {
                    adherence_score: DEFAULT_ADHERENCE_SCORE,
                    adherence_level: AdherenceLevel::Fair,
                },
                contributing_factors: vec![format!(
                    "Overall adherence: {}%",
                    DEFAULT_ADHERENCE_SCORE
                )],
            };
        };

        let mut risk = (100.0 - input.overall_score) * weight;
        match input.adherence_level {
            AdherenceLevel::Critical => risk += CRITICAL_ADHERENCE_PENALTY,
            AdherenceLevel::Poor => risk += POOR_ADHERENCE_PENALTY,
            _ => {}
        }
        let score = risk.clamp(0.0, 100.0);

        ComponentRisk {
            score: round1(score),
            weight,
            breakdown: RiskBreakdown::Adherence {
                adherence_score: input.overall_score,
                adherence_level: input.adherence_level,
            },
            contributing_factors: vec![format!("Overall adherence: {}%", input.overall_score)],
        }
    }

    /// No-show component: direct mapping of no-show probability to risk
    pub fn no_show_component(&self, no_show: Option<&NoShowInput>) -> ComponentRisk {
        let weight = self.config.weights.no_show;

        let Some(input) = no_show else {
            log::debug!("No no-show prediction; assuming low-medium risk");
            return ComponentRisk {
                score: DEFAULT_NO_SHOW_RISK,
                weight,
                breakdown: RiskBreakdown::NoShow {
                    probability: DEFAULT_NO_SHOW_PROBABILITY,
                    category: NoShowRiskCategory::Low,
                },
                contributing_factors: vec![format!(
                    "No-show probability: {}%",
                    DEFAULT_NO_SHOW_PROBABILITY
                )],
            };
        };

        let score = (input.no_show_probability * 100.0 * weight).clamp(0.0, 100.0);

        ComponentRisk {
            score: round1(score),
            weight,
            breakdown: RiskBreakdown::NoShow {
                probability: input.no_show_probability,
                category: input.risk_category,
            },
            contributing_factors: vec![format!(
                "No-show probability: {}%",
                input.no_show_probability
            )],
        }
    }
}

/// Age-band risk step function
fn age_band_risk(age: i64) -> f64 {
    if age >= 80 {
        15.0
    } else if age >= 70 {
        10.0
    } else if age >= 60 {
        5.0
    } else if age < 18 {
        8.0
    } else {
        0.0
    }
}

/// Human-readable factors behind the vitals component, capped at five.
/// Vitals are visited in name order so output is deterministic.
fn vitals_factors(vitals: Option<&VitalsInput>) -> Vec<String> {
    let Some(input) = vitals else {
        return vec!["No vitals data available".to_string()];
    };

    let mut factors = Vec::new();

    let mut trend_names: Vec<&String> = input.trends.keys().collect();
    trend_names.sort();
    for name in trend_names {
        let trend = &input.trends[name];
        if trend.trend_concern {
            let direction = if trend.direction.is_empty() {
                "changing"
            } else {
                trend.direction.as_str()
            };
            factors.push(format!(
                "Concerning {} trend ({})",
                name.replace('_', " "),
                direction
            ));
        }
    }

    let mut abnormality_names: Vec<&String> = input.abnormalities.keys().collect();
    abnormality_names.sort();
    for name in abnormality_names {
        if input.abnormalities[name].is_abnormal {
            factors.push(format!("Consistently abnormal {}", name.replace('_', " ")));
        }
    }

    factors.truncate(MAX_VITALS_FACTORS);
    factors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::inputs::{ConditionSeverity, VitalAbnormality, VitalTrend};
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn engine() -> RiskScoringEngine {
        RiskScoringEngine::new(RiskConfig::default())
    }

    fn vitals(stability: f64, concerning: usize, abnormal: usize) -> VitalsInput {
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
    }

    #[test]
    fn blank_subject_id_is_a_hard_failure() {
        let result = engine().score("  ", None, None, None, None);
        assert!(matches!(result, Err(Error::MissingInput { .. })));
    }

    #[test]
    fn all_defaults_produce_the_documented_neutral_assessment() {
        let assessment = engine().score("P0001", None, None, None, None).unwrap();

        // vitals 17.5 (stability 50) + chronic 0 + adherence 35 + no-show 20
        assert_eq!(assessment.component_risks.vitals_stability.score, 17.5);
        assert_eq!(assessment.component_risks.chronic_conditions.score, 0.0);
        assert_eq!(assessment.component_risks.adherence.score, 35.0);
        assert_eq!(assessment.component_risks.no_show.score, 20.0);
        assert_eq!(assessment.overall_score, 72.5);
        assert_eq!(assessment.category, RiskCategory::High);
        assert_eq!(assessment.color_indicator, "red");
    }

    #[test]
    fn p0007_scenario_matches_reference_arithmetic() {
        // stability=20 with 2 concerning trends and 1 abnormal vital:
        // (100-20)*0.35 + 2*5 + 1*8 = 46.0
        let vitals = vitals(20.0, 2, 1);
        let profile = PatientProfile::default();
        let assessment = engine()
            .score("P0007", Some(&profile), Some(&vitals), None, None)
            .unwrap();

        assert_eq!(assessment.component_risks.vitals_stability.score, 46.0);
        assert_eq!(assessment.component_risks.chronic_conditions.score, 0.0);
        assert_eq!(assessment.component_risks.adherence.score, 35.0);
        assert_eq!(assessment.component_risks.no_show.score, 20.0);
        assert_eq!(assessment.overall_score, 101.0);
        assert_eq!(assessment.category, RiskCategory::High);
    }

    #[test]
    fn vitals_weight_applies_to_stability_term_only() {
        // Known asymmetry: the trend and abnormality terms are added
        // unweighted, and the 100-point cap applies to the summed total.
        // If the weight were applied to the whole term this would come
        // out at (80 + 10 + 8) * 0.35 = 34.3 instead of 46.0.
        let component = engine().vitals_component(Some(&vitals(20.0, 2, 1)));
        assert_eq!(component.score, 46.0);
        match component.breakdown {
            RiskBreakdown::Vitals {
                base_stability_risk,
                trend_risk,
                abnormality_risk,
            } => {
                assert_eq!(base_stability_risk, 28.0);
                assert_eq!(trend_risk, 10.0);
                assert_eq!(abnormality_risk, 8.0);
            }
            other => panic!("expected vitals breakdown, got {:?}", other),
        }
    }

    #[test]
    fn vitals_cap_applies_to_the_summed_terms() {
        // stability 0 with many flagged vitals: 35 + 50 + 80 = 165, capped
        let component = engine().vitals_component(Some(&vitals(0.0, 10, 10)));
        assert_eq!(component.score, 100.0);
    }

    #[test]
    fn category_boundaries_land_exactly() {
        let engine = engine();
        assert_eq!(engine.categorize(29.9), RiskCategory::Low);
        assert_eq!(engine.categorize(30.0), RiskCategory::Medium);
        assert_eq!(engine.categorize(69.9), RiskCategory::Medium);
        assert_eq!(engine.categorize(70.0), RiskCategory::High);
        assert_eq!(engine.categorize(400.0), RiskCategory::High);
    }

    #[test]
    fn chronic_component_scales_known_and_unknown_conditions() {
        let mut chronic_conditions = HashMap::new();
        chronic_conditions.insert("diabetes".to_string(), ConditionSeverity::Flag(true));
        chronic_conditions.insert("gout".to_string(), ConditionSeverity::Graded(0.5));
        let profile = PatientProfile {
            age: 75,
            chronic_conditions,
        };

        let component = engine().chronic_component(&profile);
        // diabetes: 0.7*1.0*20 = 14, gout (unknown): 0.3*0.5*20 = 3
        // condition term: 17 * 0.25 = 4.25; age band 70-79: 10 * 0.10 = 1
        assert_eq!(component.score, 5.3);
        assert_eq!(component.weight, 0.35);
        match &component.breakdown {
            RiskBreakdown::Chronic {
                condition_risk,
                age_risk,
                conditions,
                age,
            } => {
                assert_eq!(*condition_risk, 4.3);
                assert_eq!(*age_risk, 1.0);
                assert_eq!(*age, 75);
                assert_eq!(conditions.len(), 2);
                assert_eq!(conditions[0].condition, "diabetes");
                assert_eq!(conditions[0].risk_contribution, 14.0);
            }
            other => panic!("expected chronic breakdown, got {:?}", other),
        }
    }

    #[test]
    fn age_bands_follow_the_step_function() {
        assert_eq!(age_band_risk(85), 15.0);
        assert_eq!(age_band_risk(80), 15.0);
        assert_eq!(age_band_risk(72), 10.0);
        assert_eq!(age_band_risk(65), 5.0);
        assert_eq!(age_band_risk(40), 0.0);
        assert_eq!(age_band_risk(17), 8.0);
    }

    #[test]
    fn adherence_penalties_stack_on_the_weighted_term() {
        let input = AdherenceInput {
            overall_score: 20.0,
            adherence_level: AdherenceLevel::Critical,
            component_scores: HashMap::new(),
        };
        // (100-20)*0.20 + 10 = 26
        assert_eq!(engine().adherence_component(Some(&input)).score, 26.0);

        let input = AdherenceInput {
            adherence_level: AdherenceLevel::Poor,
            ..input
        };
        assert_eq!(engine().adherence_component(Some(&input)).score, 21.0);

        let input = AdherenceInput {
            adherence_level: AdherenceLevel::Good,
            ..input
        };
        assert_eq!(engine().adherence_component(Some(&input)).score, 16.0);
    }

    #[test]
    fn no_show_component_maps_probability_directly() {
        let input = NoShowInput {
            no_show_probability: 0.85,
            risk_category: NoShowRiskCategory::High,
            contributing_factors: vec![],
        };
        // 0.85 * 100 * 0.10 = 8.5
        assert_eq!(engine().no_show_component(Some(&input)).score, 8.5);
    }

    #[test]
    fn vitals_factors_are_deterministic_and_capped() {
        let mut trends = HashMap::new();
        trends.insert(
            "heart_rate".to_string(),
            VitalTrend {
                trend_concern: true,
                direction: "increasing".to_string(),
            },
        );
        trends.insert(
            "blood_pressure_systolic".to_string(),
            VitalTrend {
                trend_concern: true,
                direction: String::new(),
            },
        );
        let mut abnormalities = HashMap::new();
        abnormalities.insert(
            "oxygen_saturation".to_string(),
            VitalAbnormality { is_abnormal: true },
        );
        let input = VitalsInput {
            stability_score: 30.0,
            trends,
            abnormalities,
        };

        let factors = vitals_factors(Some(&input));
        assert_eq!(
            factors,
            vec![
                "Concerning blood pressure systolic trend (changing)".to_string(),
                "Concerning heart rate trend (increasing)".to_string(),
                "Consistently abnormal oxygen saturation".to_string(),
            ]
        );

        assert_eq!(
            vitals_factors(None),
            vec!["No vitals data available".to_string()]
        );

        let capped = vitals_factors(Some(&vitals(10.0, 4, 4)));
        assert_eq!(capped.len(), 5);
    }
}
