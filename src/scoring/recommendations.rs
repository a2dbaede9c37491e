//! Risk-driver explanations and care recommendations derived from the
//! scored components.

use crate::core::{ComponentRisk, ComponentRisks, RiskCategory, RiskDriver};

/// Materiality floors: a component only appears as a risk driver when
/// its score exceeds its floor
const VITALS_DRIVER_FLOOR: f64 = 20.0;
const CHRONIC_DRIVER_FLOOR: f64 = 15.0;
const ADHERENCE_DRIVER_FLOOR: f64 = 15.0;
const NO_SHOW_DRIVER_FLOOR: f64 = 10.0;

/// Component-specific recommendations use their own, higher floors
const VITALS_RECOMMENDATION_FLOOR: f64 = 30.0;
const CHRONIC_RECOMMENDATION_FLOOR: f64 = 25.0;
const ADHERENCE_RECOMMENDATION_FLOOR: f64 = 20.0;
const NO_SHOW_RECOMMENDATION_FLOOR: f64 = 15.0;

/// Recommendations are capped to the first entries in priority order
const MAX_RECOMMENDATIONS: usize = 8;

/// Ordered risk-driver list: material components sorted descending by
/// contribution, each carrying its contributing factors
pub fn build_risk_drivers(components: &ComponentRisks) -> Vec<RiskDriver> {
    let mut drivers = Vec::new();

    if components.vitals_stability.score > VITALS_DRIVER_FLOOR {
        drivers.push(driver(
            "Vitals Stability",
            &components.vitals_stability,
            format!(
                "Vital signs instability (score: {:.1})",
                components.vitals_stability.score
            ),
        ));
    }
    if components.chronic_conditions.score > CHRONIC_DRIVER_FLOOR {
        drivers.push(driver(
            "Chronic Conditions",
            &components.chronic_conditions,
            format!(
                "Chronic health conditions (score: {:.1})",
                components.chronic_conditions.score
            ),
        ));
    }
    if components.adherence.score > ADHERENCE_DRIVER_FLOOR {
        drivers.push(driver(
            "Adherence",
            &components.adherence,
            format!(
                "Poor treatment adherence (score: {:.1})",
                components.adherence.score
            ),
        ));
    }
    if components.no_show.score > NO_SHOW_DRIVER_FLOOR {
        drivers.push(driver(
            "Appointment Attendance",
            &components.no_show,
            format!(
                "High no-show probability (score: {:.1})",
                components.no_show.score
            ),
        ));
    }

    drivers.sort_by(|a, b| {
        b.contribution
            .partial_cmp(&a.contribution)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    drivers
}

fn driver(category: &str, component: &ComponentRisk, description: String) -> RiskDriver {
    RiskDriver {
        category: category.to_string(),
        contribution: component.score,
        description,
        factors: component.contributing_factors.clone(),
    }
}

/// Category boilerplate plus component-triggered items, deduplicated and
/// capped. Priority order: category items first, then vitals, chronic,
/// adherence, no-show.
pub fn build_recommendations(category: RiskCategory, components: &ComponentRisks) -> Vec<String> {
    let mut recommendations: Vec<String> = Vec::new();
    let mut push = |text: &str, recs: &mut Vec<String>| {
        if !recs.iter().any(|existing| existing == text) {
            recs.push(text.to_string());
        }
    };

    match category {
        RiskCategory::High => {
            push("Immediate clinical review required", &mut recommendations);
            push(
                "Consider hospital admission for close monitoring",
                &mut recommendations,
            );
            push("Implement intensive case management", &mut recommendations);
        }
        RiskCategory::Medium => {
            push("Schedule follow-up within 48 hours", &mut recommendations);
            push("Increase monitoring frequency", &mut recommendations);
            push("Consider home health visit", &mut recommendations);
        }
        RiskCategory::Low => {
            push("Continue routine monitoring", &mut recommendations);
            push("Maintain current care plan", &mut recommendations);
        }
    }

    if components.vitals_stability.score > VITALS_RECOMMENDATION_FLOOR {
        push(
            "Address vital signs abnormalities immediately",
            &mut recommendations,
        );
        push("Review and adjust medications", &mut recommendations);
    }
    if components.chronic_conditions.score > CHRONIC_RECOMMENDATION_FLOOR {
        push("Optimize chronic disease management", &mut recommendations);
        push("Consider specialist consultation", &mut recommendations);
    }
    if components.adherence.score > ADHERENCE_RECOMMENDATION_FLOOR {
        push(
            "Implement adherence improvement strategies",
            &mut recommendations,
        );
        push("Address barriers to care", &mut recommendations);
    }
    if components.no_show.score > NO_SHOW_RECOMMENDATION_FLOOR {
        push("Implement appointment reminder system", &mut recommendations);
        push("Consider telehealth options", &mut recommendations);
    }

    recommendations.truncate(MAX_RECOMMENDATIONS);
    recommendations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{AdherenceLevel, NoShowRiskCategory, RiskBreakdown};
    use pretty_assertions::assert_eq;

    fn component(score: f64, factors: &[&str]) -> ComponentRisk {
        ComponentRisk {
            score,
            weight: 0.25,
            breakdown: RiskBreakdown::Adherence {
                adherence_score: 50.0,
                adherence_level: AdherenceLevel::Fair,
            },
            contributing_factors: factors.iter().map(|f| f.to_string()).collect(),
        }
    }

    fn components(vitals: f64, chronic: f64, adherence: f64, no_show: f64) -> ComponentRisks {
        ComponentRisks {
            vitals_stability: component(vitals, &["Concerning heart rate trend (increasing)"]),
            chronic_conditions: component(chronic, &["diabetes: 14.0"]),
            adherence: component(adherence, &["Overall adherence: 40%"]),
            no_show: ComponentRisk {
                score: no_show,
                weight: 0.10,
                breakdown: RiskBreakdown::NoShow {
                    probability: 0.5,
                    category: NoShowRiskCategory::Medium,
                },
                contributing_factors: vec!["No-show probability: 0.5%".to_string()],
            },
        }
    }

    #[test]
    fn drivers_are_floored_and_sorted_descending() {
        let drivers = build_risk_drivers(&components(46.0, 5.3, 35.0, 8.5));
        let categories: Vec<&str> = drivers.iter().map(|d| d.category.as_str()).collect();
        // chronic (5.3 <= 15) and no-show (8.5 <= 10) stay below their floors
        assert_eq!(categories, vec!["Vitals Stability", "Adherence"]);
        assert_eq!(drivers[0].contribution, 46.0);
        assert_eq!(
            drivers[0].factors,
            vec!["Concerning heart rate trend (increasing)".to_string()]
        );
    }

    #[test]
    fn floor_values_are_exclusive() {
        let drivers = build_risk_drivers(&components(20.0, 15.0, 15.0, 10.0));
        assert!(drivers.is_empty(), "scores at the floor must not drive");
    }

    #[test]
    fn high_category_recommendations_lead_and_cap_at_eight() {
        let recs = build_recommendations(RiskCategory::High, &components(50.0, 30.0, 40.0, 20.0));
        assert_eq!(recs.len(), 8);
        assert_eq!(recs[0], "Immediate clinical review required");
        assert_eq!(recs[3], "Address vital signs abnormalities immediately");
        // the no-show items fall off the cap
        assert!(!recs.contains(&"Consider telehealth options".to_string()));
    }

    #[test]
    fn low_category_keeps_routine_guidance() {
        let recs = build_recommendations(RiskCategory::Low, &components(5.0, 5.0, 5.0, 5.0));
        assert_eq!(
            recs,
            vec![
                "Continue routine monitoring".to_string(),
                "Maintain current care plan".to_string(),
            ]
        );
    }
}
