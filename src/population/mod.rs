//! Population-level aggregation over risk assessments.
//!
//! Pure reductions over assessment snapshots: a distribution overview
//! across the current population and a per-subject score trend over
//! assessment history.

use crate::core::errors::{Error, Result};
use crate::core::{RiskAssessment, RiskCategory};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Recent assessments considered when judging trend direction
const TREND_WINDOW: usize = 3;
/// Score movement below this magnitude counts as stable
const TREND_HYSTERESIS: f64 = 5.0;

/// Direction of a subject's risk trajectory
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Worsening,
    Improving,
    Stable,
}

/// Risk distribution across the current population
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PopulationOverview {
    pub total_subjects: usize,
    pub average_score: f64,
    pub category_counts: BTreeMap<RiskCategory, usize>,
    pub high_risk_count: usize,
    pub high_risk_percentage: f64,
    pub highest_risk_subject: String,
    pub highest_risk_score: f64,
    pub generated_at: DateTime<Utc>,
}

/// One subject's score trajectory over their assessment history
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RiskTrend {
    pub subject_id: String,
    pub current_score: f64,
    pub direction: TrendDirection,
    /// Average score movement per assessment, first to last
    pub rate_of_change: f64,
    pub peak_score: f64,
    pub lowest_score: f64,
    /// Population standard deviation of the scores
    pub volatility: f64,
    pub assessment_count: usize,
    pub last_assessed: DateTime<Utc>,
}

/// Summarize the risk distribution over one assessment per subject.
///
/// Callers pass the latest assessment of each subject; duplicates are
/// not collapsed here.
pub fn population_overview(assessments: &[RiskAssessment]) -> Result<PopulationOverview> {
    if assessments.is_empty() {
        return Err(Error::InsufficientHistory {
            required: 1,
            actual: 0,
        });
    }

    let total = assessments.len();
    let average_score =
        assessments.iter().map(|a| a.overall_score).sum::<f64>() / total as f64;

    let mut category_counts = BTreeMap::new();
    for assessment in assessments {
        *category_counts.entry(assessment.category).or_insert(0) += 1;
    }
    let high_risk_count = category_counts
        .get(&RiskCategory::High)
        .copied()
        .unwrap_or(0);

    // non-empty, so max_by always yields a value
    let highest = assessments
        .iter()
        .max_by(|a, b| a.overall_score.total_cmp(&b.overall_score))
        .ok_or(Error::InsufficientHistory {
            required: 1,
            actual: 0,
        })?;

    Ok(PopulationOverview {
        total_subjects: total,
        average_score,
        category_counts,
        high_risk_count,
        high_risk_percentage: high_risk_count as f64 / total as f64 * 100.0,
        highest_risk_subject: highest.subject_id.clone(),
        highest_risk_score: highest.overall_score,
        generated_at: Utc::now(),
    })
}

/// Characterize one subject's risk trajectory. Needs at least two
/// assessments; history order does not matter, sorting happens here.
pub fn risk_trend(subject_id: &str, history: &[RiskAssessment]) -> Result<RiskTrend> {
    if history.len() < 2 {
        return Err(Error::InsufficientHistory {
            required: 2,
            actual: history.len(),
        });
    }

    let mut assessments: Vec<&RiskAssessment> = history.iter().collect();
    assessments.sort_by_key(|a| a.assessed_at);
    let scores: Vec<f64> = assessments.iter().map(|a| a.overall_score).collect();

    let direction = trend_direction(&scores);
    let rate_of_change = (scores[scores.len() - 1] - scores[0]) / scores.len() as f64;

    let peak_score = scores.iter().copied().fold(f64::MIN, f64::max);
    let lowest_score = scores.iter().copied().fold(f64::MAX, f64::min);

    Ok(RiskTrend {
        subject_id: subject_id.to_string(),
        current_score: scores[scores.len() - 1],
        direction,
        rate_of_change: round2(rate_of_change),
        peak_score,
        lowest_score,
        volatility: round2(population_std_dev(&scores)),
        assessment_count: assessments.len(),
        last_assessed: assessments[assessments.len() - 1].assessed_at,
    })
}

/// Compare the mean of the trailing window against the mean of the
/// window before it (or whatever earlier scores exist). Movement within
/// the hysteresis band reads as stable, as does a history too short to
/// have any earlier scores.
fn trend_direction(scores: &[f64]) -> TrendDirection {
    let recent_start = scores.len().saturating_sub(TREND_WINDOW);
    let recent = &scores[recent_start..];
    let earlier = if scores.len() >= 2 * TREND_WINDOW {
        &scores[scores.len() - 2 * TREND_WINDOW..recent_start]
    } else {
        &scores[..recent_start]
    };
    if earlier.is_empty() {
        return TrendDirection::Stable;
    }

    let recent_avg = mean(recent);
    let earlier_avg = mean(earlier);
    if recent_avg > earlier_avg + TREND_HYSTERESIS {
        TrendDirection::Worsening
    } else if recent_avg < earlier_avg - TREND_HYSTERESIS {
        TrendDirection::Improving
    } else {
        TrendDirection::Stable
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn population_std_dev(values: &[f64]) -> f64 {
    let mean = mean(values);
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RiskConfig;
    use crate::scoring::RiskScoringEngine;
    use chrono::Duration;

    fn assessment(subject_id: &str, score: f64, hours_ago: i64) -> RiskAssessment {
        let engine = RiskScoringEngine::new(RiskConfig::default());
        let mut assessment = engine.score(subject_id, None, None, None, None).unwrap();
        assessment.overall_score = score;
        assessment.category = if score >= 70.0 {
            RiskCategory::High
        } else if score >= 30.0 {
            RiskCategory::Medium
        } else {
            RiskCategory::Low
        };
        assessment.assessed_at = Utc::now() - Duration::hours(hours_ago);
        assessment
    }

    #[test]
    fn empty_population_is_insufficient_history() {
        let result = population_overview(&[]);
        assert!(matches!(
            result,
            Err(Error::InsufficientHistory {
                required: 1,
                actual: 0,
            })
        ));
    }

    #[test]
    fn overview_counts_categories_and_finds_the_highest() {
        let assessments = vec![
            assessment("P0001", 20.0, 3),
            assessment("P0002", 55.0, 2),
            assessment("P0003", 85.0, 1),
            assessment("P0004", 75.0, 1),
        ];
        let overview = population_overview(&assessments).unwrap();
        assert_eq!(overview.total_subjects, 4);
        assert!((overview.average_score - 58.75).abs() < 1e-9);
        assert_eq!(overview.category_counts[&RiskCategory::High], 2);
        assert_eq!(overview.high_risk_count, 2);
        assert!((overview.high_risk_percentage - 50.0).abs() < 1e-9);
        assert_eq!(overview.highest_risk_subject, "P0003");
        assert_eq!(overview.highest_risk_score, 85.0);
    }

    #[test]
    fn single_assessment_is_insufficient_for_a_trend() {
        let history = vec![assessment("P0001", 50.0, 1)];
        assert!(matches!(
            risk_trend("P0001", &history),
            Err(Error::InsufficientHistory {
                required: 2,
                actual: 1,
            })
        ));
    }

    #[test]
    fn worsening_trend_needs_more_than_the_hysteresis_band() {
        // recent mean 80, earlier mean 40 -> worsening
        let history = vec![
            assessment("P0001", 40.0, 6),
            assessment("P0001", 40.0, 5),
            assessment("P0001", 40.0, 4),
            assessment("P0001", 80.0, 3),
            assessment("P0001", 80.0, 2),
            assessment("P0001", 80.0, 1),
        ];
        let trend = risk_trend("P0001", &history).unwrap();
        assert_eq!(trend.direction, TrendDirection::Worsening);
        assert_eq!(trend.current_score, 80.0);
        assert_eq!(trend.peak_score, 80.0);
        assert_eq!(trend.lowest_score, 40.0);

        // recent mean only 3 points above earlier -> stable
        let history = vec![
            assessment("P0001", 50.0, 6),
            assessment("P0001", 50.0, 5),
            assessment("P0001", 50.0, 4),
            assessment("P0001", 53.0, 3),
            assessment("P0001", 53.0, 2),
            assessment("P0001", 53.0, 1),
        ];
        let trend = risk_trend("P0001", &history).unwrap();
        assert_eq!(trend.direction, TrendDirection::Stable);
    }

    #[test]
    fn improving_trend_with_short_history_compares_against_all_earlier() {
        let history = vec![
            assessment("P0001", 90.0, 5),
            assessment("P0001", 60.0, 3),
            assessment("P0001", 55.0, 2),
            assessment("P0001", 50.0, 1),
        ];
        let trend = risk_trend("P0001", &history).unwrap();
        assert_eq!(trend.direction, TrendDirection::Improving);
        // (50 - 90) / 4
        assert!((trend.rate_of_change - -10.0).abs() < 1e-9);
    }

    #[test]
    fn two_assessments_read_as_stable() {
        // last 3 covers both entries, leaving no earlier scores
        let history = vec![
            assessment("P0001", 30.0, 2),
            assessment("P0001", 90.0, 1),
        ];
        let trend = risk_trend("P0001", &history).unwrap();
        assert_eq!(trend.direction, TrendDirection::Stable);
        assert_eq!(trend.assessment_count, 2);
        assert!((trend.rate_of_change - 30.0).abs() < 1e-9);
        assert!((trend.volatility - 30.0).abs() < 1e-9);
    }

    #[test]
    fn history_order_does_not_matter() {
        let newest = assessment("P0001", 70.0, 1);
        let oldest = assessment("P0001", 40.0, 9);
        let middle = assessment("P0001", 50.0, 5);
        let shuffled = vec![newest.clone(), oldest, middle];
        let trend = risk_trend("P0001", &shuffled).unwrap();
        assert_eq!(trend.current_score, 70.0);
        assert_eq!(trend.last_assessed, newest.assessed_at);
        // (70 - 40) / 3
        assert!((trend.rate_of_change - 10.0).abs() < 1e-9);
    }
}
