//! Risk scoring - likelihood x severity x detectability
//!
//! One authoritative implementation of the risk formula, shared by generic
//! risks and process risks. A 2-factor variant backs the 5x5 matrix view;
//! the two variants are never mixed for the same record.
//!
//! Global invariants enforced:
//! - Deterministic scoring
//! - Factors are clamped to [1,5], never rejected
//! - Level is a non-decreasing step function of score

use serde::{Deserialize, Serialize};

/// Inclusive upper bounds for the 3-factor scale (score range [1,125])
pub const LOW_MAX: i64 = 8;
pub const MEDIUM_MAX: i64 = 27;
pub const HIGH_MAX: i64 = 64;

/// Inclusive upper bounds for the 2-factor matrix scale (score range [1,25])
pub const MATRIX_LOW_MAX: i64 = 4;
pub const MATRIX_MEDIUM_MAX: i64 = 9;
pub const MATRIX_HIGH_MAX: i64 = 15;

/// Risk level classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
            RiskLevel::Critical => "CRITICAL",
        }
    }
}

/// Derived fields persisted on a risk-like entity
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct RiskDerived {
    pub score: i64,
    pub level: RiskLevel,
}

/// Clamp a scoring factor into [1,5]
pub fn clamp_factor(value: i64) -> i64 {
    value.clamp(1, 5)
}

/// 3-factor risk score: likelihood x severity x detectability
pub fn risk_score(likelihood: i64, severity: i64, detectability: i64) -> i64 {
    clamp_factor(likelihood) * clamp_factor(severity) * clamp_factor(detectability)
}

/// Classify a 3-factor score into a risk level
pub fn risk_level(score: i64) -> RiskLevel {
    if score <= LOW_MAX {
        RiskLevel::Low
    } else if score <= MEDIUM_MAX {
        RiskLevel::Medium
    } else if score <= HIGH_MAX {
        RiskLevel::High
    } else {
        RiskLevel::Critical
    }
}

/// Compute the derived fields for a 3-factor risk entity
pub fn score_risk(likelihood: i64, severity: i64, detectability: i64) -> RiskDerived {
    let score = risk_score(likelihood, severity, detectability);
    RiskDerived {
        score,
        level: risk_level(score),
    }
}

/// 2-factor matrix score: likelihood x severity
pub fn matrix_score(likelihood: i64, severity: i64) -> i64 {
    clamp_factor(likelihood) * clamp_factor(severity)
}

/// Classify a 2-factor score into a risk level
pub fn matrix_level(score: i64) -> RiskLevel {
    if score <= MATRIX_LOW_MAX {
        RiskLevel::Low
    } else if score <= MATRIX_MEDIUM_MAX {
        RiskLevel::Medium
    } else if score <= MATRIX_HIGH_MAX {
        RiskLevel::High
    } else {
        RiskLevel::Critical
    }
}

/// Compute the derived fields for a 5x5 matrix view
pub fn score_matrix(likelihood: i64, severity: i64) -> RiskDerived {
    let score = matrix_score(likelihood, severity);
    RiskDerived {
        score,
        level: matrix_level(score),
    }
}

/// Residual risk after applying a control with the given effectiveness
/// percentage (clamped to [0,100])
pub fn residual_risk(score: i64, effectiveness_percent: f64) -> i64 {
    let effectiveness = effectiveness_percent.clamp(0.0, 100.0);
    (score as f64 * (1.0 - effectiveness / 100.0)).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_range_and_clamping() {
        assert_eq!(risk_score(1, 1, 1), 1);
        assert_eq!(risk_score(5, 5, 5), 125);
        // Out-of-range factors clamp, never reject
        assert_eq!(risk_score(0, 3, 3), 9);
        assert_eq!(risk_score(-4, 99, 3), 15);
        assert_eq!(risk_score(7, 7, 7), 125);
    }

    #[test]
    fn test_level_boundaries() {
        assert_eq!(risk_level(8), RiskLevel::Low);
        assert_eq!(risk_level(9), RiskLevel::Medium);
        assert_eq!(risk_level(27), RiskLevel::Medium);
        assert_eq!(risk_level(28), RiskLevel::High);
        assert_eq!(risk_level(64), RiskLevel::High);
        assert_eq!(risk_level(65), RiskLevel::Critical);
    }

    #[test]
    fn test_level_monotonic_in_score() {
        let rank = |level: RiskLevel| match level {
            RiskLevel::Low => 0,
            RiskLevel::Medium => 1,
            RiskLevel::High => 2,
            RiskLevel::Critical => 3,
        };
        let mut prev = 0;
        for score in 1..=125 {
            let current = rank(risk_level(score));
            assert!(current >= prev, "level regressed at score {}", score);
            prev = current;
        }
    }

    #[test]
    fn test_matrix_level_boundaries() {
        assert_eq!(matrix_level(4), RiskLevel::Low);
        assert_eq!(matrix_level(5), RiskLevel::Medium);
        assert_eq!(matrix_level(9), RiskLevel::Medium);
        assert_eq!(matrix_level(10), RiskLevel::High);
        assert_eq!(matrix_level(15), RiskLevel::High);
        assert_eq!(matrix_level(16), RiskLevel::Critical);
    }

    #[test]
    fn test_score_risk_example() {
        let derived = score_risk(4, 5, 2);
        assert_eq!(derived.score, 40);
        assert_eq!(derived.level, RiskLevel::High);
    }

    #[test]
    fn test_residual_risk() {
        assert_eq!(residual_risk(40, 75.0), 10);
        assert_eq!(residual_risk(40, 0.0), 40);
        assert_eq!(residual_risk(40, 100.0), 0);
        // Effectiveness clamps to [0,100]
        assert_eq!(residual_risk(40, 150.0), 0);
        assert_eq!(residual_risk(40, -10.0), 40);
    }

    #[test]
    fn test_level_serializes_to_host_vocabulary() {
        let json = serde_json::to_string(&RiskLevel::Critical).unwrap();
        assert_eq!(json, "\"CRITICAL\"");
        assert_eq!(RiskLevel::Critical.as_str(), "CRITICAL");
    }
}
