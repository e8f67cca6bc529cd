//! Environmental aspect significance scoring
//!
//! Same 3-factor product as risk scoring but with aspect semantics
//! (scale x frequency x legal impact) plus two optional modifiers that
//! compose sequentially, rounding after each step.
//!
//! Global invariants enforced:
//! - Deterministic scoring
//! - Factors and modifiers are clamped to [1,5], never rejected
//! - The significance flag uses a fixed threshold independent of level bands

use crate::risk::clamp_factor;
use serde::{Deserialize, Serialize};

/// Inclusive upper bounds for significance levels
pub const NEGLIGIBLE_MAX: i64 = 8;
pub const LOW_MAX: i64 = 27;
pub const MODERATE_MAX: i64 = 64;
pub const HIGH_MAX: i64 = 100;

/// Scores strictly above this are flagged significant. Fixed threshold;
/// intentionally overlaps the LOW/MODERATE band boundary (source behavior).
pub const SIGNIFICANCE_FLAG_THRESHOLD: i64 = 27;

/// Modifier value that leaves the base score untouched
const NEUTRAL_MODIFIER: i64 = 3;

/// Significance level classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignificanceLevel {
    Negligible,
    Low,
    Moderate,
    High,
    Critical,
}

impl SignificanceLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignificanceLevel::Negligible => "NEGLIGIBLE",
            SignificanceLevel::Low => "LOW",
            SignificanceLevel::Moderate => "MODERATE",
            SignificanceLevel::High => "HIGH",
            SignificanceLevel::Critical => "CRITICAL",
        }
    }
}

/// Derived fields persisted on an environmental aspect
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct AspectDerived {
    pub score: i64,
    pub level: SignificanceLevel,
    pub is_significant: bool,
}

/// Apply one optional modifier: scale by `1 + (factor - 3) * 0.1`, rounding
/// to the nearest integer before the next modifier sees the result
fn apply_modifier(score: i64, factor: Option<i64>) -> i64 {
    match factor {
        Some(raw) => {
            let factor = clamp_factor(raw);
            if factor == NEUTRAL_MODIFIER {
                score
            } else {
                (score as f64 * (1.0 + (factor - NEUTRAL_MODIFIER) as f64 * 0.1)).round() as i64
            }
        }
        None => score,
    }
}

/// Significance score: scale x frequency x legal impact, then sequential
/// reversibility and stakeholder-concern modifiers
pub fn significance_score(
    scale: i64,
    frequency: i64,
    legal_impact: i64,
    reversibility: Option<i64>,
    stakeholder_concern: Option<i64>,
) -> i64 {
    let base = clamp_factor(scale) * clamp_factor(frequency) * clamp_factor(legal_impact);
    let score = apply_modifier(base, reversibility);
    apply_modifier(score, stakeholder_concern)
}

/// Classify a significance score into a level
pub fn significance_level(score: i64) -> SignificanceLevel {
    if score <= NEGLIGIBLE_MAX {
        SignificanceLevel::Negligible
    } else if score <= LOW_MAX {
        SignificanceLevel::Low
    } else if score <= MODERATE_MAX {
        SignificanceLevel::Moderate
    } else if score <= HIGH_MAX {
        SignificanceLevel::High
    } else {
        SignificanceLevel::Critical
    }
}

/// Whether an aspect requires management action
pub fn is_significant(score: i64) -> bool {
    score > SIGNIFICANCE_FLAG_THRESHOLD
}

/// Compute the derived fields for an environmental aspect
pub fn score_aspect(
    scale: i64,
    frequency: i64,
    legal_impact: i64,
    reversibility: Option<i64>,
    stakeholder_concern: Option<i64>,
) -> AspectDerived {
    let score = significance_score(
        scale,
        frequency,
        legal_impact,
        reversibility,
        stakeholder_concern,
    );
    AspectDerived {
        score,
        level: significance_level(score),
        is_significant: is_significant(score),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_score_without_modifiers() {
        assert_eq!(significance_score(3, 4, 2, None, None), 24);
        assert_eq!(significance_score(5, 5, 5, None, None), 125);
        // Out-of-range factors clamp
        assert_eq!(significance_score(0, 9, 3, None, None), 15);
    }

    #[test]
    fn test_neutral_modifier_is_identity() {
        assert_eq!(significance_score(4, 4, 4, Some(3), Some(3)), 64);
        assert_eq!(significance_score(4, 4, 4, None, None), 64);
    }

    #[test]
    fn test_modifiers_compose_sequentially_with_rounding() {
        // base 27, reversibility 5 -> 27 * 1.2 = 32.4 -> 32
        // stakeholder 4 -> 32 * 1.1 = 35.2 -> 35
        assert_eq!(significance_score(3, 3, 3, Some(5), Some(4)), 35);
        // Single-pass multiplication would give round(27 * 1.2 * 1.1) = 36
    }

    #[test]
    fn test_modifier_can_reduce_score() {
        // base 27, reversibility 1 -> 27 * 0.8 = 21.6 -> 22
        assert_eq!(significance_score(3, 3, 3, Some(1), None), 22);
    }

    #[test]
    fn test_level_boundaries() {
        assert_eq!(significance_level(8), SignificanceLevel::Negligible);
        assert_eq!(significance_level(9), SignificanceLevel::Low);
        assert_eq!(significance_level(27), SignificanceLevel::Low);
        assert_eq!(significance_level(28), SignificanceLevel::Moderate);
        assert_eq!(significance_level(64), SignificanceLevel::Moderate);
        assert_eq!(significance_level(65), SignificanceLevel::High);
        assert_eq!(significance_level(100), SignificanceLevel::High);
        assert_eq!(significance_level(101), SignificanceLevel::Critical);
    }

    #[test]
    fn test_significance_flag_threshold() {
        assert!(!is_significant(27));
        assert!(is_significant(28));
    }

    #[test]
    fn test_score_aspect_derived_fields() {
        let derived = score_aspect(4, 3, 3, None, None);
        assert_eq!(derived.score, 36);
        assert_eq!(derived.level, SignificanceLevel::Moderate);
        assert!(derived.is_significant);
    }
}
