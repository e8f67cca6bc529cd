//! Compliance score aggregation - weighted rollup per standard
//!
//! Consumes count pairs from the persistence layer's group-by queries and
//! recomputes the whole score row for a standard. Recomputation is wholesale,
//! not incremental: re-running with unchanged counts yields an identical row.
//!
//! Global invariants enforced:
//! - Empty populations score 100, never divide by zero
//! - Weights sum to exactly 1.0
//! - One row per standard, replaced wholesale (upsert by standard)

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const RISK_WEIGHT: f64 = 0.20;
pub const INCIDENT_WEIGHT: f64 = 0.20;
pub const LEGAL_WEIGHT: f64 = 0.25;
pub const OBJECTIVE_WEIGHT: f64 = 0.15;
pub const ACTION_WEIGHT: f64 = 0.20;

/// Regulatory domain scoping risks, incidents, legal requirements,
/// objectives, and actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Standard {
    Safety,
    Environmental,
    Quality,
}

impl Standard {
    pub const ALL: [Standard; 3] = [Standard::Safety, Standard::Environmental, Standard::Quality];

    pub fn as_str(&self) -> &'static str {
        match self {
            Standard::Safety => "SAFETY",
            Standard::Environmental => "ENVIRONMENTAL",
            Standard::Quality => "QUALITY",
        }
    }
}

/// A counted sub-population: total items and how many are in the
/// compliant state
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct Population {
    pub total: u64,
    pub compliant: u64,
}

/// Count pairs for one standard, as returned by the persistence layer.
/// Compliant means: risks mitigated, incidents closed, legal requirements
/// compliant or not-applicable, objectives achieved, actions completed
/// or verified.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct StandardCounts {
    pub standard: Standard,
    pub risks: Population,
    pub incidents: Population,
    pub legal: Population,
    pub objectives: Population,
    pub actions: Population,
}

/// One compliance score row, keyed by standard
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct ComplianceScore {
    pub standard: Standard,
    pub risk_score: u32,
    pub incident_score: u32,
    pub legal_score: u32,
    pub objective_score: u32,
    pub action_score: u32,
    pub overall_score: u32,
    pub total_items: u64,
    pub compliant_items: u64,
    pub calculated_at: DateTime<Utc>,
}

impl ComplianceScore {
    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("failed to serialize compliance score to JSON")
    }
}

/// Sub-score for one population: compliant/total*100 rounded to the nearest
/// integer, or 100 when there is nothing to comply with
pub fn sub_score(population: Population) -> u32 {
    if population.total == 0 {
        return 100;
    }
    (population.compliant as f64 / population.total as f64 * 100.0).round() as u32
}

/// Weighted overall score from the five rounded sub-scores
pub fn overall_score(risk: u32, incident: u32, legal: u32, objective: u32, action: u32) -> u32 {
    (RISK_WEIGHT * f64::from(risk)
        + INCIDENT_WEIGHT * f64::from(incident)
        + LEGAL_WEIGHT * f64::from(legal)
        + OBJECTIVE_WEIGHT * f64::from(objective)
        + ACTION_WEIGHT * f64::from(action))
    .round() as u32
}

/// Recompute the full score row for one standard
pub fn aggregate(counts: &StandardCounts, calculated_at: DateTime<Utc>) -> ComplianceScore {
    let risk_score = sub_score(counts.risks);
    let incident_score = sub_score(counts.incidents);
    let legal_score = sub_score(counts.legal);
    let objective_score = sub_score(counts.objectives);
    let action_score = sub_score(counts.actions);

    let populations = [
        counts.risks,
        counts.incidents,
        counts.legal,
        counts.objectives,
        counts.actions,
    ];

    ComplianceScore {
        standard: counts.standard,
        risk_score,
        incident_score,
        legal_score,
        objective_score,
        action_score,
        overall_score: overall_score(
            risk_score,
            incident_score,
            legal_score,
            objective_score,
            action_score,
        ),
        total_items: populations.iter().map(|p| p.total).sum(),
        compliant_items: populations.iter().map(|p| p.compliant).sum(),
        calculated_at,
    }
}

/// Scoreboard over several standards, ordered by the standard enum
/// (SAFETY, ENVIRONMENTAL, QUALITY) for deterministic output
pub fn scoreboard(counts: &[StandardCounts], calculated_at: DateTime<Utc>) -> Vec<ComplianceScore> {
    let mut scores: Vec<ComplianceScore> =
        counts.iter().map(|c| aggregate(c, calculated_at)).collect();
    scores.sort_by_key(|s| {
        Standard::ALL
            .iter()
            .position(|x| *x == s.standard)
            .unwrap_or(Standard::ALL.len())
    });
    scores
}
