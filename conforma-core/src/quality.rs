//! Quality performance metrics - COPQ, DPMO, yields, process sigma
//!
//! Global invariants enforced:
//! - Zero denominators yield 0, never NaN or infinity
//! - Sigma is monotonically non-increasing in DPMO
//! - The DPMO/sigma lookup table is fixed contract, not configuration

use crate::numeric::round2;
use serde::{Deserialize, Serialize};

/// DPMO -> sigma lookup, DPMO descending, sigma 0.0..6.0 in 0.5 steps.
/// Values between rows are linearly interpolated.
const SIGMA_TABLE: [(f64, f64); 13] = [
    (933_193.0, 0.0),
    (841_345.0, 0.5),
    (691_462.0, 1.0),
    (500_000.0, 1.5),
    (308_538.0, 2.0),
    (158_655.0, 2.5),
    (66_807.0, 3.0),
    (22_750.0, 3.5),
    (6_210.0, 4.0),
    (1_350.0, 4.5),
    (233.0, 5.0),
    (32.0, 5.5),
    (3.4, 6.0),
];

/// Raw cost and defect counters for one reporting period (upsert key: year + month)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct QualityCounters {
    pub year: i32,
    pub month: u32,
    pub prevention_cost: f64,
    pub appraisal_cost: f64,
    pub internal_failure_cost: f64,
    pub external_failure_cost: f64,
    pub total_units: u64,
    pub defective_units: u64,
    pub defect_opportunities: u64,
}

/// Derived metrics persisted alongside the counters
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct QualityMetrics {
    pub total_copq: f64,
    pub dpmo: u64,
    pub first_pass_yield: f64,
    pub process_sigma: f64,
}

/// Cost of poor quality: sum of the four cost buckets
pub fn calculate_copq(
    prevention_cost: f64,
    appraisal_cost: f64,
    internal_failure_cost: f64,
    external_failure_cost: f64,
) -> f64 {
    round2(prevention_cost + appraisal_cost + internal_failure_cost + external_failure_cost)
}

/// Defects per million opportunities, rounded to the nearest integer.
/// Zero units or zero opportunities yields 0.
pub fn calculate_dpmo(defective_units: u64, total_units: u64, defect_opportunities: u64) -> u64 {
    if total_units == 0 || defect_opportunities == 0 {
        return 0;
    }
    let dpmo = defective_units as f64 * 1_000_000.0
        / (total_units as f64 * defect_opportunities as f64);
    dpmo.round() as u64
}

/// First-pass yield percentage. Zero units yields 0 (source behavior; the
/// "no units means 100% yield" reading was deliberately not adopted).
pub fn first_pass_yield(total_units: u64, defective_units: u64) -> f64 {
    if total_units == 0 {
        return 0.0;
    }
    round2((total_units as f64 - defective_units as f64) / total_units as f64 * 100.0)
}

/// Rolled-throughput yield: product of stage yield percentages.
/// An empty stage list yields 100.
pub fn rolled_throughput_yield(stage_yields: &[f64]) -> f64 {
    let product: f64 = stage_yields.iter().map(|y| y / 100.0).product();
    round2(product * 100.0)
}

/// Map DPMO to a sigma level via the lookup table with linear interpolation
/// between the two bracketing rows
pub fn process_sigma(dpmo: f64) -> f64 {
    if dpmo >= SIGMA_TABLE[0].0 {
        return 0.0;
    }
    if dpmo <= SIGMA_TABLE[SIGMA_TABLE.len() - 1].0 {
        return 6.0;
    }
    for window in SIGMA_TABLE.windows(2) {
        let (upper_dpmo, upper_sigma) = window[0];
        let (lower_dpmo, lower_sigma) = window[1];
        if dpmo <= upper_dpmo && dpmo > lower_dpmo {
            let ratio = (upper_dpmo - dpmo) / (upper_dpmo - lower_dpmo);
            return round2(upper_sigma + ratio * (lower_sigma - upper_sigma));
        }
    }
    // Bounds checks above cover every remaining value
    6.0
}

/// Compute all derived metrics for one period
pub fn calculate_metrics(counters: &QualityCounters) -> QualityMetrics {
    let dpmo = calculate_dpmo(
        counters.defective_units,
        counters.total_units,
        counters.defect_opportunities,
    );
    QualityMetrics {
        total_copq: calculate_copq(
            counters.prevention_cost,
            counters.appraisal_cost,
            counters.internal_failure_cost,
            counters.external_failure_cost,
        ),
        dpmo,
        first_pass_yield: first_pass_yield(counters.total_units, counters.defective_units),
        process_sigma: process_sigma(dpmo as f64),
    }
}
