//! Safety performance rates - LTIFR, TRIR, severity rate, near-miss rate
//!
//! All rates share the shape `count * multiplier / hours_worked` with a
//! zero-hours guard. Year-to-date rollups sum raw counters first and apply
//! the formulas once to the sums; they never average monthly rates.
//!
//! Global invariants enforced:
//! - hours_worked <= 0 yields rate 0, never NaN or infinity
//! - Rates are rounded to 2 decimal places

use crate::numeric::round2;
use serde::{Deserialize, Serialize};

/// Lost-time injuries per million hours worked
pub const LTIFR_MULTIPLIER: f64 = 1_000_000.0;
/// Recordable injuries per 200,000 hours (OSHA 100-employee convention)
pub const TRIR_MULTIPLIER: f64 = 200_000.0;
/// Days lost per million hours worked
pub const SEVERITY_MULTIPLIER: f64 = 1_000_000.0;
/// Near misses per 200,000 hours
pub const NEAR_MISS_MULTIPLIER: f64 = 200_000.0;

/// Raw incident counters for one reporting period (upsert key: year + month)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct SafetyCounters {
    pub year: i32,
    pub month: u32,
    pub hours_worked: f64,
    pub lost_time_injuries: u64,
    pub total_recordable_injuries: u64,
    pub days_lost: u64,
    pub near_misses: u64,
}

/// Derived rates persisted alongside the counters
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct SafetyRates {
    pub ltifr: f64,
    pub trir: f64,
    pub severity_rate: f64,
    pub near_miss_rate: f64,
}

fn rate(count: f64, multiplier: f64, hours_worked: f64) -> f64 {
    if hours_worked <= 0.0 {
        return 0.0;
    }
    round2(count * multiplier / hours_worked)
}

pub fn calculate_ltifr(lost_time_injuries: u64, hours_worked: f64) -> f64 {
    rate(lost_time_injuries as f64, LTIFR_MULTIPLIER, hours_worked)
}

pub fn calculate_trir(total_recordable_injuries: u64, hours_worked: f64) -> f64 {
    rate(
        total_recordable_injuries as f64,
        TRIR_MULTIPLIER,
        hours_worked,
    )
}

pub fn calculate_severity_rate(days_lost: u64, hours_worked: f64) -> f64 {
    rate(days_lost as f64, SEVERITY_MULTIPLIER, hours_worked)
}

pub fn calculate_near_miss_rate(near_misses: u64, hours_worked: f64) -> f64 {
    rate(near_misses as f64, NEAR_MISS_MULTIPLIER, hours_worked)
}

/// Compute all four rates for one period
pub fn calculate_rates(counters: &SafetyCounters) -> SafetyRates {
    SafetyRates {
        ltifr: calculate_ltifr(counters.lost_time_injuries, counters.hours_worked),
        trir: calculate_trir(counters.total_recordable_injuries, counters.hours_worked),
        severity_rate: calculate_severity_rate(counters.days_lost, counters.hours_worked),
        near_miss_rate: calculate_near_miss_rate(counters.near_misses, counters.hours_worked),
    }
}

/// Year-to-date rollup: sum raw counters across periods, then apply the
/// formulas once to the sums
pub fn year_to_date_rates(periods: &[SafetyCounters]) -> SafetyRates {
    let hours_worked: f64 = periods.iter().map(|p| p.hours_worked).sum();
    let lost_time_injuries: u64 = periods.iter().map(|p| p.lost_time_injuries).sum();
    let total_recordable: u64 = periods.iter().map(|p| p.total_recordable_injuries).sum();
    let days_lost: u64 = periods.iter().map(|p| p.days_lost).sum();
    let near_misses: u64 = periods.iter().map(|p| p.near_misses).sum();

    SafetyRates {
        ltifr: calculate_ltifr(lost_time_injuries, hours_worked),
        trir: calculate_trir(total_recordable, hours_worked),
        severity_rate: calculate_severity_rate(days_lost, hours_worked),
        near_miss_rate: calculate_near_miss_rate(near_misses, hours_worked),
    }
}
