//! Objective progress tracking
//!
//! Progress is a pure function of baseline/current/target; status is a small
//! state machine over progress, the target date, and an injected "now".
//!
//! Global invariants enforced:
//! - Progress is always in [0,100]
//! - ACHIEVED and CANCELLED are absorbing
//! - "now" is injected, never read ambiently
//! - ProgressRecord history is append-only, never recomputed

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Fixed horizon the expected-progress curve is computed against
pub const HORIZON_DAYS: i64 = 90;
/// Progress may trail expected by this much and stay ON_TRACK
pub const ON_TRACK_OFFSET: f64 = 10.0;
/// Progress trailing expected by more than this is BEHIND, not AT_RISK
pub const AT_RISK_OFFSET: f64 = 25.0;

/// Objective status classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ObjectiveStatus {
    NotStarted,
    OnTrack,
    AtRisk,
    Behind,
    Achieved,
    Cancelled,
}

impl ObjectiveStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectiveStatus::NotStarted => "NOT_STARTED",
            ObjectiveStatus::OnTrack => "ON_TRACK",
            ObjectiveStatus::AtRisk => "AT_RISK",
            ObjectiveStatus::Behind => "BEHIND",
            ObjectiveStatus::Achieved => "ACHIEVED",
            ObjectiveStatus::Cancelled => "CANCELLED",
        }
    }

    /// Terminal states never auto-transition
    pub fn is_terminal(&self) -> bool {
        matches!(self, ObjectiveStatus::Achieved | ObjectiveStatus::Cancelled)
    }
}

/// Objective fields the engine reads and re-derives
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct Objective {
    pub baseline_value: Option<f64>,
    pub target_value: Option<f64>,
    pub current_value: Option<f64>,
    pub progress_percent: u8,
    pub status: ObjectiveStatus,
    pub target_date: Option<NaiveDate>,
}

/// Append-only history row, immutable once created
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct ProgressRecord {
    pub value: f64,
    pub recorded_at: DateTime<Utc>,
}

/// Progress percentage in [0,100]. Unset current or target yields 0;
/// baseline defaults to 0; a zero range is 100 iff current >= target.
pub fn progress_percent(
    baseline: Option<f64>,
    current: Option<f64>,
    target: Option<f64>,
) -> u8 {
    let (current, target) = match (current, target) {
        (Some(current), Some(target)) => (current, target),
        _ => return 0,
    };
    let baseline = baseline.unwrap_or(0.0);
    let range = target - baseline;
    if range == 0.0 {
        return if current >= target { 100 } else { 0 };
    }
    ((current - baseline) / range * 100.0).clamp(0.0, 100.0).round() as u8
}

/// Derive the next status from the prior status, progress, target date,
/// and an injected "now"
pub fn derive_status(
    prior: ObjectiveStatus,
    progress: u8,
    target_date: Option<NaiveDate>,
    now: DateTime<Utc>,
) -> ObjectiveStatus {
    if prior.is_terminal() {
        return prior;
    }
    if progress >= 100 {
        return ObjectiveStatus::Achieved;
    }
    let target_date = match target_date {
        Some(date) => date,
        None => {
            return if progress > 0 {
                ObjectiveStatus::OnTrack
            } else {
                ObjectiveStatus::NotStarted
            }
        }
    };

    let days_remaining = (target_date - now.date_naive()).num_days();
    let expected =
        ((HORIZON_DAYS - days_remaining) as f64 / HORIZON_DAYS as f64 * 100.0).max(0.0);
    let progress = f64::from(progress);
    if progress >= expected - ON_TRACK_OFFSET {
        ObjectiveStatus::OnTrack
    } else if progress >= expected - AT_RISK_OFFSET {
        ObjectiveStatus::AtRisk
    } else {
        ObjectiveStatus::Behind
    }
}

/// Record a new progress value: appends an immutable history row and
/// re-derives current value, progress, and status in the same operation
pub fn record_progress(
    objective: &mut Objective,
    value: f64,
    now: DateTime<Utc>,
) -> ProgressRecord {
    objective.current_value = Some(value);
    objective.progress_percent = progress_percent(
        objective.baseline_value,
        objective.current_value,
        objective.target_value,
    );
    objective.status = derive_status(
        objective.status,
        objective.progress_percent,
        objective.target_date,
        now,
    );
    ProgressRecord {
        value,
        recorded_at: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 15, 12, 0, 0).unwrap()
    }

    fn date_in_days(days: i64) -> NaiveDate {
        (now() + Duration::days(days)).date_naive()
    }

    #[test]
    fn test_progress_unset_inputs() {
        assert_eq!(progress_percent(Some(0.0), None, Some(50.0)), 0);
        assert_eq!(progress_percent(Some(0.0), Some(10.0), None), 0);
        assert_eq!(progress_percent(None, None, None), 0);
    }

    #[test]
    fn test_progress_zero_range() {
        assert_eq!(progress_percent(Some(0.0), Some(50.0), Some(0.0)), 100);
        assert_eq!(progress_percent(Some(50.0), Some(20.0), Some(50.0)), 0);
        // Unset baseline defaults to 0
        assert_eq!(progress_percent(None, Some(0.0), Some(0.0)), 100);
    }

    #[test]
    fn test_progress_basic() {
        assert_eq!(progress_percent(Some(0.0), Some(25.0), Some(100.0)), 25);
        assert_eq!(progress_percent(Some(100.0), Some(75.0), Some(50.0)), 50);
        // Rounds to nearest integer
        assert_eq!(progress_percent(Some(0.0), Some(1.0), Some(3.0)), 33);
    }

    #[test]
    fn test_progress_clamped_to_bounds() {
        assert_eq!(progress_percent(Some(0.0), Some(200.0), Some(100.0)), 100);
        assert_eq!(progress_percent(Some(0.0), Some(-50.0), Some(100.0)), 0);
    }

    #[test]
    fn test_terminal_states_absorb() {
        assert_eq!(
            derive_status(ObjectiveStatus::Achieved, 10, Some(date_in_days(30)), now()),
            ObjectiveStatus::Achieved
        );
        assert_eq!(
            derive_status(ObjectiveStatus::Cancelled, 100, None, now()),
            ObjectiveStatus::Cancelled
        );
    }

    #[test]
    fn test_full_progress_achieves() {
        assert_eq!(
            derive_status(ObjectiveStatus::Behind, 100, Some(date_in_days(5)), now()),
            ObjectiveStatus::Achieved
        );
    }

    #[test]
    fn test_no_target_date() {
        assert_eq!(
            derive_status(ObjectiveStatus::NotStarted, 0, None, now()),
            ObjectiveStatus::NotStarted
        );
        assert_eq!(
            derive_status(ObjectiveStatus::NotStarted, 1, None, now()),
            ObjectiveStatus::OnTrack
        );
    }

    #[test]
    fn test_status_bands_against_expected_curve() {
        // 45 days remaining: expected = (90-45)/90*100 = 50
        let target = Some(date_in_days(45));
        assert_eq!(
            derive_status(ObjectiveStatus::OnTrack, 40, target, now()),
            ObjectiveStatus::OnTrack
        );
        assert_eq!(
            derive_status(ObjectiveStatus::OnTrack, 39, target, now()),
            ObjectiveStatus::AtRisk
        );
        assert_eq!(
            derive_status(ObjectiveStatus::OnTrack, 25, target, now()),
            ObjectiveStatus::AtRisk
        );
        assert_eq!(
            derive_status(ObjectiveStatus::OnTrack, 24, target, now()),
            ObjectiveStatus::Behind
        );
    }

    #[test]
    fn test_far_future_target_floors_expected_at_zero() {
        // 180 days remaining: expected would be negative, floored to 0
        let target = Some(date_in_days(180));
        assert_eq!(
            derive_status(ObjectiveStatus::NotStarted, 0, target, now()),
            ObjectiveStatus::OnTrack
        );
    }

    #[test]
    fn test_past_due_target_is_behind_without_progress() {
        // 30 days past due: expected = (90+30)/90*100 > 100
        let target = Some(date_in_days(-30));
        assert_eq!(
            derive_status(ObjectiveStatus::OnTrack, 50, target, now()),
            ObjectiveStatus::Behind
        );
    }

    #[test]
    fn test_record_progress_re_derives_parent_fields() {
        let mut objective = Objective {
            baseline_value: Some(0.0),
            target_value: Some(100.0),
            current_value: None,
            progress_percent: 0,
            status: ObjectiveStatus::NotStarted,
            target_date: Some(date_in_days(45)),
        };
        let record = record_progress(&mut objective, 60.0, now());
        assert_eq!(record.value, 60.0);
        assert_eq!(record.recorded_at, now());
        assert_eq!(objective.current_value, Some(60.0));
        assert_eq!(objective.progress_percent, 60);
        assert_eq!(objective.status, ObjectiveStatus::OnTrack);
    }

    #[test]
    fn test_record_progress_to_completion() {
        let mut objective = Objective {
            baseline_value: Some(0.0),
            target_value: Some(50.0),
            current_value: Some(10.0),
            progress_percent: 20,
            status: ObjectiveStatus::Behind,
            target_date: Some(date_in_days(3)),
        };
        record_progress(&mut objective, 50.0, now());
        assert_eq!(objective.progress_percent, 100);
        assert_eq!(objective.status, ObjectiveStatus::Achieved);
        // A later lower reading cannot leave the terminal state
        record_progress(&mut objective, 10.0, now());
        assert_eq!(objective.status, ObjectiveStatus::Achieved);
    }
}
