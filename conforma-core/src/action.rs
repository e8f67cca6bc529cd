//! Corrective/preventive action lifecycle
//!
//! Status transitions go through one table; illegal transitions are rejected,
//! never coerced. The overdue sweep is a standing invariant applied before
//! any listing or statistics read, expressed so the persistence layer can run
//! it as a single conditional write.
//!
//! Global invariants enforced:
//! - All allowed transitions live in one table
//! - The sweep is idempotent and safe under concurrent triggers
//! - "now" is injected, never read ambiently

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Action status classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionStatus {
    Open,
    InProgress,
    Completed,
    Verified,
    Overdue,
    Cancelled,
}

impl ActionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionStatus::Open => "OPEN",
            ActionStatus::InProgress => "IN_PROGRESS",
            ActionStatus::Completed => "COMPLETED",
            ActionStatus::Verified => "VERIFIED",
            ActionStatus::Overdue => "OVERDUE",
            ActionStatus::Cancelled => "CANCELLED",
        }
    }

    /// Terminal states accept no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, ActionStatus::Verified | ActionStatus::Cancelled)
    }
}

impl fmt::Display for ActionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rejected workflow transition; surfaced to the caller, never coerced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("cannot transition action from {from} to {to}")]
    Illegal { from: ActionStatus, to: ActionStatus },
}

/// Action fields the engine reads and mutates
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct Action {
    pub due_date: NaiveDate,
    pub status: ActionStatus,
    pub completed_at: Option<DateTime<Utc>>,
    pub verified_at: Option<DateTime<Utc>>,
    pub effectiveness_rating: Option<u8>,
}

/// The allowed source -> target pairs
pub fn is_transition_allowed(from: ActionStatus, to: ActionStatus) -> bool {
    use ActionStatus::*;
    matches!(
        (from, to),
        (Open, InProgress)
            | (Open, Completed)
            | (Open, Overdue)
            | (InProgress, Completed)
            | (InProgress, Overdue)
            | (Overdue, InProgress)
            | (Overdue, Completed)
            | (Completed, Verified)
            | (Open, Cancelled)
            | (InProgress, Cancelled)
            | (Overdue, Cancelled)
            | (Completed, Cancelled)
    )
}

/// Apply an explicit transition, rejecting anything outside the table
pub fn transition(action: &mut Action, to: ActionStatus) -> Result<(), TransitionError> {
    if !is_transition_allowed(action.status, to) {
        return Err(TransitionError::Illegal {
            from: action.status,
            to,
        });
    }
    action.status = to;
    Ok(())
}

/// Complete an action, stamping `completed_at`
pub fn complete(action: &mut Action, now: DateTime<Utc>) -> Result<(), TransitionError> {
    transition(action, ActionStatus::Completed)?;
    action.completed_at = Some(now);
    Ok(())
}

/// Verify a completed action, stamping `verified_at` and recording the
/// effectiveness rating. Only legal from COMPLETED.
pub fn verify(
    action: &mut Action,
    effectiveness_rating: u8,
    now: DateTime<Utc>,
) -> Result<(), TransitionError> {
    transition(action, ActionStatus::Verified)?;
    action.verified_at = Some(now);
    action.effectiveness_rating = Some(effectiveness_rating);
    Ok(())
}

/// Whether the overdue sweep would flag this action
pub fn is_overdue_candidate(
    status: ActionStatus,
    due_date: NaiveDate,
    now: DateTime<Utc>,
) -> bool {
    matches!(status, ActionStatus::Open | ActionStatus::InProgress)
        && due_date < now.date_naive()
}

/// Flag open and in-progress actions whose due date has passed. Idempotent:
/// a second sweep with the same "now" flags nothing.
pub fn sweep_overdue(actions: &mut [Action], now: DateTime<Utc>) -> usize {
    let mut flagged = 0;
    for action in actions.iter_mut() {
        if is_overdue_candidate(action.status, action.due_date, now) {
            action.status = ActionStatus::Overdue;
            flagged += 1;
        }
    }
    flagged
}

/// Conditional-update description of the sweep for the persistence layer:
/// set OVERDUE on rows matching the status set and due-before bound in one
/// filtered write, so concurrent readers converge without racing
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct OverdueFilter {
    pub statuses: [ActionStatus; 2],
    pub due_before: NaiveDate,
}

pub fn overdue_filter(now: DateTime<Utc>) -> OverdueFilter {
    OverdueFilter {
        statuses: [ActionStatus::Open, ActionStatus::InProgress],
        due_before: now.date_naive(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 15, 12, 0, 0).unwrap()
    }

    fn action(status: ActionStatus, due_in_days: i64) -> Action {
        Action {
            due_date: (now() + Duration::days(due_in_days)).date_naive(),
            status,
            completed_at: None,
            verified_at: None,
            effectiveness_rating: None,
        }
    }

    #[test]
    fn test_happy_path_transitions() {
        let mut a = action(ActionStatus::Open, 10);
        transition(&mut a, ActionStatus::InProgress).unwrap();
        complete(&mut a, now()).unwrap();
        assert_eq!(a.status, ActionStatus::Completed);
        assert_eq!(a.completed_at, Some(now()));
        verify(&mut a, 4, now()).unwrap();
        assert_eq!(a.status, ActionStatus::Verified);
        assert_eq!(a.verified_at, Some(now()));
        assert_eq!(a.effectiveness_rating, Some(4));
    }

    #[test]
    fn test_verify_requires_completed() {
        let mut a = action(ActionStatus::Open, 10);
        let err = verify(&mut a, 3, now()).unwrap_err();
        assert_eq!(
            err,
            TransitionError::Illegal {
                from: ActionStatus::Open,
                to: ActionStatus::Verified,
            }
        );
        // Rejected transition leaves the action untouched
        assert_eq!(a.status, ActionStatus::Open);
        assert_eq!(a.verified_at, None);
    }

    #[test]
    fn test_terminal_states_reject_everything() {
        for terminal in [ActionStatus::Verified, ActionStatus::Cancelled] {
            for to in [
                ActionStatus::Open,
                ActionStatus::InProgress,
                ActionStatus::Completed,
                ActionStatus::Verified,
                ActionStatus::Overdue,
                ActionStatus::Cancelled,
            ] {
                assert!(
                    !is_transition_allowed(terminal, to),
                    "{} -> {} should be rejected",
                    terminal,
                    to
                );
            }
        }
    }

    #[test]
    fn test_cancel_from_any_non_terminal() {
        for from in [
            ActionStatus::Open,
            ActionStatus::InProgress,
            ActionStatus::Overdue,
            ActionStatus::Completed,
        ] {
            assert!(is_transition_allowed(from, ActionStatus::Cancelled));
        }
    }

    #[test]
    fn test_overdue_can_resume_or_complete() {
        let mut a = action(ActionStatus::Overdue, -5);
        transition(&mut a, ActionStatus::InProgress).unwrap();
        let mut b = action(ActionStatus::Overdue, -5);
        complete(&mut b, now()).unwrap();
        assert_eq!(b.status, ActionStatus::Completed);
    }

    #[test]
    fn test_sweep_flags_past_due_open_actions() {
        let mut actions = vec![
            action(ActionStatus::Open, -1),
            action(ActionStatus::InProgress, -30),
            action(ActionStatus::Open, 1),
            action(ActionStatus::Completed, -10),
            action(ActionStatus::Cancelled, -10),
        ];
        let flagged = sweep_overdue(&mut actions, now());
        assert_eq!(flagged, 2);
        assert_eq!(actions[0].status, ActionStatus::Overdue);
        assert_eq!(actions[1].status, ActionStatus::Overdue);
        assert_eq!(actions[2].status, ActionStatus::Open);
        assert_eq!(actions[3].status, ActionStatus::Completed);
        assert_eq!(actions[4].status, ActionStatus::Cancelled);
    }

    #[test]
    fn test_sweep_is_idempotent() {
        let mut actions = vec![
            action(ActionStatus::Open, -1),
            action(ActionStatus::InProgress, -1),
        ];
        assert_eq!(sweep_overdue(&mut actions, now()), 2);
        assert_eq!(sweep_overdue(&mut actions, now()), 0);
    }

    #[test]
    fn test_due_today_is_not_overdue() {
        // Strict inequality: due today still has today to finish
        assert!(!is_overdue_candidate(
            ActionStatus::Open,
            now().date_naive(),
            now()
        ));
        assert!(is_overdue_candidate(
            ActionStatus::Open,
            now().date_naive() - Duration::days(1),
            now()
        ));
    }

    #[test]
    fn test_overdue_filter_matches_sweep_predicate() {
        let filter = overdue_filter(now());
        assert_eq!(
            filter.statuses,
            [ActionStatus::Open, ActionStatus::InProgress]
        );
        assert_eq!(filter.due_before, now().date_naive());
    }
}
