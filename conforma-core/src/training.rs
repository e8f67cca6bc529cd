//! Training matrix resolution
//!
//! Resolves, per user x course, whether the course is required and whether
//! the requirement is met, then aggregates a completion rate. The matrix is
//! a derived view; nothing here is persisted.
//!
//! Global invariants enforced:
//! - Required when a course is unrestricted, or role or department matches
//! - Met only by a COMPLETED training record
//! - Empty requirement set yields a 100% completion rate

use crate::numeric::round2;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Training record status classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrainingStatus {
    Assigned,
    InProgress,
    Completed,
    Expired,
}

/// Course with optional role/department restrictions. Empty lists mean the
/// course is required for everyone.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct Course {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub required_roles: Vec<String>,
    #[serde(default)]
    pub required_departments: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct UserProfile {
    pub id: String,
    pub role: String,
    pub department: String,
}

/// Append-only history row owned by the persistence layer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct TrainingRecord {
    pub user_id: String,
    pub course_id: String,
    pub status: TrainingStatus,
}

/// One resolved user x course cell
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct TrainingRequirement {
    pub user_id: String,
    pub course_id: String,
    pub required: bool,
    pub met: bool,
}

/// Resolved matrix over the full user x course cross-product
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct TrainingMatrix {
    pub cells: Vec<TrainingRequirement>,
    pub total_required: u64,
    pub completed_required: u64,
    pub completion_rate: f64,
}

impl TrainingMatrix {
    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("failed to serialize training matrix to JSON")
    }
}

/// A course is required when it declares no restriction at all, or the
/// user's role or department appears in the respective list (OR semantics)
pub fn is_required(course: &Course, user: &UserProfile) -> bool {
    if course.required_roles.is_empty() && course.required_departments.is_empty() {
        return true;
    }
    course.required_roles.iter().any(|r| *r == user.role)
        || course
            .required_departments
            .iter()
            .any(|d| *d == user.department)
}

/// Resolve the matrix. Cell order follows the caller's user order, then
/// course order, so output is deterministic for a given input.
pub fn resolve_matrix(
    users: &[UserProfile],
    courses: &[Course],
    records: &[TrainingRecord],
) -> TrainingMatrix {
    let completed: HashSet<(&str, &str)> = records
        .iter()
        .filter(|r| r.status == TrainingStatus::Completed)
        .map(|r| (r.user_id.as_str(), r.course_id.as_str()))
        .collect();

    let mut cells = Vec::with_capacity(users.len() * courses.len());
    let mut total_required = 0u64;
    let mut completed_required = 0u64;

    for user in users {
        for course in courses {
            let required = is_required(course, user);
            let met = completed.contains(&(user.id.as_str(), course.id.as_str()));
            if required {
                total_required += 1;
                if met {
                    completed_required += 1;
                }
            }
            cells.push(TrainingRequirement {
                user_id: user.id.clone(),
                course_id: course.id.clone(),
                required,
                met,
            });
        }
    }

    let completion_rate = if total_required == 0 {
        100.0
    } else {
        round2(completed_required as f64 / total_required as f64 * 100.0)
    };

    TrainingMatrix {
        cells,
        total_required,
        completed_required,
        completion_rate,
    }
}
