//! Conforma core library - derived compliance metrics for safety,
//! environmental, and quality management systems

#![deny(warnings)]

// Global invariants enforced in this crate:
// - Every computation is a pure function of its arguments
// - No global mutable state
// - No randomness, ambient clocks, threads, or async; "now" is always injected
// - Out-of-range numeric input is clamped, never rejected
// - Division-by-zero branches return documented sentinels, never NaN or infinity
// - Identical input yields identical output

pub mod action;
pub mod aspect;
pub mod compliance;
pub mod objective;
pub mod quality;
pub mod report;
pub mod risk;
pub mod safety;
pub mod training;

mod numeric;

pub use action::{Action, ActionStatus, TransitionError};
pub use aspect::SignificanceLevel;
pub use compliance::{ComplianceScore, Standard};
pub use objective::ObjectiveStatus;
pub use report::render_json;
pub use risk::RiskLevel;
