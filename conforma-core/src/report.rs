//! Reporting and output generation
//!
//! Global invariants enforced:
//! - Deterministic output ordering
//! - Byte-for-byte identical output across runs

use crate::compliance::ComplianceScore;
use crate::quality::QualityMetrics;
use crate::safety::SafetyRates;
use crate::training::TrainingMatrix;
use serde::Serialize;

/// Render any engine output as pretty JSON
pub fn render_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}

/// Render the compliance scoreboard as a text table, one row per standard
pub fn render_scoreboard_text(scores: &[ComplianceScore]) -> String {
    let mut output = String::new();
    output.push_str(&format!(
        "{:<15} {:>6} {:>9} {:>6} {:>10} {:>7} {:>8}\n",
        "STANDARD", "RISK", "INCIDENT", "LEGAL", "OBJECTIVE", "ACTION", "OVERALL"
    ));
    for score in scores {
        output.push_str(&format!(
            "{:<15} {:>6} {:>9} {:>6} {:>10} {:>7} {:>8}\n",
            score.standard.as_str(),
            score.risk_score,
            score.incident_score,
            score.legal_score,
            score.objective_score,
            score.action_score,
            score.overall_score,
        ));
    }
    output
}

/// Render safety rates as labelled lines
pub fn render_rates_text(rates: &SafetyRates) -> String {
    format!(
        "LTIFR           {:.2}\nTRIR            {:.2}\nSeverity rate   {:.2}\nNear-miss rate  {:.2}\n",
        rates.ltifr, rates.trir, rates.severity_rate, rates.near_miss_rate
    )
}

/// Render quality metrics as labelled lines
pub fn render_quality_text(metrics: &QualityMetrics) -> String {
    format!(
        "COPQ            {:.2}\nDPMO            {}\nFirst-pass yield {:.2}%\nProcess sigma   {:.2}\n",
        metrics.total_copq, metrics.dpmo, metrics.first_pass_yield, metrics.process_sigma
    )
}

/// Render the training matrix summary with one line per unmet requirement
pub fn render_matrix_text(matrix: &TrainingMatrix) -> String {
    let mut output = String::new();
    output.push_str(&format!(
        "Required {}  Completed {}  Completion rate {:.2}%\n",
        matrix.total_required, matrix.completed_required, matrix.completion_rate
    ));
    for cell in matrix.cells.iter().filter(|c| c.required && !c.met) {
        output.push_str(&format!(
            "  unmet: user {} course {}\n",
            cell.user_id, cell.course_id
        ));
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compliance::{aggregate, Population, Standard, StandardCounts};
    use chrono::TimeZone;

    fn sample_score() -> ComplianceScore {
        let counts = StandardCounts {
            standard: Standard::Safety,
            risks: Population {
                total: 10,
                compliant: 8,
            },
            incidents: Population {
                total: 0,
                compliant: 0,
            },
            legal: Population {
                total: 4,
                compliant: 4,
            },
            objectives: Population {
                total: 2,
                compliant: 1,
            },
            actions: Population {
                total: 5,
                compliant: 5,
            },
        };
        let now = chrono::Utc.with_ymd_and_hms(2026, 3, 15, 12, 0, 0).unwrap();
        aggregate(&counts, now)
    }

    #[test]
    fn test_scoreboard_text_has_header_and_rows() {
        let text = render_scoreboard_text(&[sample_score()]);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("STANDARD"));
        assert!(lines[1].starts_with("SAFETY"));
    }

    #[test]
    fn test_scoreboard_text_deterministic() {
        let scores = vec![sample_score()];
        assert_eq!(
            render_scoreboard_text(&scores),
            render_scoreboard_text(&scores)
        );
    }

    #[test]
    fn test_render_json_round_trips() {
        let score = sample_score();
        let json = render_json(&score);
        let parsed: ComplianceScore = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, score);
    }
}
