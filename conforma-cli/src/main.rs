//! Conforma CLI - derived compliance metrics from the command line

#![deny(warnings)]

// Global invariants enforced:
// - Deterministic output ordering
// - Identical input yields byte-for-byte identical output (given --now)

use anyhow::{bail, Context};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use conforma_core::compliance::{scoreboard, StandardCounts};
use conforma_core::objective::{derive_status, progress_percent, ObjectiveStatus};
use conforma_core::quality::{calculate_metrics, rolled_throughput_yield, QualityCounters};
use conforma_core::report::{
    render_json, render_matrix_text, render_quality_text, render_rates_text,
    render_scoreboard_text,
};
use conforma_core::risk::{residual_risk, score_matrix, score_risk};
use conforma_core::safety::{calculate_rates, year_to_date_rates, SafetyCounters};
use conforma_core::training::{resolve_matrix, Course, TrainingRecord, UserProfile};
use conforma_core::{aspect, Standard};
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "conforma")]
#[command(about = "Derived compliance metrics: risk scoring, safety and quality rates, objective status, compliance rollups, and training matrices")]
#[command(version = env!("CONFORMA_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Score a risk from likelihood, severity, and detectability
    Risk {
        /// Likelihood factor (1-5)
        likelihood: i64,

        /// Severity factor (1-5)
        severity: i64,

        /// Detectability factor (1-5); omit for the 2-factor 5x5 matrix view
        detectability: Option<i64>,

        /// Control effectiveness percentage for residual risk
        #[arg(long)]
        effectiveness: Option<f64>,

        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,
    },
    /// Score an environmental aspect's significance
    Aspect {
        /// Scale factor (1-5)
        scale: i64,

        /// Frequency factor (1-5)
        frequency: i64,

        /// Legal-impact factor (1-5)
        legal_impact: i64,

        /// Reversibility modifier (1-5, 3 is neutral)
        #[arg(long)]
        reversibility: Option<i64>,

        /// Stakeholder-concern modifier (1-5, 3 is neutral)
        #[arg(long)]
        stakeholder_concern: Option<i64>,

        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,
    },
    /// Compute safety rates (LTIFR, TRIR, severity, near-miss)
    Safety {
        /// Hours worked in the period
        #[arg(long, default_value_t = 0.0)]
        hours: f64,

        /// Lost-time injuries
        #[arg(long, default_value_t = 0)]
        lost_time: u64,

        /// Total recordable injuries
        #[arg(long, default_value_t = 0)]
        recordable: u64,

        /// Days lost
        #[arg(long, default_value_t = 0)]
        days_lost: u64,

        /// Near misses
        #[arg(long, default_value_t = 0)]
        near_misses: u64,

        /// Year-to-date rollup from a JSON file of monthly counters
        /// (sums counters, then applies the formulas once)
        #[arg(long)]
        ytd: Option<PathBuf>,

        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,
    },
    /// Compute quality metrics (COPQ, DPMO, first-pass yield, sigma)
    Quality {
        /// Prevention cost
        #[arg(long, default_value_t = 0.0)]
        prevention: f64,

        /// Appraisal cost
        #[arg(long, default_value_t = 0.0)]
        appraisal: f64,

        /// Internal failure cost
        #[arg(long, default_value_t = 0.0)]
        internal_failure: f64,

        /// External failure cost
        #[arg(long, default_value_t = 0.0)]
        external_failure: f64,

        /// Total units produced
        #[arg(long, default_value_t = 0)]
        units: u64,

        /// Defective units
        #[arg(long, default_value_t = 0)]
        defective: u64,

        /// Defect opportunities per unit
        #[arg(long, default_value_t = 1)]
        opportunities: u64,

        /// Rolled-throughput yield from comma-separated stage yields
        /// (e.g. "95,90,99.5"); overrides the counter flags
        #[arg(long)]
        stages: Option<String>,

        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,
    },
    /// Derive objective progress and status
    Objective {
        /// Baseline value
        #[arg(long)]
        baseline: Option<f64>,

        /// Current value
        #[arg(long)]
        current: Option<f64>,

        /// Target value
        #[arg(long)]
        target: Option<f64>,

        /// Target date (YYYY-MM-DD)
        #[arg(long)]
        target_date: Option<NaiveDate>,

        /// Evaluation instant (RFC 3339), defaults to the current time
        #[arg(long)]
        now: Option<DateTime<Utc>>,

        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,
    },
    /// Aggregate per-standard counts into the compliance scoreboard
    Aggregate {
        /// JSON file with an array of per-standard count pairs
        path: PathBuf,

        /// Evaluation instant (RFC 3339), defaults to the current time
        #[arg(long)]
        now: Option<DateTime<Utc>>,

        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,
    },
    /// Resolve the training matrix and completion rate
    Matrix {
        /// JSON file with users, courses, and training records
        path: PathBuf,

        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,
    },
}

/// Input document for the `matrix` subcommand
#[derive(Deserialize)]
struct MatrixInput {
    users: Vec<UserProfile>,
    courses: Vec<Course>,
    #[serde(default)]
    records: Vec<TrainingRecord>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Risk {
            likelihood,
            severity,
            detectability,
            effectiveness,
            format,
        } => run_risk(likelihood, severity, detectability, effectiveness, format),
        Commands::Aspect {
            scale,
            frequency,
            legal_impact,
            reversibility,
            stakeholder_concern,
            format,
        } => run_aspect(
            scale,
            frequency,
            legal_impact,
            reversibility,
            stakeholder_concern,
            format,
        ),
        Commands::Safety {
            hours,
            lost_time,
            recordable,
            days_lost,
            near_misses,
            ytd,
            format,
        } => run_safety(hours, lost_time, recordable, days_lost, near_misses, ytd, format),
        Commands::Quality {
            prevention,
            appraisal,
            internal_failure,
            external_failure,
            units,
            defective,
            opportunities,
            stages,
            format,
        } => run_quality(
            prevention,
            appraisal,
            internal_failure,
            external_failure,
            units,
            defective,
            opportunities,
            stages,
            format,
        ),
        Commands::Objective {
            baseline,
            current,
            target,
            target_date,
            now,
            format,
        } => run_objective(baseline, current, target, target_date, now, format),
        Commands::Aggregate { path, now, format } => run_aggregate(&path, now, format),
        Commands::Matrix { path, format } => run_matrix(&path, format),
    }
}

fn run_risk(
    likelihood: i64,
    severity: i64,
    detectability: Option<i64>,
    effectiveness: Option<f64>,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let derived = match detectability {
        Some(detectability) => score_risk(likelihood, severity, detectability),
        None => score_matrix(likelihood, severity),
    };
    let residual = effectiveness.map(|e| residual_risk(derived.score, e));

    match format {
        OutputFormat::Json => {
            let mut value = serde_json::json!({
                "score": derived.score,
                "level": derived.level,
            });
            if let Some(residual) = residual {
                value["residual_score"] = serde_json::json!(residual);
            }
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        OutputFormat::Text => {
            println!("Score  {}", derived.score);
            println!("Level  {}", derived.level.as_str());
            if let Some(residual) = residual {
                println!("Residual  {}", residual);
            }
        }
    }
    Ok(())
}

fn run_aspect(
    scale: i64,
    frequency: i64,
    legal_impact: i64,
    reversibility: Option<i64>,
    stakeholder_concern: Option<i64>,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let derived = aspect::score_aspect(scale, frequency, legal_impact, reversibility, stakeholder_concern);
    match format {
        OutputFormat::Json => println!("{}", render_json(&derived)),
        OutputFormat::Text => {
            println!("Score        {}", derived.score);
            println!("Level        {}", derived.level.as_str());
            println!("Significant  {}", derived.is_significant);
        }
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn run_safety(
    hours: f64,
    lost_time: u64,
    recordable: u64,
    days_lost: u64,
    near_misses: u64,
    ytd: Option<PathBuf>,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let rates = match ytd {
        Some(path) => {
            let json = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read counters file: {}", path.display()))?;
            let periods: Vec<SafetyCounters> = serde_json::from_str(&json)
                .with_context(|| format!("failed to parse counters file: {}", path.display()))?;
            year_to_date_rates(&periods)
        }
        None => calculate_rates(&SafetyCounters {
            year: 0,
            month: 0,
            hours_worked: hours,
            lost_time_injuries: lost_time,
            total_recordable_injuries: recordable,
            days_lost,
            near_misses,
        }),
    };

    match format {
        OutputFormat::Json => println!("{}", render_json(&rates)),
        OutputFormat::Text => print!("{}", render_rates_text(&rates)),
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn run_quality(
    prevention: f64,
    appraisal: f64,
    internal_failure: f64,
    external_failure: f64,
    units: u64,
    defective: u64,
    opportunities: u64,
    stages: Option<String>,
    format: OutputFormat,
) -> anyhow::Result<()> {
    if let Some(stages) = stages {
        let yields = parse_stage_yields(&stages)?;
        let rty = rolled_throughput_yield(&yields);
        match format {
            OutputFormat::Json => println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "rolled_throughput_yield": rty
                }))?
            ),
            OutputFormat::Text => println!("Rolled-throughput yield  {:.2}%", rty),
        }
        return Ok(());
    }

    let metrics = calculate_metrics(&QualityCounters {
        year: 0,
        month: 0,
        prevention_cost: prevention,
        appraisal_cost: appraisal,
        internal_failure_cost: internal_failure,
        external_failure_cost: external_failure,
        total_units: units,
        defective_units: defective,
        defect_opportunities: opportunities,
    });

    match format {
        OutputFormat::Json => println!("{}", render_json(&metrics)),
        OutputFormat::Text => print!("{}", render_quality_text(&metrics)),
    }
    Ok(())
}

fn parse_stage_yields(stages: &str) -> anyhow::Result<Vec<f64>> {
    stages
        .split(',')
        .map(|s| {
            s.trim()
                .parse::<f64>()
                .with_context(|| format!("invalid stage yield: {:?}", s.trim()))
        })
        .collect()
}

fn run_objective(
    baseline: Option<f64>,
    current: Option<f64>,
    target: Option<f64>,
    target_date: Option<NaiveDate>,
    now: Option<DateTime<Utc>>,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let now = now.unwrap_or_else(Utc::now);
    let progress = progress_percent(baseline, current, target);
    let status = derive_status(ObjectiveStatus::NotStarted, progress, target_date, now);

    match format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "progress_percent": progress,
                "status": status,
            }))?
        ),
        OutputFormat::Text => {
            println!("Progress  {}%", progress);
            println!("Status    {}", status.as_str());
        }
    }
    Ok(())
}

fn run_aggregate(
    path: &std::path::Path,
    now: Option<DateTime<Utc>>,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read counts file: {}", path.display()))?;
    let counts: Vec<StandardCounts> = serde_json::from_str(&json)
        .with_context(|| format!("failed to parse counts file: {}", path.display()))?;

    for standard in Standard::ALL {
        if counts.iter().filter(|c| c.standard == standard).count() > 1 {
            bail!("duplicate counts for standard {}", standard.as_str());
        }
    }

    let now = now.unwrap_or_else(Utc::now);
    let scores = scoreboard(&counts, now);

    match format {
        OutputFormat::Json => println!("{}", render_json(&scores)),
        OutputFormat::Text => print!("{}", render_scoreboard_text(&scores)),
    }
    Ok(())
}

fn run_matrix(path: &std::path::Path, format: OutputFormat) -> anyhow::Result<()> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read matrix file: {}", path.display()))?;
    let input: MatrixInput = serde_json::from_str(&json)
        .with_context(|| format!("failed to parse matrix file: {}", path.display()))?;

    let matrix = resolve_matrix(&input.users, &input.courses, &input.records);

    match format {
        OutputFormat::Json => println!("{}", render_json(&matrix)),
        OutputFormat::Text => print!("{}", render_matrix_text(&matrix)),
    }
    Ok(())
}
