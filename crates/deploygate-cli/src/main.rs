//! deploygate - schema change validation for deployment pipelines
//!
//! ## Commands
//!
//! - `validate`: compare two configuration snapshots and gate the result
//! - `override-request`: print an override file approving what currently blocks

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing::{info, Level};

use deploygate_core::{
    collect_actions, gate, render_actions_text, render_blocked_report_md, run_with_recorder,
    write_report_json, ChangeGateError, ConfigurationSnapshot, CountingRecorder, NoopRecorder,
    ValidationOverrides, ValidationReport,
};

#[derive(Parser)]
#[command(name = "deploygate")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Schema change validation and deployment gating", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the change between the serving and the next configuration
    Validate {
        /// Snapshot of the configuration currently serving (JSON)
        #[arg(long)]
        current: PathBuf,

        /// Snapshot of the configuration about to be deployed (JSON)
        #[arg(long)]
        next: PathBuf,

        /// Validation overrides file (.toml or .json)
        #[arg(long, env = "DEPLOYGATE_OVERRIDES")]
        overrides: Option<PathBuf>,

        /// Evaluation time, RFC 3339 (default: now)
        #[arg(long)]
        now: Option<String>,

        /// Write a JSON validation report to this path
        #[arg(long)]
        report: Option<PathBuf>,

        /// Output format for the action list
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Print a validation overrides file approving every blocking change
    OverrideRequest {
        /// Snapshot of the configuration currently serving (JSON)
        #[arg(long)]
        current: PathBuf,

        /// Snapshot of the configuration about to be deployed (JSON)
        #[arg(long)]
        next: PathBuf,

        /// Evaluation time, RFC 3339 (default: now)
        #[arg(long)]
        now: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    deploygate_core::init_tracing(cli.json, level);

    match cli.command {
        Commands::Validate {
            current,
            next,
            overrides,
            now,
            report,
            format,
        } => cmd_validate(
            &current,
            &next,
            overrides.as_deref(),
            now.as_deref(),
            report.as_deref(),
            format,
        ),
        Commands::OverrideRequest { current, next, now } => {
            cmd_override_request(&current, &next, now.as_deref())
        }
    }
}

fn cmd_validate(
    current: &Path,
    next: &Path,
    overrides: Option<&Path>,
    now: Option<&str>,
    report: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    let now = parse_now(now)?;
    let current = read_snapshot(current)?;
    let next = read_snapshot(next)?;
    let overrides = match overrides {
        Some(path) => ValidationOverrides::load(path, now)
            .with_context(|| format!("Failed to load validation overrides: {:?}", path))?,
        None => ValidationOverrides::empty(),
    };

    let recorder = CountingRecorder::new();
    let result = run_with_recorder(&current, &next, &overrides, now, &recorder);
    recorder.flush();

    let (allowed, blocking) = match result {
        Ok(allowed) => (allowed, Vec::new()),
        Err(ChangeGateError::Blocked(blocked)) => {
            eprintln!("{}", render_blocked_report_md(&blocked));
            (blocked.allowed, blocked.blocking)
        }
        Err(err) => return Err(err).context("Validation failed"),
    };

    let validation_report = ValidationReport::new(now, allowed, blocking)?;
    if let Some(path) = report {
        write_report_json(path, &validation_report)?;
        info!(path = ?path, "validation report written");
    }

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&validation_report)?)
        }
        OutputFormat::Text => print!("{}", render_actions_text(&validation_report.allowed)),
    }

    if !validation_report.passed {
        anyhow::bail!(
            "Deployment blocked: {} change(s) need a validation override",
            validation_report.blocking.len()
        );
    }
    Ok(())
}

fn cmd_override_request(current: &Path, next: &Path, now: Option<&str>) -> Result<()> {
    match render_override_request(current, next, parse_now(now)?)? {
        Some(request) => print!("{}", request),
        None => info!("no change requires a validation override"),
    }
    Ok(())
}

/// TOML overrides approving every blocking change, or `None` if nothing blocks.
fn render_override_request(
    current: &Path,
    next: &Path,
    now: DateTime<Utc>,
) -> Result<Option<String>> {
    let current = read_snapshot(current)?;
    let next = read_snapshot(next)?;

    let actions = collect_actions(&current, &next, &NoopRecorder).context("Validation failed")?;
    match gate(actions, &ValidationOverrides::empty(), now).into_result() {
        Ok(_) => Ok(None),
        Err(blocked) => Ok(Some(blocked.override_request(now).to_toml_string()?)),
    }
}

fn parse_now(now: Option<&str>) -> Result<DateTime<Utc>> {
    match now {
        Some(raw) => Ok(DateTime::parse_from_rfc3339(raw)
            .with_context(|| format!("Invalid --now timestamp: {}", raw))?
            .with_timezone(&Utc)),
        None => Ok(Utc::now()),
    }
}

fn read_snapshot(path: &Path) -> Result<ConfigurationSnapshot> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read snapshot file: {:?}", path))?;
    serde_json::from_str(&content).with_context(|| format!("Invalid snapshot in {:?}", path))
}
