use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::domain::action::{sort_by_message, RequiredAction};
use crate::domain::digest::actions_digest;
use crate::gate::BlockedChange;

/// Version of the [`ValidationReport`] JSON layout.
pub const REPORT_SCHEMA_VERSION: &str = "1.0";

/// Canonical validation report artifact written for pipelines.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValidationReport {
    pub schema_version: String,
    pub generated_at: DateTime<Utc>,
    pub passed: bool,
    /// Order-independent digest over allowed and blocking actions together.
    pub actions_digest: String,
    pub allowed: Vec<RequiredAction>,
    pub blocking: Vec<RequiredAction>,
}

impl ValidationReport {
    /// Build a report; both action lists are sorted by message.
    pub fn new(
        generated_at: DateTime<Utc>,
        mut allowed: Vec<RequiredAction>,
        mut blocking: Vec<RequiredAction>,
    ) -> Result<Self> {
        sort_by_message(&mut allowed);
        sort_by_message(&mut blocking);
        let all: Vec<RequiredAction> = allowed.iter().chain(&blocking).cloned().collect();
        let actions_digest = actions_digest(&all).context("digest actions")?;
        Ok(Self {
            schema_version: REPORT_SCHEMA_VERSION.to_string(),
            generated_at,
            passed: blocking.is_empty(),
            actions_digest,
            allowed,
            blocking,
        })
    }

    pub fn from_blocked(generated_at: DateTime<Utc>, blocked: &BlockedChange) -> Result<Self> {
        Self::new(
            generated_at,
            blocked.allowed.clone(),
            blocked.blocking.clone(),
        )
    }
}

/// Write the report in pretty JSON format.
pub fn write_report_json(path: &Path, report: &ValidationReport) -> Result<()> {
    let content = serde_json::to_string_pretty(report).context("serialize validation report")?;
    std::fs::write(path, content).with_context(|| format!("write {:?}", path))?;
    Ok(())
}

/// One line per action, sorted by message.
pub fn render_actions_text(actions: &[RequiredAction]) -> String {
    let mut sorted = actions.to_vec();
    sort_by_message(&mut sorted);
    let mut out = String::new();
    for action in &sorted {
        out.push_str(&action.to_string());
        out.push('\n');
    }
    out
}

/// Render the markdown rejection report shown to the operator.
pub fn render_blocked_report_md(blocked: &BlockedChange) -> String {
    let mut blocking = blocked.blocking.clone();
    let mut allowed = blocked.allowed.clone();
    sort_by_message(&mut blocking);
    sort_by_message(&mut allowed);

    let mut out = String::new();
    out.push_str("# Deployment Blocked\n\n");
    out.push_str(&format!(
        "{} change(s) need a validation override before this deployment can proceed.\n\n",
        blocking.len()
    ));

    out.push_str("## Blocking\n");
    for action in &blocking {
        let id = action
            .validation_id()
            .map(|id| id.as_str())
            .unwrap_or("-");
        out.push_str(&format!("- `{}` {}\n", id, action.message()));
        push_services(&mut out, action);
    }
    out.push('\n');

    if !allowed.is_empty() {
        out.push_str("## Also Required\n");
        for action in &allowed {
            out.push_str(&format!("- {} {}\n", action.kind().name(), action.message()));
            push_services(&mut out, action);
        }
        out.push('\n');
    }

    out.push_str("## Approve\n");
    out.push_str("Add an `[[allow]]` entry per id to the validation overrides:\n");
    for id in blocked.validation_ids() {
        out.push_str(&format!("- `{}`\n", id));
    }
    out
}

fn push_services(out: &mut String, action: &RequiredAction) {
    for service in action.services() {
        out.push_str(&format!("  - {}\n", service));
    }
}
