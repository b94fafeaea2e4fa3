//! Structured observability hooks for validation runs.
//!
//! This module provides:
//! - Run-scoped tracing spans via the `ValidationSpan` RAII guard
//! - Emission functions for the key points of a run: per-cluster results,
//!   individual actions, the gate verdict and ignored overrides
//!
//! Events are plain `tracing` events; binaries choose the output format via
//! [`crate::telemetry::init_tracing`].

use tracing::{debug, info, warn};

use crate::domain::action::RequiredAction;

/// RAII guard that enters a validation-scoped tracing span.
///
/// # Example
///
/// ```ignore
/// let _span = ValidationSpan::enter(3, 4);
/// // events below carry current_clusters = 3, next_clusters = 4
/// ```
pub struct ValidationSpan {
    _span: tracing::span::EnteredSpan,
}

impl ValidationSpan {
    pub fn enter(current_clusters: usize, next_clusters: usize) -> Self {
        let span = tracing::info_span!(
            "deploygate.validation",
            current_clusters = current_clusters,
            next_clusters = next_clusters,
        );
        Self {
            _span: span.entered(),
        }
    }
}

/// Emit event: one cluster compared.
pub fn emit_cluster_validated(cluster: &str, actions: usize) {
    info!(event = "cluster.validated", cluster = %cluster, actions = actions);
}

/// Emit event: a single action derived from a field change.
pub fn emit_action_required(cluster: &str, action: &RequiredAction) {
    debug!(
        event = "action.required",
        cluster = %cluster,
        kind = action.kind().name(),
        message = %action.message(),
        services = action.services().len(),
    );
}

/// Emit event: gate evaluated with counts of allowed and blocking actions.
pub fn emit_gate_evaluated(allowed: usize, blocking: usize) {
    info!(
        event = "gate.evaluated",
        allowed = allowed,
        blocking = blocking,
        passed = blocking == 0,
    );
}

/// Emit event: a gated action had no live override (warning level).
pub fn emit_change_blocked(action: &RequiredAction) {
    warn!(
        event = "gate.blocked",
        message = %action.message(),
        validation_id = action.validation_id().map(|id| id.as_str()).unwrap_or(""),
    );
}

/// Emit event: an override entry was skipped while loading (warning level).
pub fn emit_override_ignored(id: &str, reason: &dyn std::fmt::Display) {
    warn!(event = "overrides.ignored", id = %id, reason = %reason);
}
