//! Top-level validation run over two configuration versions.

use chrono::{DateTime, Utc};

use crate::cluster::validate_cluster;
use crate::domain::action::RequiredAction;
use crate::domain::error::{ChangeGateError, Result};
use crate::domain::snapshot::ConfigurationSnapshot;
use crate::gate::gate;
use crate::obs::ValidationSpan;
use crate::overrides::ValidationOverrides;
use crate::recorder::{NoopRecorder, ValidationRecorder};

/// Validate the change from `current` to `next`.
///
/// Clusters present in only one version produce no action. For clusters in
/// both, every field change in a shared document type is classified and
/// targeted; the result then passes through the override gate.
///
/// Returns `Ok(allowed)` when nothing blocks. Returns
/// [`ChangeGateError::Blocked`] when a gated change has no live override in
/// `overrides` at `now`. The run reads nothing but its arguments, so the
/// same inputs always produce the same action set.
pub fn run(
    current: &ConfigurationSnapshot,
    next: &ConfigurationSnapshot,
    overrides: &ValidationOverrides,
    now: DateTime<Utc>,
) -> Result<Vec<RequiredAction>> {
    run_with_recorder(current, next, overrides, now, &NoopRecorder)
}

/// [`run`], reporting counts to a caller-owned recorder.
pub fn run_with_recorder(
    current: &ConfigurationSnapshot,
    next: &ConfigurationSnapshot,
    overrides: &ValidationOverrides,
    now: DateTime<Utc>,
    recorder: &dyn ValidationRecorder,
) -> Result<Vec<RequiredAction>> {
    let actions = collect_actions(current, next, recorder)?;
    recorder.record_actions(&actions);

    gate(actions, overrides, now).into_result().map_err(|blocked| {
        recorder.record_blocked(blocked.blocking.len());
        ChangeGateError::from(blocked)
    })
}

/// All actions required by the change, before gating.
pub fn collect_actions(
    current: &ConfigurationSnapshot,
    next: &ConfigurationSnapshot,
    recorder: &dyn ValidationRecorder,
) -> Result<Vec<RequiredAction>> {
    let _span = ValidationSpan::enter(current.clusters().len(), next.clusters().len());

    let mut actions = Vec::new();
    for (current_cluster, next_cluster) in current.common_clusters(next) {
        actions.extend(validate_cluster(current_cluster, next_cluster)?);
        recorder.record_cluster_validated(next_cluster.cluster_name());
    }
    Ok(actions)
}
