//! deploygate core library
//!
//! Validates the schema changes between the configuration currently serving
//! and the one about to be deployed, turns them into restart and refeed
//! actions targeted at the affected services, and gates refeeds behind
//! operator-approved validation overrides.
//!
//! The pipeline runs leaves first:
//! - [`schema_diff`]: field-level facts for one document type
//! - [`classify`]: fixed policy from fact to action
//! - [`cluster`]: all shared document types of one content cluster
//! - [`gate`]: split actions by override approval
//! - [`run`]: every cluster present in both versions

pub mod classify;
pub mod cluster;
pub mod domain;
pub mod gate;
pub mod obs;
pub mod overrides;
pub mod recorder;
pub mod reporting;
pub mod run;
pub mod schema_diff;
pub mod telemetry;

pub use domain::{
    actions_digest, sort_by_message, ActionKind, ChangeGateError, ClusterSnapshot,
    ClusterSnapshotBuilder, ConfigurationSnapshot, FieldSnapshot, OverridesError,
    RequiredAction, Result, SchemaSnapshot, ServiceTarget, SnapshotError, ValidationId,
};

pub use classify::{classify, ClassifiedChange};
pub use cluster::validate_cluster;
pub use gate::{gate, BlockedChange, GateOutcome};
pub use obs::ValidationSpan;
pub use overrides::{
    AllowEntry, OverrideEntry, OverridesFile, ValidationOverrides, MAX_OVERRIDE_DAYS,
};
pub use recorder::{CountingRecorder, NoopRecorder, ValidationRecorder};
pub use reporting::{
    render_actions_text, render_blocked_report_md, write_report_json, ValidationReport,
};
pub use run::{collect_actions, run, run_with_recorder};
pub use schema_diff::{diff_schemas, FieldChangeFact, FieldChangeKind};
pub use telemetry::init_tracing;

/// deploygate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
