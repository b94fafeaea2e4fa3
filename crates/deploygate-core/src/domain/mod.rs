//! Domain models for deploygate.
//!
//! Canonical definitions for the core entities:
//! - `SchemaSnapshot` / `ClusterSnapshot` / `ConfigurationSnapshot`: immutable
//!   views of one configuration version
//! - `RequiredAction`: a restart or refeed targeted at running services
//! - `ValidationId`: identifiers for changes that need operator approval

pub mod action;
pub mod digest;
pub mod error;
pub mod snapshot;
pub mod validation_id;

pub use action::{sort_by_message, ActionKind, RequiredAction};
pub use digest::actions_digest;
pub use error::{ChangeGateError, OverridesError, Result, SnapshotError};
pub use snapshot::{
    ClusterSnapshot, ClusterSnapshotBuilder, ConfigurationSnapshot, FieldSnapshot,
    SchemaSnapshot, ServiceTarget,
};
pub use validation_id::{UnknownValidationId, ValidationId};
