//! Remedial actions required before a new configuration can serve traffic.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::snapshot::ServiceTarget;
use crate::domain::validation_id::ValidationId;

/// What must happen to the targeted services.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionKind {
    /// Restart the processes so they pick up the new configuration.
    Restart,
    /// Reprocess all stored documents of `document_type`.
    Refeed { document_type: String },
}

impl ActionKind {
    pub fn name(&self) -> &'static str {
        match self {
            ActionKind::Restart => "restart",
            ActionKind::Refeed { .. } => "refeed",
        }
    }
}

/// A classified action targeted at the services that must perform it.
///
/// # Invariants
///
/// `services` is sorted, free of duplicates and non-empty when produced by the
/// cluster validator. Equality compares the kind (including the refeed
/// document type), the message and the service *set*; the validation id
/// follows from the kind and does not take part.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequiredAction {
    #[serde(flatten)]
    kind: ActionKind,
    message: String,
    services: Vec<ServiceTarget>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    validation_id: Option<ValidationId>,
}

impl RequiredAction {
    pub fn restart(
        message: impl Into<String>,
        services: impl IntoIterator<Item = ServiceTarget>,
    ) -> Self {
        Self::new(ActionKind::Restart, message, services, None)
    }

    pub fn refeed(
        validation_id: ValidationId,
        message: impl Into<String>,
        services: impl IntoIterator<Item = ServiceTarget>,
        document_type: impl Into<String>,
    ) -> Self {
        Self::new(
            ActionKind::Refeed {
                document_type: document_type.into(),
            },
            message,
            services,
            Some(validation_id),
        )
    }

    pub(crate) fn new(
        kind: ActionKind,
        message: impl Into<String>,
        services: impl IntoIterator<Item = ServiceTarget>,
        validation_id: Option<ValidationId>,
    ) -> Self {
        let services: BTreeSet<ServiceTarget> = services.into_iter().collect();
        Self {
            kind,
            message: message.into(),
            services: services.into_iter().collect(),
            validation_id,
        }
    }

    pub fn kind(&self) -> &ActionKind {
        &self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn services(&self) -> &[ServiceTarget] {
        &self.services
    }

    /// Present only for actions that need an override to pass the gate.
    pub fn validation_id(&self) -> Option<ValidationId> {
        self.validation_id
    }

    /// The refeed document type; `None` for restarts.
    pub fn document_type(&self) -> Option<&str> {
        match &self.kind {
            ActionKind::Refeed { document_type } => Some(document_type),
            ActionKind::Restart => None,
        }
    }

    pub fn is_refeed(&self) -> bool {
        matches!(self.kind, ActionKind::Refeed { .. })
    }

    fn service_set(&self) -> BTreeSet<&ServiceTarget> {
        self.services.iter().collect()
    }
}

impl PartialEq for RequiredAction {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.message == other.message
            && self.service_set() == other.service_set()
    }
}

impl Eq for RequiredAction {}

impl fmt::Display for RequiredAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind.name(), self.message)?;
        if let Some(id) = self.validation_id {
            write!(f, " [{}]", id)?;
        }
        let services: Vec<String> = self.services.iter().map(ToString::to_string).collect();
        write!(f, " ({})", services.join(", "))
    }
}

/// Sort actions by message so comparisons ignore production order.
pub fn sort_by_message(actions: &mut [RequiredAction]) {
    actions.sort_by(|a, b| a.message.cmp(&b.message));
}
