//! Domain-level error taxonomy for deploygate.

use crate::gate::BlockedChange;

/// Malformed snapshot input handed over by an upstream model builder.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SnapshotError {
    #[error("document type '{document_type}' declares field '{field}' more than once")]
    DuplicateField {
        document_type: String,
        field: String,
    },

    #[error("schema for document type '{actual}' is filed under key '{key}'")]
    DocumentTypeKeyMismatch { key: String, actual: String },

    #[error("cluster '{actual}' is filed under key '{key}'")]
    ClusterKeyMismatch { key: String, actual: String },

    #[error("cluster '{cluster}' appears more than once in one configuration")]
    DuplicateCluster { cluster: String },

    #[error("cluster '{cluster}' declares document type '{document_type}' more than once")]
    DuplicateDocumentType {
        cluster: String,
        document_type: String,
    },

    #[error("cluster '{cluster}' serves document type '{document_type}' without any services")]
    MissingServices {
        cluster: String,
        document_type: String,
    },

    #[error("cluster '{cluster}' lists services for unknown document type '{document_type}'")]
    UnknownServiceDocumentType {
        cluster: String,
        document_type: String,
    },

    #[error("cannot compare cluster '{current}' with cluster '{next}'")]
    ClusterNameMismatch { current: String, next: String },
}

/// Errors produced while loading validation overrides.
#[derive(Debug, thiserror::Error)]
pub enum OverridesError {
    #[error("invalid override date '{value}': expected YYYY-MM-DD")]
    InvalidDate { value: String },

    #[error("override for '{id}' is valid until {until}, more than {max_days} days from now")]
    UntilTooFarAhead {
        id: String,
        until: chrono::NaiveDate,
        max_days: i64,
    },

    #[error("unsupported override file format: {0}")]
    UnsupportedFormat(String),

    #[error("toml parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("json parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Outcome of a validation run that must stop deployment preparation.
#[derive(Debug, thiserror::Error)]
pub enum ChangeGateError {
    /// One or more refeed-class actions lack an approving override.
    #[error("{0}")]
    Blocked(BlockedChange),

    #[error("malformed snapshot: {0}")]
    Snapshot(#[from] SnapshotError),
}

impl ChangeGateError {
    /// The blocked change, if this is the expected negative outcome rather than a fault.
    pub fn blocked(&self) -> Option<&BlockedChange> {
        match self {
            ChangeGateError::Blocked(blocked) => Some(blocked),
            ChangeGateError::Snapshot(_) => None,
        }
    }
}

impl From<BlockedChange> for ChangeGateError {
    fn from(blocked: BlockedChange) -> Self {
        ChangeGateError::Blocked(blocked)
    }
}

/// Result type for validation runs.
pub type Result<T> = std::result::Result<T, ChangeGateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_error_display() {
        let err = SnapshotError::DuplicateField {
            document_type: "music".to_string(),
            field: "title".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "document type 'music' declares field 'title' more than once"
        );

        let err = SnapshotError::ClusterNameMismatch {
            current: "foo".to_string(),
            next: "bar".to_string(),
        };
        assert!(err.to_string().contains("'foo'"));
        assert!(err.to_string().contains("'bar'"));
    }

    #[test]
    fn test_snapshot_error_converts_into_gate_error() {
        let err: ChangeGateError = SnapshotError::MissingServices {
            cluster: "foo".to_string(),
            document_type: "d1".to_string(),
        }
        .into();
        assert!(err.blocked().is_none());
        assert!(err.to_string().starts_with("malformed snapshot"));
    }

    #[test]
    fn test_blocked_change_converts_into_gate_error() {
        let err = ChangeGateError::from(BlockedChange {
            blocking: Vec::new(),
            allowed: Vec::new(),
        });
        assert!(err.blocked().is_some());
        assert!(err.to_string().starts_with("deployment blocked"));
    }

    #[test]
    fn test_invalid_date_error() {
        let err = OverridesError::InvalidDate {
            value: "tomorrow".to_string(),
        };
        assert!(err.to_string().contains("tomorrow"));
    }
}
