//! Identifiers for changes that require explicit operator approval.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A known validation identifier, written in kebab-case on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValidationId {
    IndexingChange,
    IndexingModeChange,
    FieldTypeChange,
    ClusterSizeReduction,
    ContentTypeRemoval,
    ContentClusterRemoval,
    DeploymentRemoval,
    GlobalDocumentChange,
}

impl ValidationId {
    pub const ALL: [ValidationId; 8] = [
        ValidationId::IndexingChange,
        ValidationId::IndexingModeChange,
        ValidationId::FieldTypeChange,
        ValidationId::ClusterSizeReduction,
        ValidationId::ContentTypeRemoval,
        ValidationId::ContentClusterRemoval,
        ValidationId::DeploymentRemoval,
        ValidationId::GlobalDocumentChange,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationId::IndexingChange => "indexing-change",
            ValidationId::IndexingModeChange => "indexing-mode-change",
            ValidationId::FieldTypeChange => "field-type-change",
            ValidationId::ClusterSizeReduction => "cluster-size-reduction",
            ValidationId::ContentTypeRemoval => "content-type-removal",
            ValidationId::ContentClusterRemoval => "content-cluster-removal",
            ValidationId::DeploymentRemoval => "deployment-removal",
            ValidationId::GlobalDocumentChange => "global-document-change",
        }
    }
}

impl fmt::Display for ValidationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when an identifier is not one of [`ValidationId::ALL`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown validation id: {0}")]
pub struct UnknownValidationId(pub String);

impl FromStr for ValidationId {
    type Err = UnknownValidationId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ValidationId::ALL
            .iter()
            .copied()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| UnknownValidationId(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_form_matches_serde() {
        for id in ValidationId::ALL {
            let json = serde_json::to_string(&id).expect("serialize");
            assert_eq!(json, format!("\"{}\"", id.as_str()));
            assert_eq!(id.as_str().parse::<ValidationId>(), Ok(id));
        }
    }

    #[test]
    fn test_unknown_id_rejected() {
        let err = "schema-melt".parse::<ValidationId>().unwrap_err();
        assert_eq!(err, UnknownValidationId("schema-melt".to_string()));
    }
}
