//! Fixed policy mapping field changes to remedial actions.
//!
//! Aspect changes only alter how stored data is served, so a restart with the
//! new configuration is enough. A data type change alters the stored encoding
//! and needs a refeed, which is also the only change gated behind a
//! validation id.

use crate::domain::action::ActionKind;
use crate::domain::validation_id::ValidationId;
use crate::schema_diff::{FieldChangeFact, FieldChangeKind};

/// A field change translated into the action it requires.
///
/// `message` is field-level; the cluster validator prefixes the document type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedChange {
    pub kind: ActionKind,
    pub message: String,
    pub validation_id: Option<ValidationId>,
}

/// Classify one field change.
pub fn classify(fact: &FieldChangeFact) -> ClassifiedChange {
    let field = &fact.field_name;
    let verb = if fact.aspect_added() { "add" } else { "remove" };

    match fact.kind {
        FieldChangeKind::AttributeAspectAdded => {
            restart(format!("Field '{field}': add attribute aspect"))
        }
        FieldChangeKind::AttributeAspectRemoved => {
            restart(format!("Field '{field}': remove attribute aspect"))
        }
        FieldChangeKind::IndexAspectChanged => {
            restart(format!("Field '{field}': {verb} index aspect"))
        }
        FieldChangeKind::SummaryAspectChanged => {
            restart(format!("Field '{field}': {verb} summary aspect"))
        }
        FieldChangeKind::DataTypeChanged => ClassifiedChange {
            kind: ActionKind::Refeed {
                document_type: fact.document_type.clone(),
            },
            message: format!(
                "Field '{field}': data type: '{}' -> '{}'",
                fact.old_value, fact.new_value
            ),
            validation_id: Some(ValidationId::FieldTypeChange),
        },
    }
}

fn restart(message: String) -> ClassifiedChange {
    ClassifiedChange {
        kind: ActionKind::Restart,
        message,
        validation_id: None,
    }
}
