//! Field-level diffing of two versions of one document type.
//!
//! Only fields present in both versions are compared; adding or removing a
//! field is safe at this layer. Each common field yields at most one
//! [`FieldChangeFact`]. A data type change wins over aspect changes, since an
//! encoding change dominates whatever the aspects would require.

use serde::{Deserialize, Serialize};

use crate::domain::snapshot::{FieldSnapshot, SchemaSnapshot};

/// The kind of change observed on a single field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldChangeKind {
    AttributeAspectAdded,
    AttributeAspectRemoved,
    DataTypeChanged,
    IndexAspectChanged,
    SummaryAspectChanged,
}

/// One observed field change between two schema versions.
///
/// For `DataTypeChanged` the values are the declared types; for aspect
/// changes they are `"true"` / `"false"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldChangeFact {
    pub document_type: String,
    pub field_name: String,
    pub kind: FieldChangeKind,
    pub old_value: String,
    pub new_value: String,
}

impl FieldChangeFact {
    fn new(
        document_type: &str,
        field: &FieldSnapshot,
        kind: FieldChangeKind,
        old_value: impl ToString,
        new_value: impl ToString,
    ) -> Self {
        Self {
            document_type: document_type.to_string(),
            field_name: field.name.clone(),
            kind,
            old_value: old_value.to_string(),
            new_value: new_value.to_string(),
        }
    }

    /// Whether an aspect was switched on. Meaningless for data type changes.
    pub fn aspect_added(&self) -> bool {
        self.new_value == "true"
    }
}

/// Diff two versions of a document type.
///
/// Facts are returned in the field declaration order of `new`.
pub fn diff_schemas(old: &SchemaSnapshot, new: &SchemaSnapshot) -> Vec<FieldChangeFact> {
    let document_type = new.document_type();
    new.fields()
        .iter()
        .filter_map(|next| {
            let current = old.field(&next.name)?;
            diff_field(document_type, current, next)
        })
        .collect()
}

fn diff_field(
    document_type: &str,
    current: &FieldSnapshot,
    next: &FieldSnapshot,
) -> Option<FieldChangeFact> {
    if current.data_type != next.data_type {
        return Some(FieldChangeFact::new(
            document_type,
            next,
            FieldChangeKind::DataTypeChanged,
            &current.data_type,
            &next.data_type,
        ));
    }

    let (kind, old_value, new_value) = if current.is_attribute != next.is_attribute {
        let kind = if next.is_attribute {
            FieldChangeKind::AttributeAspectAdded
        } else {
            FieldChangeKind::AttributeAspectRemoved
        };
        (kind, current.is_attribute, next.is_attribute)
    } else if current.is_indexed != next.is_indexed {
        (
            FieldChangeKind::IndexAspectChanged,
            current.is_indexed,
            next.is_indexed,
        )
    } else if current.is_summary != next.is_summary {
        (
            FieldChangeKind::SummaryAspectChanged,
            current.is_summary,
            next.is_summary,
        )
    } else {
        return None;
    };

    Some(FieldChangeFact::new(
        document_type,
        next,
        kind,
        old_value,
        new_value,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema(fields: Vec<FieldSnapshot>) -> SchemaSnapshot {
        SchemaSnapshot::new("d1", fields).expect("valid schema")
    }

    #[test]
    fn test_identical_schemas_no_facts() {
        let s = schema(vec![FieldSnapshot::new("f1", "string").summary()]);
        assert!(diff_schemas(&s, &s).is_empty());
    }

    #[test]
    fn test_attribute_added() {
        let old = schema(vec![FieldSnapshot::new("f1", "string").summary()]);
        let new = schema(vec![FieldSnapshot::new("f1", "string").attribute().summary()]);

        let facts = diff_schemas(&old, &new);
        assert_eq!(facts.len(), 1);
        assert_eq!(facts[0].kind, FieldChangeKind::AttributeAspectAdded);
        assert_eq!(facts[0].field_name, "f1");
        assert_eq!(facts[0].document_type, "d1");
        assert!(facts[0].aspect_added());
    }

    #[test]
    fn test_attribute_removed() {
        let old = schema(vec![FieldSnapshot::new("f1", "string").attribute()]);
        let new = schema(vec![FieldSnapshot::new("f1", "string")]);

        let facts = diff_schemas(&old, &new);
        assert_eq!(facts[0].kind, FieldChangeKind::AttributeAspectRemoved);
        assert!(!facts[0].aspect_added());
    }

    #[test]
    fn test_data_type_change_wins_over_aspects() {
        let old = schema(vec![FieldSnapshot::new("f1", "string").summary()]);
        let new = schema(vec![FieldSnapshot::new("f1", "int").attribute().indexed()]);

        let facts = diff_schemas(&old, &new);
        assert_eq!(facts.len(), 1);
        assert_eq!(facts[0].kind, FieldChangeKind::DataTypeChanged);
        assert_eq!(facts[0].old_value, "string");
        assert_eq!(facts[0].new_value, "int");
    }

    #[test]
    fn test_index_and_summary_aspects() {
        let old = schema(vec![
            FieldSnapshot::new("f1", "string"),
            FieldSnapshot::new("f2", "string").summary(),
        ]);
        let new = schema(vec![
            FieldSnapshot::new("f1", "string").indexed(),
            FieldSnapshot::new("f2", "string"),
        ]);

        let facts = diff_schemas(&old, &new);
        assert_eq!(facts.len(), 2);
        assert_eq!(facts[0].kind, FieldChangeKind::IndexAspectChanged);
        assert!(facts[0].aspect_added());
        assert_eq!(facts[1].kind, FieldChangeKind::SummaryAspectChanged);
        assert!(!facts[1].aspect_added());
    }

    #[test]
    fn test_added_and_removed_fields_ignored() {
        let old = schema(vec![FieldSnapshot::new("gone", "string")]);
        let new = schema(vec![FieldSnapshot::new("fresh", "int").attribute()]);
        assert!(diff_schemas(&old, &new).is_empty());
    }

    #[test]
    fn test_facts_follow_new_declaration_order() {
        let old = schema(vec![
            FieldSnapshot::new("a", "string"),
            FieldSnapshot::new("b", "string"),
        ]);
        let new = schema(vec![
            FieldSnapshot::new("b", "int"),
            FieldSnapshot::new("a", "int"),
        ]);

        let names: Vec<_> = diff_schemas(&old, &new)
            .into_iter()
            .map(|f| f.field_name)
            .collect();
        assert_eq!(names, vec!["b", "a"]);
    }
}
