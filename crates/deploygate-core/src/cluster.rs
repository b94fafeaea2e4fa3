//! Change validation for one content cluster.

use crate::classify::classify;
use crate::domain::action::RequiredAction;
use crate::domain::error::SnapshotError;
use crate::domain::snapshot::ClusterSnapshot;
use crate::obs;
use crate::schema_diff::diff_schemas;

/// Compare two versions of the same content cluster.
///
/// Every document type served in both versions is diffed field by field.
/// Each change becomes one action, prefixed with its document type and
/// targeted at the services that will run that document type in `next`.
/// Document types served on only one side produce nothing. Actions come out
/// in document type name order; equal changes in different document types
/// stay separate actions.
pub fn validate_cluster(
    current: &ClusterSnapshot,
    next: &ClusterSnapshot,
) -> Result<Vec<RequiredAction>, SnapshotError> {
    if current.cluster_name() != next.cluster_name() {
        return Err(SnapshotError::ClusterNameMismatch {
            current: current.cluster_name().to_string(),
            next: next.cluster_name().to_string(),
        });
    }

    let mut actions = Vec::new();
    for (document_type, next_schema) in next.document_types() {
        let Some(current_schema) = current.schema(document_type) else {
            continue;
        };
        let facts = diff_schemas(current_schema, next_schema);
        if facts.is_empty() {
            continue;
        }
        let services = next
            .services(document_type)
            .filter(|services| !services.is_empty())
            .ok_or_else(|| SnapshotError::MissingServices {
                cluster: next.cluster_name().to_string(),
                document_type: document_type.clone(),
            })?;

        for fact in &facts {
            let change = classify(fact);
            let action = RequiredAction::new(
                change.kind,
                format!("Document type '{}': {}", document_type, change.message),
                services.iter().cloned(),
                change.validation_id,
            );
            obs::emit_action_required(next.cluster_name(), &action);
            actions.push(action);
        }
    }

    obs::emit_cluster_validated(next.cluster_name(), actions.len());
    Ok(actions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::action::ActionKind;
    use crate::domain::snapshot::{FieldSnapshot, SchemaSnapshot, ServiceTarget};

    fn cluster(name: &str, docs: &[(&str, FieldSnapshot)]) -> ClusterSnapshot {
        docs.iter()
            .fold(ClusterSnapshot::builder(name), |b, (doc, field)| {
                let schema = SchemaSnapshot::new(*doc, vec![field.clone()]).expect("schema");
                b.document_type(
                    schema,
                    vec![ServiceTarget::new(
                        "searchnode",
                        format!("{name}/search/cluster.{name}/{doc}"),
                    )],
                )
            })
            .build()
            .expect("cluster")
    }

    #[test]
    fn test_rejects_mismatched_cluster_names() {
        let field = FieldSnapshot::new("f1", "string");
        let err = validate_cluster(
            &cluster("foo", &[("d1", field.clone())]),
            &cluster("bar", &[("d1", field)]),
        )
        .unwrap_err();
        assert!(matches!(err, SnapshotError::ClusterNameMismatch { .. }));
    }

    #[test]
    fn test_prefixes_document_type_and_targets_next_services() {
        let current = cluster("foo", &[("d1", FieldSnapshot::new("f1", "string").summary())]);
        let next = cluster(
            "foo",
            &[("d1", FieldSnapshot::new("f1", "string").attribute().summary())],
        );

        let actions = validate_cluster(&current, &next).expect("validate");
        assert_eq!(actions.len(), 1);
        assert_eq!(
            actions[0].message(),
            "Document type 'd1': Field 'f1': add attribute aspect"
        );
        assert_eq!(
            actions[0].services(),
            &[ServiceTarget::new("searchnode", "foo/search/cluster.foo/d1")]
        );
    }

    #[test]
    fn test_refeed_scoped_to_document_type() {
        let current = cluster("foo", &[("d1", FieldSnapshot::new("f1", "string"))]);
        let next = cluster("foo", &[("d1", FieldSnapshot::new("f1", "int"))]);

        let actions = validate_cluster(&current, &next).expect("validate");
        assert_eq!(
            actions[0].kind(),
            &ActionKind::Refeed {
                document_type: "d1".to_string()
            }
        );
    }

    #[test]
    fn test_one_sided_document_types_skipped() {
        let field = FieldSnapshot::new("f1", "string");
        let current = cluster("foo", &[("d1", field.clone())]);
        let next = cluster(
            "foo",
            &[("d1", field), ("d2", FieldSnapshot::new("f1", "int"))],
        );
        assert!(validate_cluster(&current, &next).expect("validate").is_empty());
        assert!(validate_cluster(&next, &current).expect("validate").is_empty());
    }
}
