//! Immutable configuration snapshots compared by the validation engine.
//!
//! Snapshots are produced by an external model builder, either through the
//! constructors here or by deserializing JSON. Both paths run the same
//! structural checks, so a value of any of these types is well-formed:
//! field names are unique per schema, no document type or cluster is listed
//! twice, every map key agrees with the name of the entity stored under it,
//! and every served document type has at least one running service.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;
use std::marker::PhantomData;

use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::error::SnapshotError;

// ---------------------------------------------------------------------------
// Fields and schemas
// ---------------------------------------------------------------------------

/// One field definition of a document type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSnapshot {
    pub name: String,
    pub data_type: String,
    #[serde(default)]
    pub is_attribute: bool,
    #[serde(default)]
    pub is_indexed: bool,
    #[serde(default)]
    pub is_summary: bool,
}

impl FieldSnapshot {
    /// A field with no indexing aspects.
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            is_attribute: false,
            is_indexed: false,
            is_summary: false,
        }
    }

    pub fn attribute(mut self) -> Self {
        self.is_attribute = true;
        self
    }

    pub fn indexed(mut self) -> Self {
        self.is_indexed = true;
        self
    }

    pub fn summary(mut self) -> Self {
        self.is_summary = true;
        self
    }
}

/// The ordered field list of one document type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSchemaSnapshot")]
pub struct SchemaSnapshot {
    document_type: String,
    fields: Vec<FieldSnapshot>,
}

#[derive(Deserialize)]
struct RawSchemaSnapshot {
    document_type: String,
    #[serde(default)]
    fields: Vec<FieldSnapshot>,
}

impl TryFrom<RawSchemaSnapshot> for SchemaSnapshot {
    type Error = SnapshotError;

    fn try_from(raw: RawSchemaSnapshot) -> Result<Self, Self::Error> {
        SchemaSnapshot::new(raw.document_type, raw.fields)
    }
}

impl SchemaSnapshot {
    /// Build a schema, keeping declaration order and rejecting repeated field names.
    pub fn new(
        document_type: impl Into<String>,
        fields: Vec<FieldSnapshot>,
    ) -> Result<Self, SnapshotError> {
        let document_type = document_type.into();
        let mut seen = HashSet::new();
        for field in &fields {
            if !seen.insert(field.name.as_str()) {
                return Err(SnapshotError::DuplicateField {
                    document_type,
                    field: field.name.clone(),
                });
            }
        }
        Ok(Self {
            document_type,
            fields,
        })
    }

    pub fn document_type(&self) -> &str {
        &self.document_type
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[FieldSnapshot] {
        &self.fields
    }

    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldSnapshot> {
        self.fields.iter().find(|f| f.name == name)
    }
}

// ---------------------------------------------------------------------------
// Services
// ---------------------------------------------------------------------------

/// A stable identifier for one running process instance.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ServiceTarget {
    pub service_type: String,
    pub config_id: String,
}

impl ServiceTarget {
    pub fn new(service_type: impl Into<String>, config_id: impl Into<String>) -> Self {
        Self {
            service_type: service_type.into(),
            config_id: config_id.into(),
        }
    }
}

impl fmt::Display for ServiceTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.service_type, self.config_id)
    }
}

// ---------------------------------------------------------------------------
// Clusters
// ---------------------------------------------------------------------------

/// One content cluster: its document types and the services running each.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawClusterSnapshot")]
pub struct ClusterSnapshot {
    cluster_name: String,
    document_types: BTreeMap<String, SchemaSnapshot>,
    services_by_document_type: BTreeMap<String, BTreeSet<ServiceTarget>>,
}

#[derive(Deserialize)]
struct RawClusterSnapshot {
    cluster_name: String,
    #[serde(default, deserialize_with = "unique_keys")]
    document_types: BTreeMap<String, SchemaSnapshot>,
    #[serde(default, deserialize_with = "unique_keys")]
    services_by_document_type: BTreeMap<String, BTreeSet<ServiceTarget>>,
}

impl TryFrom<RawClusterSnapshot> for ClusterSnapshot {
    type Error = SnapshotError;

    fn try_from(raw: RawClusterSnapshot) -> Result<Self, Self::Error> {
        let cluster = ClusterSnapshot {
            cluster_name: raw.cluster_name,
            document_types: raw.document_types,
            services_by_document_type: raw.services_by_document_type,
        };
        cluster.check()?;
        Ok(cluster)
    }
}

impl ClusterSnapshot {
    /// Start building a cluster snapshot.
    pub fn builder(cluster_name: impl Into<String>) -> ClusterSnapshotBuilder {
        ClusterSnapshotBuilder {
            cluster_name: cluster_name.into(),
            document_types: BTreeMap::new(),
            services_by_document_type: BTreeMap::new(),
            duplicate: None,
        }
    }

    pub fn cluster_name(&self) -> &str {
        &self.cluster_name
    }

    /// Schemas keyed by document type name.
    pub fn document_types(&self) -> &BTreeMap<String, SchemaSnapshot> {
        &self.document_types
    }

    pub fn schema(&self, document_type: &str) -> Option<&SchemaSnapshot> {
        self.document_types.get(document_type)
    }

    /// Services running the given document type. Never empty for a served type.
    pub fn services(&self, document_type: &str) -> Option<&BTreeSet<ServiceTarget>> {
        self.services_by_document_type.get(document_type)
    }

    fn check(&self) -> Result<(), SnapshotError> {
        for (key, schema) in &self.document_types {
            if key != schema.document_type() {
                return Err(SnapshotError::DocumentTypeKeyMismatch {
                    key: key.clone(),
                    actual: schema.document_type().to_string(),
                });
            }
            let served = self
                .services_by_document_type
                .get(key)
                .is_some_and(|services| !services.is_empty());
            if !served {
                return Err(SnapshotError::MissingServices {
                    cluster: self.cluster_name.clone(),
                    document_type: key.clone(),
                });
            }
        }
        if let Some(unknown) = self
            .services_by_document_type
            .keys()
            .find(|key| !self.document_types.contains_key(*key))
        {
            return Err(SnapshotError::UnknownServiceDocumentType {
                cluster: self.cluster_name.clone(),
                document_type: unknown.clone(),
            });
        }
        Ok(())
    }
}

/// Builder for [`ClusterSnapshot`]; structural checks run in [`build`](Self::build).
#[derive(Debug, Clone)]
pub struct ClusterSnapshotBuilder {
    cluster_name: String,
    document_types: BTreeMap<String, SchemaSnapshot>,
    services_by_document_type: BTreeMap<String, BTreeSet<ServiceTarget>>,
    /// First document type added twice; reported by `build`.
    duplicate: Option<String>,
}

impl ClusterSnapshotBuilder {
    /// Serve `schema` on the given services.
    pub fn document_type(
        mut self,
        schema: SchemaSnapshot,
        services: impl IntoIterator<Item = ServiceTarget>,
    ) -> Self {
        let name = schema.document_type().to_string();
        if self.document_types.contains_key(&name) {
            self.duplicate.get_or_insert(name);
            return self;
        }
        self.services_by_document_type
            .insert(name.clone(), services.into_iter().collect());
        self.document_types.insert(name, schema);
        self
    }

    pub fn build(self) -> Result<ClusterSnapshot, SnapshotError> {
        if let Some(document_type) = self.duplicate {
            return Err(SnapshotError::DuplicateDocumentType {
                cluster: self.cluster_name,
                document_type,
            });
        }
        let cluster = ClusterSnapshot {
            cluster_name: self.cluster_name,
            document_types: self.document_types,
            services_by_document_type: self.services_by_document_type,
        };
        cluster.check()?;
        Ok(cluster)
    }
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// One full configuration version: every content cluster by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawConfigurationSnapshot")]
pub struct ConfigurationSnapshot {
    clusters: BTreeMap<String, ClusterSnapshot>,
}

#[derive(Deserialize)]
struct RawConfigurationSnapshot {
    #[serde(default, deserialize_with = "unique_keys")]
    clusters: BTreeMap<String, ClusterSnapshot>,
}

impl TryFrom<RawConfigurationSnapshot> for ConfigurationSnapshot {
    type Error = SnapshotError;

    fn try_from(raw: RawConfigurationSnapshot) -> Result<Self, Self::Error> {
        for (key, cluster) in &raw.clusters {
            if key != cluster.cluster_name() {
                return Err(SnapshotError::ClusterKeyMismatch {
                    key: key.clone(),
                    actual: cluster.cluster_name().to_string(),
                });
            }
        }
        Ok(Self {
            clusters: raw.clusters,
        })
    }
}

impl ConfigurationSnapshot {
    /// Key the given clusters by name, rejecting repeated names.
    pub fn new(
        clusters: impl IntoIterator<Item = ClusterSnapshot>,
    ) -> Result<Self, SnapshotError> {
        let mut by_name = BTreeMap::new();
        for cluster in clusters {
            let name = cluster.cluster_name().to_string();
            if by_name.contains_key(&name) {
                return Err(SnapshotError::DuplicateCluster { cluster: name });
            }
            by_name.insert(name, cluster);
        }
        Ok(Self { clusters: by_name })
    }

    pub fn clusters(&self) -> &BTreeMap<String, ClusterSnapshot> {
        &self.clusters
    }

    /// Cluster pairs present in both versions, ordered by cluster name.
    pub fn common_clusters<'a>(
        &'a self,
        next: &'a ConfigurationSnapshot,
    ) -> impl Iterator<Item = (&'a ClusterSnapshot, &'a ClusterSnapshot)> + 'a {
        self.clusters
            .iter()
            .filter_map(move |(name, current)| next.clusters.get(name).map(|n| (current, n)))
    }
}

/// Deserialize a map, failing on a repeated key instead of keeping the last entry.
fn unique_keys<'de, D, V>(deserializer: D) -> Result<BTreeMap<String, V>, D::Error>
where
    D: Deserializer<'de>,
    V: Deserialize<'de>,
{
    struct UniqueKeys<V>(PhantomData<V>);

    impl<'de, V: Deserialize<'de>> Visitor<'de> for UniqueKeys<V> {
        type Value = BTreeMap<String, V>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map with unique keys")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
            let mut map = BTreeMap::new();
            while let Some((key, value)) = access.next_entry::<String, V>()? {
                if map.contains_key(&key) {
                    return Err(de::Error::custom(format_args!("duplicate key '{key}'")));
                }
                map.insert(key, value);
            }
            Ok(map)
        }
    }

    deserializer.deserialize_map(UniqueKeys(PhantomData))
}
