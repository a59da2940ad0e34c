//! Graph mutation capability.
//!
//! [`GraphStore`] is the narrow interface the indexing and deletion engines
//! run against: find/merge a vertex, link two vertices, and the filtered
//! traversal-delete that backs reference-counted cleanup. [`GraphClient`]
//! implements it over Cypher; tests substitute an in-memory store.

use async_trait::async_trait;
use neo4rs::Query;

use crate::client::{GraphClient, GraphError, GraphResult};

/// Property key holding a collection's catalog concept id.
pub const CONCEPT_ID: &str = "concept_id";

/// Vertex labels in the metadata graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexLabel {
    Collection,
    Campaign,
    Platform,
    RelatedUrl,
}

impl VertexLabel {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Collection => "Collection",
            Self::Campaign => "Campaign",
            Self::Platform => "Platform",
            Self::RelatedUrl => "RelatedUrl",
        }
    }
}

impl std::fmt::Display for VertexLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Edge labels, one per related-entity category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeLabel {
    /// Collection → Campaign
    PartOf,
    /// Collection → Platform
    AcquiredBy,
    /// Collection → RelatedUrl
    DocumentedBy,
}

impl EdgeLabel {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PartOf => "PART_OF",
            Self::AcquiredBy => "ACQUIRED_BY",
            Self::DocumentedBy => "DOCUMENTED_BY",
        }
    }

    /// The entity label this edge category points at.
    pub const fn target(self) -> VertexLabel {
        match self {
            Self::PartOf => VertexLabel::Campaign,
            Self::AcquiredBy => VertexLabel::Platform,
            Self::DocumentedBy => VertexLabel::RelatedUrl,
        }
    }
}

impl std::fmt::Display for EdgeLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A vertex property value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropValue {
    Text(String),
    List(Vec<String>),
}

impl From<&str> for PropValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for PropValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<Vec<String>> for PropValue {
    fn from(items: Vec<String>) -> Self {
        Self::List(items)
    }
}

/// Named properties for a vertex.
pub type Props = Vec<(&'static str, PropValue)>;

/// Opaque handle to a vertex (the backend's element id).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexRef {
    pub id: String,
}

/// The mutation operations the synchronization engine needs.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Look a vertex up by label and key property.
    async fn find_vertex(
        &self,
        label: VertexLabel,
        key_prop: &str,
        key: &str,
    ) -> GraphResult<Option<VertexRef>>;

    /// Find a vertex by its key properties or create it in one round trip.
    ///
    /// `on_create` properties are applied only when the vertex is created;
    /// an existing vertex is returned untouched.
    async fn find_or_create(
        &self,
        label: VertexLabel,
        key_props: Props,
        on_create: Props,
    ) -> GraphResult<VertexRef>;

    /// Create an edge between two vertices. Merging by element id keeps the
    /// call idempotent for an unchanged endpoint pair.
    async fn add_edge(&self, from: &VertexRef, to: &VertexRef, edge: EdgeLabel) -> GraphResult<()>;

    /// Detach-delete a vertex by label and key. Returns the number of
    /// vertices removed (0 when it never existed).
    async fn delete_vertex(
        &self,
        label: VertexLabel,
        key_prop: &str,
        key: &str,
    ) -> GraphResult<u64>;

    /// From the start vertex, follow `edge` and detach-delete every target
    /// whose in-degree over that edge label is at most one.
    ///
    /// Check and delete happen in a single filtered traversal so no second
    /// referrer can appear between them within this call.
    async fn delete_linked_exclusive(
        &self,
        start_label: VertexLabel,
        key_prop: &str,
        key: &str,
        edge: EdgeLabel,
        target_label: VertexLabel,
    ) -> GraphResult<u64>;
}

fn key_pattern(key_props: &Props) -> String {
    key_props
        .iter()
        .map(|(name, _)| format!("{name}: $k_{name}"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn merge_cypher(label: VertexLabel, key_props: &Props, on_create: &Props) -> String {
    let mut cypher = format!("MERGE (n:{} {{{}}})", label.as_str(), key_pattern(key_props));
    if !on_create.is_empty() {
        let sets = on_create
            .iter()
            .map(|(name, _)| format!("n.{name} = $c_{name}"))
            .collect::<Vec<_>>()
            .join(", ");
        cypher.push_str(&format!("\nON CREATE SET {sets}"));
    }
    cypher.push_str("\nRETURN elementId(n) AS id");
    cypher
}

fn find_cypher(label: VertexLabel, key_prop: &str) -> String {
    format!(
        "MATCH (n:{} {{{key_prop}: $key}})\nRETURN elementId(n) AS id\nLIMIT 1",
        label.as_str()
    )
}

fn add_edge_cypher(edge: EdgeLabel) -> String {
    format!(
        "MATCH (a), (b)\nWHERE elementId(a) = $from AND elementId(b) = $to\nMERGE (a)-[:{}]->(b)",
        edge.as_str()
    )
}

fn delete_vertex_cypher(label: VertexLabel, key_prop: &str) -> String {
    format!(
        "MATCH (n:{} {{{key_prop}: $key}})\nDETACH DELETE n\nRETURN count(n) AS deleted",
        label.as_str()
    )
}

fn delete_linked_exclusive_cypher(
    start_label: VertexLabel,
    key_prop: &str,
    edge: EdgeLabel,
    target_label: VertexLabel,
) -> String {
    format!(
        "MATCH (s:{start} {{{key_prop}: $key}})-[:{edge}]->(t:{target})\n\
         WHERE COUNT {{ (t)<-[:{edge}]-() }} <= 1\n\
         DETACH DELETE t\n\
         RETURN count(t) AS deleted",
        start = start_label.as_str(),
        edge = edge.as_str(),
        target = target_label.as_str(),
    )
}

fn apply_params(mut query: Query, prefix: &str, props: &Props) -> Query {
    for (name, value) in props {
        let param = format!("{prefix}{name}");
        query = match value {
            PropValue::Text(s) => query.param(&param, s.clone()),
            PropValue::List(items) => query.param(&param, items.clone()),
        };
    }
    query
}

fn id_from_rows(rows: Vec<neo4rs::Row>) -> GraphResult<VertexRef> {
    let row = rows
        .into_iter()
        .next()
        .ok_or_else(|| GraphError::Malformed("merge returned no row".to_string()))?;
    let id: String = row
        .get("id")
        .map_err(|e| GraphError::Malformed(format!("missing id column: {e:?}")))?;
    Ok(VertexRef { id })
}

#[async_trait]
impl GraphStore for GraphClient {
    async fn find_vertex(
        &self,
        label: VertexLabel,
        key_prop: &str,
        key: &str,
    ) -> GraphResult<Option<VertexRef>> {
        let query = Query::new(find_cypher(label, key_prop)).param("key", key);
        let rows = self.query(query).await?;
        match rows.into_iter().next() {
            Some(row) => {
                let id: String = row
                    .get("id")
                    .map_err(|e| GraphError::Malformed(format!("missing id column: {e:?}")))?;
                Ok(Some(VertexRef { id }))
            }
            None => Ok(None),
        }
    }

    async fn find_or_create(
        &self,
        label: VertexLabel,
        key_props: Props,
        on_create: Props,
    ) -> GraphResult<VertexRef> {
        let mut query = Query::new(merge_cypher(label, &key_props, &on_create));
        query = apply_params(query, "k_", &key_props);
        query = apply_params(query, "c_", &on_create);
        id_from_rows(self.query(query).await?)
    }

    async fn add_edge(&self, from: &VertexRef, to: &VertexRef, edge: EdgeLabel) -> GraphResult<()> {
        let query = Query::new(add_edge_cypher(edge))
            .param("from", from.id.as_str())
            .param("to", to.id.as_str());
        self.execute(query).await
    }

    async fn delete_vertex(
        &self,
        label: VertexLabel,
        key_prop: &str,
        key: &str,
    ) -> GraphResult<u64> {
        let query = Query::new(delete_vertex_cypher(label, key_prop)).param("key", key);
        let deleted: Option<i64> = self.query_scalar(query, "deleted").await?;
        Ok(deleted.unwrap_or(0) as u64)
    }

    async fn delete_linked_exclusive(
        &self,
        start_label: VertexLabel,
        key_prop: &str,
        key: &str,
        edge: EdgeLabel,
        target_label: VertexLabel,
    ) -> GraphResult<u64> {
        let cypher = delete_linked_exclusive_cypher(start_label, key_prop, edge, target_label);
        let query = Query::new(cypher).param("key", key);
        let deleted: Option<i64> = self.query_scalar(query, "deleted").await?;
        Ok(deleted.unwrap_or(0) as u64)
    }
}
