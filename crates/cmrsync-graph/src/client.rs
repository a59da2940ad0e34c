//! Neo4j connection client.

use neo4rs::{ConfigBuilder, Graph, Query};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;

use crate::store::VertexLabel;

/// Errors from graph operations.
#[derive(Error, Debug)]
pub enum GraphError {
    #[error("graph query failed: {0}")]
    Query(#[from] neo4rs::Error),

    #[error("graph backend unavailable: {0}")]
    Backend(String),

    #[error("malformed graph response: {0}")]
    Malformed(String),
}

/// Result type for graph operations.
pub type GraphResult<T> = Result<T, GraphError>;

/// Configuration for connecting to Neo4j.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphConfig {
    pub uri: String,
    pub user: String,
    pub password: String,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            uri: "bolt://localhost:7687".to_string(),
            user: "neo4j".to_string(),
            password: "cmrsync_dev".to_string(),
        }
    }
}

impl GraphConfig {
    /// Read configuration from `GRAPH_URI`, `GRAPH_USER` and
    /// `GRAPH_PASSWORD`, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            uri: std::env::var("GRAPH_URI").unwrap_or(defaults.uri),
            user: std::env::var("GRAPH_USER").unwrap_or(defaults.user),
            password: std::env::var("GRAPH_PASSWORD").unwrap_or(defaults.password),
        }
    }
}

/// Client for graph mutations and queries.
#[derive(Clone)]
pub struct GraphClient {
    graph: Graph,
}

impl GraphClient {
    /// Create a new GraphClient from config.
    ///
    /// Note: neo4rs uses a lazy deadpool — `Graph::connect` only creates the
    /// pool object and does NOT establish a real bolt connection yet. We run
    /// a cheap `RETURN 1` ping immediately so that callers can wrap this in
    /// a timeout and get a fast failure when Neo4j is unreachable instead of
    /// hanging silently.
    pub async fn connect(config: &GraphConfig) -> GraphResult<Self> {
        let neo4j_config = ConfigBuilder::default()
            .uri(&config.uri)
            .user(&config.user)
            .password(&config.password)
            .db("neo4j")
            .max_connections(8)
            .fetch_size(200)
            .build()?;

        let graph = Graph::connect(neo4j_config).await?;

        // Ping to force an actual TCP+bolt handshake so the caller's timeout works.
        graph.run(Query::new("RETURN 1".to_string())).await?;

        Ok(Self { graph })
    }

    /// Create a new GraphClient from the environment.
    pub async fn connect_default() -> GraphResult<Self> {
        Self::connect(&GraphConfig::from_env()).await
    }

    /// Execute a Cypher query that returns no results.
    pub async fn execute(&self, query: Query) -> GraphResult<()> {
        self.graph.run(query).await?;
        Ok(())
    }

    /// Execute a Cypher query and return results as rows.
    pub async fn query(&self, query: Query) -> GraphResult<Vec<neo4rs::Row>> {
        let mut result = self.graph.execute(query).await?;

        let mut rows = Vec::new();
        while let Ok(Some(row)) = result.next().await {
            rows.push(row);
        }
        Ok(rows)
    }

    /// Execute a Cypher query and return a single scalar value.
    pub async fn query_scalar<T: DeserializeOwned>(
        &self,
        query: Query,
        field: &str,
    ) -> GraphResult<Option<T>> {
        let rows = self.query(query).await?;
        if let Some(row) = rows.into_iter().next() {
            let val: T = row
                .get(field)
                .map_err(|e| GraphError::Malformed(format!("missing field '{field}': {e:?}")))?;
            Ok(Some(val))
        } else {
            Ok(None)
        }
    }

    /// Get per-label vertex counts and the edge count for status display.
    pub async fn get_counts(&self) -> GraphResult<GraphCounts> {
        let edge_query = Query::new("MATCH ()-[r]->() RETURN count(r) as count".to_string());
        let edges: i64 = self.query_scalar(edge_query, "count").await?.unwrap_or(0);

        Ok(GraphCounts {
            collections: self.count_label(VertexLabel::Collection).await?,
            campaigns: self.count_label(VertexLabel::Campaign).await?,
            platforms: self.count_label(VertexLabel::Platform).await?,
            related_urls: self.count_label(VertexLabel::RelatedUrl).await?,
            edges: edges as usize,
        })
    }

    async fn count_label(&self, label: VertexLabel) -> GraphResult<usize> {
        let query = Query::new(format!("MATCH (n:{}) RETURN count(n) as count", label.as_str()));
        let count: i64 = self.query_scalar(query, "count").await?.unwrap_or(0);
        Ok(count as usize)
    }
}

/// Vertex and edge counts.
#[derive(Debug, Clone, Default)]
pub struct GraphCounts {
    pub collections: usize,
    pub campaigns: usize,
    pub platforms: usize,
    pub related_urls: usize,
    pub edges: usize,
}
