//! Graph schema initialization (constraints and indexes).

use neo4rs::Query;
use tracing::info;

use crate::client::{GraphClient, GraphResult};

/// Cypher statements for schema initialization.
const SCHEMA_STATEMENTS: &[&str] = &[
    // Uniqueness constraints on natural keys
    "CREATE CONSTRAINT collection_concept_id IF NOT EXISTS FOR (c:Collection) REQUIRE c.concept_id IS UNIQUE",
    "CREATE CONSTRAINT campaign_name IF NOT EXISTS FOR (c:Campaign) REQUIRE c.name IS UNIQUE",
    "CREATE CONSTRAINT platform_name IF NOT EXISTS FOR (p:Platform) REQUIRE p.name IS UNIQUE",
    // RelatedUrl is keyed by url + description; index the url half for lookups
    "CREATE INDEX related_url_url IF NOT EXISTS FOR (r:RelatedUrl) ON (r.url)",
];

/// Initialize the graph schema with constraints and indexes.
///
/// Safe to run multiple times - uses IF NOT EXISTS clauses.
pub async fn initialize_schema(client: &GraphClient) -> GraphResult<()> {
    info!("Initializing graph schema...");

    for statement in SCHEMA_STATEMENTS {
        client.execute(Query::new(statement.to_string())).await?;
    }

    info!("Graph schema initialized ({} statements)", SCHEMA_STATEMENTS.len());
    Ok(())
}
