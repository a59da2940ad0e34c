//! Record deletion: reference-counted cleanup of linked vertices, then the
//! collection vertex itself.

use tracing::{debug, error, info};

use crate::client::{GraphError, GraphResult};
use crate::store::{EdgeLabel, GraphStore, VertexLabel, CONCEPT_ID};

/// What a collection deletion removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeleteReport {
    pub campaigns_removed: u64,
    pub platforms_removed: u64,
    pub related_urls_removed: u64,
    /// False when the collection vertex never existed.
    pub collection_removed: bool,
}

/// Delete the linked vertices of one edge category that only this
/// collection still references.
///
/// Targets shared with another collection (in-degree over the edge label
/// greater than one) are left in place. Returns the number of vertices
/// removed; zero means there was nothing to clean.
pub async fn delete_linked_vertices<S>(
    store: &S,
    concept_id: &str,
    edge: EdgeLabel,
) -> GraphResult<u64>
where
    S: GraphStore + ?Sized,
{
    match store
        .delete_linked_exclusive(VertexLabel::Collection, CONCEPT_ID, concept_id, edge, edge.target())
        .await
    {
        Ok(deleted) => {
            debug!(concept_id, edge = %edge, deleted, "cleaned exclusively linked vertices");
            Ok(deleted)
        }
        Err(e) => {
            error!(concept_id, edge = %edge, error = %e, "failed deleting linked vertices");
            Err(e)
        }
    }
}

/// Remove a collection from the graph together with every linked vertex it
/// exclusively references.
///
/// Categories are cleaned in a fixed order and the first failure aborts the
/// remainder, including the collection-vertex delete: a partially cleaned
/// record must keep its vertex so the failure stays visible.
pub async fn delete_collection<S>(store: &S, concept_id: &str) -> GraphResult<DeleteReport>
where
    S: GraphStore + ?Sized,
{
    let campaigns_removed = delete_linked_vertices(store, concept_id, EdgeLabel::PartOf).await?;
    let platforms_removed = delete_linked_vertices(store, concept_id, EdgeLabel::AcquiredBy).await?;
    let related_urls_removed =
        delete_linked_vertices(store, concept_id, EdgeLabel::DocumentedBy).await?;

    let removed = store
        .delete_vertex(VertexLabel::Collection, CONCEPT_ID, concept_id)
        .await
        .map_err(|e: GraphError| {
            error!(concept_id, error = %e, "failed deleting collection vertex");
            e
        })?;

    let report = DeleteReport {
        campaigns_removed,
        platforms_removed,
        related_urls_removed,
        collection_removed: removed > 0,
    };

    info!(
        concept_id,
        campaigns = report.campaigns_removed,
        platforms = report.platforms_removed,
        related_urls = report.related_urls_removed,
        collection_removed = report.collection_removed,
        "collection removed from graph"
    );

    Ok(report)
}
