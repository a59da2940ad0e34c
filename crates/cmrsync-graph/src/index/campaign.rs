//! Campaign (project) vertex upserts.

use tracing::error;

use cmrsync_core::collection::UmmProject;

use crate::client::GraphResult;
use crate::store::{EdgeLabel, GraphStore, PropValue, Props, VertexLabel, VertexRef};

/// Find or create the campaign vertex for `project` and link the owning
/// collection to it.
///
/// Campaign vertices are shared across collections, so properties are set
/// only when the vertex is first created.
pub async fn index_campaign<S>(
    store: &S,
    project: &UmmProject,
    collection: &VertexRef,
    concept_id: &str,
) -> GraphResult<()>
where
    S: GraphStore + ?Sized,
{
    let key: Props = vec![("name", PropValue::from(project.short_name.as_str()))];
    let mut on_create: Props = Vec::new();
    if let Some(long_name) = &project.long_name {
        on_create.push(("long_name", PropValue::from(long_name.as_str())));
    }

    let result = async {
        let campaign = store
            .find_or_create(VertexLabel::Campaign, key, on_create)
            .await?;
        store.add_edge(collection, &campaign, EdgeLabel::PartOf).await
    }
    .await;

    if let Err(e) = &result {
        error!(concept_id, campaign = %project.short_name, error = %e, "failed indexing campaign");
    }
    result
}
