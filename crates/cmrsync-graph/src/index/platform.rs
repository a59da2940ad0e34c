//! Platform vertex upserts.

use tracing::error;

use cmrsync_core::collection::UmmPlatform;

use crate::client::GraphResult;
use crate::store::{EdgeLabel, GraphStore, PropValue, Props, VertexLabel, VertexRef};

/// Find or create the platform vertex and link the owning collection to it.
///
/// Platforms are keyed by short name and shared across collections;
/// properties are set only at creation.
pub async fn index_platform<S>(
    store: &S,
    platform: &UmmPlatform,
    collection: &VertexRef,
    concept_id: &str,
) -> GraphResult<()>
where
    S: GraphStore + ?Sized,
{
    let key: Props = vec![("name", PropValue::from(platform.short_name.as_str()))];
    let mut on_create: Props = Vec::new();
    if let Some(long_name) = &platform.long_name {
        on_create.push(("long_name", PropValue::from(long_name.as_str())));
    }

    let result = async {
        let vertex = store
            .find_or_create(VertexLabel::Platform, key, on_create)
            .await?;
        store.add_edge(collection, &vertex, EdgeLabel::AcquiredBy).await
    }
    .await;

    if let Err(e) = &result {
        error!(concept_id, platform = %platform.short_name, error = %e, "failed indexing platform");
    }
    result
}
