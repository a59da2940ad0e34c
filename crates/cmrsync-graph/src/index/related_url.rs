//! Related-documentation-link vertex upserts.

use tracing::error;

use cmrsync_core::collection::UmmRelatedUrl;

use crate::client::GraphResult;
use crate::store::{EdgeLabel, GraphStore, PropValue, Props, VertexLabel, VertexRef};

/// Find or create the related-url vertex and link the owning collection.
///
/// The natural key is the url together with its description (many catalog
/// records reuse a url with differing descriptions); a missing description
/// keys as the empty string.
pub async fn index_related_url<S>(
    store: &S,
    related_url: &UmmRelatedUrl,
    collection: &VertexRef,
    concept_id: &str,
) -> GraphResult<()>
where
    S: GraphStore + ?Sized,
{
    let key: Props = vec![
        ("url", PropValue::from(related_url.url.as_str())),
        (
            "description",
            PropValue::from(related_url.description.as_deref().unwrap_or("")),
        ),
    ];
    let mut on_create: Props = Vec::new();
    if let Some(url_type) = &related_url.url_type {
        on_create.push(("url_type", PropValue::from(url_type.as_str())));
    }

    let result = async {
        let vertex = store
            .find_or_create(VertexLabel::RelatedUrl, key, on_create)
            .await?;
        store
            .add_edge(collection, &vertex, EdgeLabel::DocumentedBy)
            .await
    }
    .await;

    if let Err(e) = &result {
        error!(concept_id, url = %related_url.url, error = %e, "failed indexing related url");
    }
    result
}
