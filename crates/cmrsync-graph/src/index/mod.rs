//! Per-record synchronization into the graph.
//!
//! Indexing a collection is destructive-then-additive: the previous vertex
//! and edge set are torn down first (with reference-counted cleanup of
//! shared entities), then the vertex is recreated from the fresh document
//! and its related entities re-linked. Stale links cannot survive a
//! metadata change.

pub mod campaign;
pub mod platform;
pub mod related_url;

use chrono::Utc;
use futures::future::join_all;
use tracing::{error, info, warn};

use cmrsync_core::collection::CollectionDocument;

use crate::client::{GraphError, GraphResult};
use crate::delete::{delete_collection, DeleteReport};
use crate::store::{GraphStore, PropValue, Props, VertexLabel, VertexRef, CONCEPT_ID};

/// Per-category tally of entity upserts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntityTally {
    pub indexed: usize,
    pub failed: usize,
}

impl EntityTally {
    fn absorb(&mut self, outcome: &Result<(), GraphError>) {
        match outcome {
            Ok(()) => self.indexed += 1,
            Err(_) => self.failed += 1,
        }
    }
}

/// Outcome of indexing one collection document.
#[derive(Debug, Clone)]
pub struct IndexReport {
    pub collection: VertexRef,
    pub cleanup: DeleteReport,
    pub campaigns: EntityTally,
    pub platforms: EntityTally,
    pub related_urls: EntityTally,
}

impl IndexReport {
    /// Entity upserts that failed, across all categories.
    pub fn failures(&self) -> usize {
        self.campaigns.failed + self.platforms.failed + self.related_urls.failed
    }
}

/// Index one collection document into the graph.
///
/// Entity items within a category are dispatched together and failures are
/// isolated per item; the categories themselves, and the
/// delete/upsert/fan-out steps, run strictly in order. A cleanup or
/// vertex-upsert failure aborts the attempt and leaves the prior graph
/// state for this concept id untouched.
pub async fn index_collection<S>(
    store: &S,
    doc: &CollectionDocument,
    cmr_root: &str,
) -> GraphResult<IndexReport>
where
    S: GraphStore + ?Sized,
{
    let concept_id = doc.concept_id();

    let cleanup = delete_collection(store, concept_id).await.map_err(|e| {
        error!(concept_id, error = %e, "aborting index, stale-state cleanup failed");
        e
    })?;

    let collection = store
        .find_or_create(
            VertexLabel::Collection,
            vec![(CONCEPT_ID, PropValue::from(concept_id))],
            collection_props(doc, cmr_root),
        )
        .await
        .map_err(|e| {
            error!(concept_id, error = %e, "failed upserting collection vertex");
            e
        })?;

    let mut report = IndexReport {
        collection: collection.clone(),
        cleanup,
        campaigns: EntityTally::default(),
        platforms: EntityTally::default(),
        related_urls: EntityTally::default(),
    };

    let outcomes = join_all(
        doc.umm
            .projects
            .iter()
            .map(|project| campaign::index_campaign(store, project, &collection, concept_id)),
    )
    .await;
    for outcome in &outcomes {
        report.campaigns.absorb(outcome);
    }

    let outcomes = join_all(
        doc.umm
            .platforms
            .iter()
            .map(|p| platform::index_platform(store, p, &collection, concept_id)),
    )
    .await;
    for outcome in &outcomes {
        report.platforms.absorb(outcome);
    }

    let outcomes = join_all(
        doc.umm
            .related_urls
            .iter()
            .map(|url| related_url::index_related_url(store, url, &collection, concept_id)),
    )
    .await;
    for outcome in &outcomes {
        report.related_urls.absorb(outcome);
    }

    if report.failures() > 0 {
        warn!(
            concept_id,
            failures = report.failures(),
            "collection indexed with entity failures"
        );
    }

    info!(vertex = %report.collection.id, concept_id, "collection indexed");
    Ok(report)
}

fn collection_props(doc: &CollectionDocument, cmr_root: &str) -> Props {
    vec![
        ("title", PropValue::from(doc.umm.entry_title.as_str())),
        ("short_name", PropValue::from(doc.umm.short_name.as_str())),
        ("provider_id", PropValue::from(doc.meta.provider_id.as_str())),
        (
            "doi",
            PropValue::from(doc.doi_description().unwrap_or("Not provided")),
        ),
        ("landing_page", PropValue::from(doc.landing_page(cmr_root))),
        (
            "permitted_groups",
            PropValue::List(doc.meta.permitted_groups.clone()),
        ),
        ("indexed_at", PropValue::from(Utc::now().to_rfc3339())),
    ]
}
