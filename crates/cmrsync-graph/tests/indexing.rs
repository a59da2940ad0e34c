//! Indexing and deletion engine tests against an in-memory graph store.
//!
//! The store keeps real vertex/edge state so reference counting, cleanup
//! short-circuiting, and destructive re-indexing are exercised end to end
//! without a running database.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use cmrsync_core::collection::{
    CollectionDocument, CollectionMeta, UmmDoi, UmmPlatform, UmmProject, UmmRecord, UmmRelatedUrl,
};
use cmrsync_graph::store::CONCEPT_ID;
use cmrsync_graph::{
    delete_collection, index_collection, EdgeLabel, EntityTally, GraphError, GraphResult,
    GraphStore, PropValue, Props, VertexLabel, VertexRef,
};

const CMR_ROOT: &str = "https://cmr.example.gov";

struct Vertex {
    id: String,
    label: VertexLabel,
    props: HashMap<&'static str, PropValue>,
}

#[derive(Default)]
struct State {
    vertices: Vec<Vertex>,
    edges: Vec<(String, String, EdgeLabel)>,
    next_id: u64,
    calls: Vec<String>,
}

/// In-memory [`GraphStore`] with scriptable failures.
#[derive(Default)]
struct MemoryGraph {
    state: Mutex<State>,
    fail_cleanup_on: Mutex<Option<EdgeLabel>>,
    fail_create_key: Mutex<Option<(VertexLabel, String)>>,
}

fn matches_key(vertex: &Vertex, label: VertexLabel, key_prop: &str, key: &str) -> bool {
    vertex.label == label
        && vertex.props.get(key_prop) == Some(&PropValue::Text(key.to_string()))
}

impl MemoryGraph {
    fn fail_cleanup(&self, edge: EdgeLabel) {
        *self.fail_cleanup_on.lock().unwrap() = Some(edge);
    }

    fn fail_create(&self, label: VertexLabel, key: &str) {
        *self.fail_create_key.lock().unwrap() = Some((label, key.to_string()));
    }

    fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    fn count(&self, label: VertexLabel) -> usize {
        self.state
            .lock()
            .unwrap()
            .vertices
            .iter()
            .filter(|v| v.label == label)
            .count()
    }

    fn find_id(&self, label: VertexLabel, key_prop: &str, key: &str) -> Option<String> {
        self.state
            .lock()
            .unwrap()
            .vertices
            .iter()
            .find(|v| matches_key(v, label, key_prop, key))
            .map(|v| v.id.clone())
    }

    fn prop_text(
        &self,
        label: VertexLabel,
        key_prop: &str,
        key: &str,
        prop: &str,
    ) -> Option<String> {
        self.state
            .lock()
            .unwrap()
            .vertices
            .iter()
            .find(|v| matches_key(v, label, key_prop, key))
            .and_then(|v| match v.props.get(prop) {
                Some(PropValue::Text(s)) => Some(s.clone()),
                _ => None,
            })
    }

    fn edge_count(&self) -> usize {
        self.state.lock().unwrap().edges.len()
    }
}

#[async_trait]
impl GraphStore for MemoryGraph {
    async fn find_vertex(
        &self,
        label: VertexLabel,
        key_prop: &str,
        key: &str,
    ) -> GraphResult<Option<VertexRef>> {
        Ok(self.find_id(label, key_prop, key).map(|id| VertexRef { id }))
    }

    async fn find_or_create(
        &self,
        label: VertexLabel,
        key_props: Props,
        on_create: Props,
    ) -> GraphResult<VertexRef> {
        let mut state = self.state.lock().unwrap();

        if let Some(existing) = state.vertices.iter().find(|v| {
            v.label == label
                && key_props
                    .iter()
                    .all(|(name, value)| v.props.get(name) == Some(value))
        }) {
            return Ok(VertexRef {
                id: existing.id.clone(),
            });
        }

        if let Some((fail_label, fail_key)) = self.fail_create_key.lock().unwrap().as_ref() {
            let key_matches = key_props
                .iter()
                .any(|(_, value)| *value == PropValue::Text(fail_key.clone()));
            if *fail_label == label && key_matches {
                return Err(GraphError::Backend("injected create failure".to_string()));
            }
        }

        let id = format!("v{}", state.next_id);
        state.next_id += 1;

        let mut props = HashMap::new();
        for (name, value) in key_props.into_iter().chain(on_create.into_iter()) {
            props.insert(name, value);
        }
        state.vertices.push(Vertex {
            id: id.clone(),
            label,
            props,
        });

        Ok(VertexRef { id })
    }

    async fn add_edge(&self, from: &VertexRef, to: &VertexRef, edge: EdgeLabel) -> GraphResult<()> {
        self.state
            .lock()
            .unwrap()
            .edges
            .push((from.id.clone(), to.id.clone(), edge));
        Ok(())
    }

    async fn delete_vertex(
        &self,
        label: VertexLabel,
        key_prop: &str,
        key: &str,
    ) -> GraphResult<u64> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("delete_vertex:{label}"));

        let doomed: Vec<String> = state
            .vertices
            .iter()
            .filter(|v| matches_key(v, label, key_prop, key))
            .map(|v| v.id.clone())
            .collect();

        state.vertices.retain(|v| !doomed.contains(&v.id));
        state
            .edges
            .retain(|(from, to, _)| !doomed.contains(from) && !doomed.contains(to));

        Ok(doomed.len() as u64)
    }

    async fn delete_linked_exclusive(
        &self,
        start_label: VertexLabel,
        key_prop: &str,
        key: &str,
        edge: EdgeLabel,
        target_label: VertexLabel,
    ) -> GraphResult<u64> {
        {
            let mut state = self.state.lock().unwrap();
            state.calls.push(format!("cleanup:{edge}"));
        }

        if *self.fail_cleanup_on.lock().unwrap() == Some(edge) {
            return Err(GraphError::Backend("injected cleanup failure".to_string()));
        }

        let mut state = self.state.lock().unwrap();

        let Some(start_id) = state
            .vertices
            .iter()
            .find(|v| matches_key(v, start_label, key_prop, key))
            .map(|v| v.id.clone())
        else {
            return Ok(0);
        };

        let candidates: HashSet<String> = state
            .edges
            .iter()
            .filter(|(from, _, label)| *from == start_id && *label == edge)
            .map(|(_, to, _)| to.clone())
            .collect();

        let doomed: Vec<String> = candidates
            .into_iter()
            .filter(|candidate| {
                let in_degree = state
                    .edges
                    .iter()
                    .filter(|(_, to, label)| to == candidate && *label == edge)
                    .count();
                let labeled = state
                    .vertices
                    .iter()
                    .any(|v| v.id == *candidate && v.label == target_label);
                labeled && in_degree <= 1
            })
            .collect();

        state.vertices.retain(|v| !doomed.contains(&v.id));
        state
            .edges
            .retain(|(from, to, _)| !doomed.contains(from) && !doomed.contains(to));

        Ok(doomed.len() as u64)
    }
}

fn doc(
    concept_id: &str,
    title: &str,
    projects: &[&str],
    platforms: &[&str],
    urls: &[(&str, &str)],
) -> CollectionDocument {
    CollectionDocument {
        meta: CollectionMeta {
            concept_id: concept_id.to_string(),
            provider_id: "TESTPROV".to_string(),
            permitted_groups: vec!["AG1-CMR".to_string()],
        },
        umm: UmmRecord {
            entry_title: title.to_string(),
            short_name: "TEST_SHORT".to_string(),
            doi: Some(UmmDoi {
                doi: Some("10.5067:TEST/DATA1".to_string()),
                missing_reason: None,
            }),
            projects: projects
                .iter()
                .map(|name| UmmProject {
                    short_name: (*name).to_string(),
                    long_name: None,
                })
                .collect(),
            platforms: platforms
                .iter()
                .map(|name| UmmPlatform {
                    short_name: (*name).to_string(),
                    long_name: None,
                })
                .collect(),
            related_urls: urls
                .iter()
                .map(|(url, description)| UmmRelatedUrl {
                    url: (*url).to_string(),
                    description: Some((*description).to_string()),
                    url_type: None,
                })
                .collect(),
        },
    }
}

#[tokio::test]
async fn indexing_materializes_collection_and_entities() {
    let store = MemoryGraph::default();
    let document = doc(
        "C123-CMR",
        "A test collection",
        &["J1"],
        &["P1"],
        &[("https://example.gov/doc", "User guide")],
    );

    let report = index_collection(&store, &document, CMR_ROOT).await.unwrap();

    assert_eq!(report.campaigns, EntityTally { indexed: 1, failed: 0 });
    assert_eq!(report.platforms, EntityTally { indexed: 1, failed: 0 });
    assert_eq!(report.related_urls, EntityTally { indexed: 1, failed: 0 });
    assert!(!report.cleanup.collection_removed);

    assert_eq!(store.count(VertexLabel::Collection), 1);
    assert_eq!(store.count(VertexLabel::Campaign), 1);
    assert_eq!(store.count(VertexLabel::Platform), 1);
    assert_eq!(store.count(VertexLabel::RelatedUrl), 1);
    assert_eq!(store.edge_count(), 3);

    assert_eq!(
        store
            .prop_text(VertexLabel::Collection, CONCEPT_ID, "C123-CMR", "landing_page")
            .as_deref(),
        Some("https://dx.doi.org/TEST/DATA1")
    );
    assert_eq!(
        store
            .prop_text(VertexLabel::Collection, CONCEPT_ID, "C123-CMR", "provider_id")
            .as_deref(),
        Some("TESTPROV")
    );
}

#[tokio::test]
async fn reindexing_unchanged_document_is_idempotent() {
    let store = MemoryGraph::default();
    let document = doc(
        "C123-CMR",
        "A test collection",
        &["J1"],
        &["P1"],
        &[("https://example.gov/doc", "User guide")],
    );

    index_collection(&store, &document, CMR_ROOT).await.unwrap();
    let report = index_collection(&store, &document, CMR_ROOT).await.unwrap();

    assert!(report.cleanup.collection_removed);

    assert_eq!(store.count(VertexLabel::Collection), 1);
    assert_eq!(store.count(VertexLabel::Campaign), 1);
    assert_eq!(store.count(VertexLabel::Platform), 1);
    assert_eq!(store.count(VertexLabel::RelatedUrl), 1);
    assert_eq!(store.edge_count(), 3);
}

#[tokio::test]
async fn reindex_drops_exclusive_entities_and_keeps_shared() {
    let store = MemoryGraph::default();

    // C123 references platform P1 (shared with C999) and campaign J1
    // (exclusive to C123).
    let v1 = doc("C123-CMR", "Original title", &["J1"], &["P1"], &[]);
    index_collection(&store, &v1, CMR_ROOT).await.unwrap();
    let other = doc("C999-CMR", "Other collection", &[], &["P1"], &[]);
    index_collection(&store, &other, CMR_ROOT).await.unwrap();

    assert_eq!(store.count(VertexLabel::Platform), 1);

    // The updated document no longer mentions J1.
    let v2 = doc("C123-CMR", "Updated title", &[], &["P1"], &[]);
    let report = index_collection(&store, &v2, CMR_ROOT).await.unwrap();

    assert_eq!(report.cleanup.campaigns_removed, 1);
    assert_eq!(report.cleanup.platforms_removed, 0);
    assert!(report.cleanup.collection_removed);

    assert_eq!(store.count(VertexLabel::Campaign), 0);
    assert_eq!(store.count(VertexLabel::Platform), 1);
    assert_eq!(
        store
            .prop_text(VertexLabel::Collection, CONCEPT_ID, "C123-CMR", "title")
            .as_deref(),
        Some("Updated title")
    );
    assert!(store
        .find_id(VertexLabel::Collection, CONCEPT_ID, "C999-CMR")
        .is_some());
}

#[tokio::test]
async fn deleting_a_collection_preserves_shared_entities() {
    let store = MemoryGraph::default();
    index_collection(&store, &doc("C123-CMR", "One", &["J1"], &["P1"], &[]), CMR_ROOT)
        .await
        .unwrap();
    index_collection(&store, &doc("C999-CMR", "Two", &[], &["P1"], &[]), CMR_ROOT)
        .await
        .unwrap();

    let report = delete_collection(&store, "C123-CMR").await.unwrap();

    assert_eq!(report.campaigns_removed, 1);
    assert_eq!(report.platforms_removed, 0);
    assert!(report.collection_removed);

    assert!(store
        .find_id(VertexLabel::Collection, CONCEPT_ID, "C123-CMR")
        .is_none());
    assert_eq!(store.count(VertexLabel::Campaign), 0);
    assert_eq!(store.count(VertexLabel::Platform), 1);
    assert!(store
        .find_id(VertexLabel::Collection, CONCEPT_ID, "C999-CMR")
        .is_some());
}

#[tokio::test]
async fn deleting_a_missing_collection_is_a_no_op() {
    let store = MemoryGraph::default();

    let report = delete_collection(&store, "C404-CMR").await.unwrap();

    assert_eq!(report.campaigns_removed, 0);
    assert_eq!(report.platforms_removed, 0);
    assert_eq!(report.related_urls_removed, 0);
    assert!(!report.collection_removed);
}

#[tokio::test]
async fn cleanup_failure_short_circuits_deletion() {
    let store = MemoryGraph::default();
    index_collection(
        &store,
        &doc("C123-CMR", "T", &["J1"], &["P1"], &[("https://example.gov/doc", "d")]),
        CMR_ROOT,
    )
    .await
    .unwrap();

    store.fail_cleanup(EdgeLabel::AcquiredBy);
    store.clear_calls();

    let err = delete_collection(&store, "C123-CMR").await.unwrap_err();
    assert!(matches!(err, GraphError::Backend(_)));

    // The failed category stops the run: related urls are never cleaned and
    // the collection vertex is never deleted.
    assert_eq!(store.calls(), vec!["cleanup:PART_OF", "cleanup:ACQUIRED_BY"]);
    assert!(store
        .find_id(VertexLabel::Collection, CONCEPT_ID, "C123-CMR")
        .is_some());
}

#[tokio::test]
async fn cleanup_failure_aborts_reindex_leaving_prior_state() {
    let store = MemoryGraph::default();
    let v1 = doc("C123-CMR", "Original title", &["J1"], &[], &[]);
    index_collection(&store, &v1, CMR_ROOT).await.unwrap();

    store.fail_cleanup(EdgeLabel::PartOf);

    let v2 = doc("C123-CMR", "Updated title", &[], &[], &[]);
    let err = index_collection(&store, &v2, CMR_ROOT).await.unwrap_err();
    assert!(matches!(err, GraphError::Backend(_)));

    assert_eq!(
        store
            .prop_text(VertexLabel::Collection, CONCEPT_ID, "C123-CMR", "title")
            .as_deref(),
        Some("Original title")
    );
    assert_eq!(store.count(VertexLabel::Campaign), 1);
}

#[tokio::test]
async fn entity_failure_leaves_siblings_indexed() {
    let store = MemoryGraph::default();
    store.fail_create(VertexLabel::Campaign, "BAD");

    let document = doc("C123-CMR", "T", &["GOOD", "BAD"], &["P1"], &[]);
    let report = index_collection(&store, &document, CMR_ROOT).await.unwrap();

    assert_eq!(report.campaigns, EntityTally { indexed: 1, failed: 1 });
    assert_eq!(report.platforms, EntityTally { indexed: 1, failed: 0 });
    assert_eq!(report.failures(), 1);

    assert!(store.find_id(VertexLabel::Campaign, "name", "GOOD").is_some());
    assert!(store.find_id(VertexLabel::Campaign, "name", "BAD").is_none());
    assert!(store
        .find_id(VertexLabel::Collection, CONCEPT_ID, "C123-CMR")
        .is_some());
}
