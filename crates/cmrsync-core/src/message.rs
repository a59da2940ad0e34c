//! Change-notification envelope and the queue-sink seam.
//!
//! The envelope is the sole contract between the crawl pipeline and the
//! per-record worker: one JSON object per changed concept id.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::SinkError;

/// What happened to a concept upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChangeAction {
    /// The concept was created or its metadata changed.
    ConceptUpdate,
    /// The concept was removed from the catalog.
    ConceptDelete,
}

/// One change notification, serialized as
/// `{"action": "concept-update", "concept-id": "C123-PROV"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeMessage {
    pub action: ChangeAction,
    #[serde(rename = "concept-id")]
    pub concept_id: String,
}

impl ChangeMessage {
    pub fn concept_update(concept_id: impl Into<String>) -> Self {
        Self {
            action: ChangeAction::ConceptUpdate,
            concept_id: concept_id.into(),
        }
    }

    pub fn concept_delete(concept_id: impl Into<String>) -> Self {
        Self {
            action: ChangeAction::ConceptDelete,
            concept_id: concept_id.into(),
        }
    }
}

/// Batch-send sink for change notifications.
///
/// One call submits one batch; implementations must perform the send as a
/// single round trip and preserve message order within the batch.
#[async_trait]
pub trait ChangeSink: Send + Sync {
    async fn send_batch(&self, messages: &[ChangeMessage]) -> Result<(), SinkError>;
}
