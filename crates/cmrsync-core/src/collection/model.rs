//! Serde models for the CMR wire formats.
//!
//! Two shapes come back from the catalog: the lightweight `collections.json`
//! feed used by the crawl (only concept ids matter there), and the full UMM
//! document (`collections.umm_json`) used when indexing a single record.

use serde::{Deserialize, Serialize};

use super::DOI_BASE_URL;

/// Response body of `search/collections.json`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedResponse {
    #[serde(default)]
    pub feed: Feed,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Feed {
    #[serde(default)]
    pub entry: Vec<FeedEntry>,
}

/// One record in the paginated feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedEntry {
    /// Concept id, e.g. `C1200400842-GES_DISC`.
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
}

/// Response body of `search/collections.umm_json`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UmmSearchResponse {
    #[serde(default)]
    pub items: Vec<CollectionDocument>,
}

/// One full collection document: catalog metadata plus the UMM record.
#[derive(Debug, Clone, Deserialize)]
pub struct CollectionDocument {
    pub meta: CollectionMeta,
    pub umm: UmmRecord,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CollectionMeta {
    #[serde(rename = "concept-id")]
    pub concept_id: String,
    #[serde(rename = "provider-id")]
    pub provider_id: String,
    /// Group ids allowed to read this record. Absent means unrestricted.
    #[serde(rename = "permitted-groups", default)]
    pub permitted_groups: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UmmRecord {
    pub entry_title: String,
    pub short_name: String,
    #[serde(rename = "DOI", default)]
    pub doi: Option<UmmDoi>,
    #[serde(default)]
    pub projects: Vec<UmmProject>,
    #[serde(default)]
    pub platforms: Vec<UmmPlatform>,
    #[serde(default)]
    pub related_urls: Vec<UmmRelatedUrl>,
}

/// UMM DOI block: either a DOI string or a missing-reason marker.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UmmDoi {
    #[serde(rename = "DOI")]
    pub doi: Option<String>,
    #[serde(rename = "MissingReason")]
    pub missing_reason: Option<String>,
}

/// A project/campaign the collection belongs to.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UmmProject {
    pub short_name: String,
    #[serde(default)]
    pub long_name: Option<String>,
}

/// A platform the collection's data was acquired by.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UmmPlatform {
    pub short_name: String,
    #[serde(default)]
    pub long_name: Option<String>,
}

/// A documentation link attached to the collection.
#[derive(Debug, Clone, Deserialize)]
pub struct UmmRelatedUrl {
    #[serde(rename = "URL")]
    pub url: String,
    #[serde(rename = "Description", default)]
    pub description: Option<String>,
    #[serde(rename = "Type", default)]
    pub url_type: Option<String>,
}

impl CollectionDocument {
    pub fn concept_id(&self) -> &str {
        &self.meta.concept_id
    }

    /// The DOI description string, when the record carries one.
    pub fn doi_description(&self) -> Option<&str> {
        self.umm.doi.as_ref().and_then(|d| d.doi.as_deref())
    }

    /// Landing page for the collection.
    ///
    /// A DOI of the shape `prefix:suffix` resolves through the DOI resolver
    /// using the suffix; a DOI without a `:` is used whole. Records without
    /// a DOI fall back to the catalog concept-detail page.
    pub fn landing_page(&self, cmr_root: &str) -> String {
        match self.doi_description() {
            Some(doi) => {
                let address = doi.split_once(':').map_or(doi, |(_, suffix)| suffix);
                format!("{DOI_BASE_URL}/{address}")
            }
            None => format!("{}/concepts/{}.html", cmr_root, self.meta.concept_id),
        }
    }
}
