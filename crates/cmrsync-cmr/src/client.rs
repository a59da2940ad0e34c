//! CMR catalog HTTP client.
//!
//! The catalog exposes a scroll-paginated JSON feed; continuation rides on
//! the `CMR-Scroll-Id` header in both directions.

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use cmrsync_core::collection::{CollectionDocument, FeedEntry, FeedResponse, UmmSearchResponse};

/// Header carrying the scroll continuation token.
pub const SCROLL_ID_HEADER: &str = "CMR-Scroll-Id";
const ECHO_TOKEN_HEADER: &str = "Echo-Token";

/// Errors from catalog requests.
#[derive(Error, Debug)]
pub enum CmrError {
    #[error("CMR request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("malformed CMR response: {0}")]
    Malformed(String),
}

/// Result type for catalog operations.
pub type CmrResult<T> = Result<T, CmrError>;

/// Configuration for talking to the catalog.
#[derive(Debug, Clone, Deserialize)]
pub struct CmrConfig {
    pub cmr_root: String,
    pub page_size: usize,
    pub echo_token: Option<String>,
}

impl Default for CmrConfig {
    fn default() -> Self {
        Self {
            cmr_root: "https://cmr.earthdata.nasa.gov".to_string(),
            page_size: 1000,
            echo_token: None,
        }
    }
}

impl CmrConfig {
    /// Read configuration from `CMR_ROOT`, `CMR_PAGE_SIZE` and `ECHO_TOKEN`,
    /// falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            cmr_root: std::env::var("CMR_ROOT").unwrap_or(defaults.cmr_root),
            page_size: std::env::var("CMR_PAGE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.page_size),
            echo_token: std::env::var("ECHO_TOKEN").ok(),
        }
    }
}

/// One page of the collection feed.
#[derive(Debug, Clone)]
pub struct CmrPage {
    pub entries: Vec<FeedEntry>,
    /// Continuation token returned by the catalog, when any.
    pub scroll_id: Option<String>,
}

/// Client for the CMR search endpoints.
#[derive(Clone)]
pub struct CmrClient {
    http: reqwest::Client,
    config: CmrConfig,
}

impl CmrClient {
    pub fn new(config: CmrConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    pub fn config(&self) -> &CmrConfig {
        &self.config
    }

    /// Fetch one page of the collection feed.
    ///
    /// Passing a `scroll_id` continues an existing scroll; the provider
    /// filter narrows the feed to a single provider's collections.
    pub async fn fetch_page(
        &self,
        scroll_id: Option<&str>,
        provider: Option<&str>,
    ) -> CmrResult<CmrPage> {
        let mut url = format!(
            "{}/search/collections.json?page_size={}&scroll=true",
            self.config.cmr_root, self.config.page_size
        );
        if let Some(provider) = provider {
            url.push_str("&provider=");
            url.push_str(provider);
        }

        let mut request = self.http.get(&url);
        if let Some(token) = &self.config.echo_token {
            request = request.header(ECHO_TOKEN_HEADER, token);
        }
        if let Some(scroll_id) = scroll_id {
            request = request.header(SCROLL_ID_HEADER, scroll_id);
        }

        let response = request.send().await?.error_for_status()?;
        let next_scroll = response
            .headers()
            .get(SCROLL_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let body: FeedResponse = response.json().await?;
        debug!(
            entries = body.feed.entry.len(),
            scroll = next_scroll.is_some(),
            "fetched collection page"
        );

        Ok(CmrPage {
            entries: body.feed.entry,
            scroll_id: next_scroll,
        })
    }

    /// Fetch the full UMM document for a single concept id.
    ///
    /// Returns `None` when the catalog no longer has the concept.
    pub async fn fetch_collection(
        &self,
        concept_id: &str,
    ) -> CmrResult<Option<CollectionDocument>> {
        let url = format!(
            "{}/search/collections.umm_json?concept_id={}",
            self.config.cmr_root, concept_id
        );

        let mut request = self.http.get(&url);
        if let Some(token) = &self.config.echo_token {
            request = request.header(ECHO_TOKEN_HEADER, token);
        }

        let response = request.send().await?.error_for_status()?;
        let body: UmmSearchResponse = response.json().await?;
        Ok(body.items.into_iter().next())
    }
}
