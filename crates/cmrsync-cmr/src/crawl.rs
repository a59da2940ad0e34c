//! Paginated crawl & fan-out pipeline.
//!
//! Walks the catalog's scroll feed page by page and fans each page's
//! concept ids out to the change queue in fixed-size batches. The walk is
//! an explicit loop, so arbitrarily deep scrolls cost no stack.

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

use cmrsync_core::{ChangeMessage, ChangeSink, SinkError};

use crate::client::{CmrClient, CmrError, CmrPage};

/// Records per queue batch.
pub const CHUNK_SIZE: usize = 10;

/// Source of feed pages. Implemented by [`CmrClient`]; tests substitute
/// scripted fakes.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch_page(
        &self,
        scroll_id: Option<&str>,
        provider: Option<&str>,
    ) -> Result<CmrPage, CmrError>;
}

#[async_trait]
impl PageSource for CmrClient {
    async fn fetch_page(
        &self,
        scroll_id: Option<&str>,
        provider: Option<&str>,
    ) -> Result<CmrPage, CmrError> {
        CmrClient::fetch_page(self, scroll_id, provider).await
    }
}

/// Crawl tuning knobs.
#[derive(Debug, Clone, Default)]
pub struct CrawlOptions {
    /// Restrict the crawl to one provider's collections.
    pub provider: Option<String>,
    /// Resume an earlier scroll instead of starting from the first page.
    pub scroll_id: Option<String>,
}

/// Outcome of a completed crawl.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlReport {
    /// Pages fetched.
    pub pages: u32,
    /// Concept ids fanned out.
    pub records: usize,
}

/// A crawl aborted by a page fetch or batch send failure.
///
/// `scroll_id` is the token that was active when the failure occurred —
/// the feed position to resume from.
#[derive(Error, Debug)]
#[error("crawl aborted on page {page}: {source}")]
pub struct CrawlError {
    pub page: u32,
    pub scroll_id: Option<String>,
    #[source]
    pub source: CrawlFailure,
}

/// What went wrong inside a crawl step.
#[derive(Error, Debug)]
pub enum CrawlFailure {
    #[error(transparent)]
    Fetch(#[from] CmrError),

    #[error(transparent)]
    Send(#[from] SinkError),
}

/// Walk the feed, fanning each page out to the sink.
///
/// Continues while the feed returns a continuation token *and* the page was
/// full; a short page ends the feed even when a token accompanies it. Any
/// fetch or send error aborts the crawl without advancing the token.
pub async fn crawl<S, Q>(
    source: &S,
    sink: &Q,
    page_size: usize,
    options: &CrawlOptions,
) -> Result<CrawlReport, CrawlError>
where
    S: PageSource + ?Sized,
    Q: ChangeSink + ?Sized,
{
    let mut scroll_id = options.scroll_id.clone();
    let mut report = CrawlReport::default();

    loop {
        info!(page = report.pages, "fetching collection page from CMR");

        let page = match source
            .fetch_page(scroll_id.as_deref(), options.provider.as_deref())
            .await
        {
            Ok(page) => page,
            Err(e) => {
                return Err(CrawlError {
                    page: report.pages,
                    scroll_id,
                    source: e.into(),
                })
            }
        };

        for chunk in page.entries.chunks(CHUNK_SIZE) {
            let batch: Vec<ChangeMessage> = chunk
                .iter()
                .map(|entry| ChangeMessage::concept_update(entry.id.as_str()))
                .collect();
            if let Err(e) = sink.send_batch(&batch).await {
                return Err(CrawlError {
                    page: report.pages,
                    scroll_id,
                    source: e.into(),
                });
            }
        }

        report.pages += 1;
        report.records += page.entries.len();

        // A short page means end-of-feed even when a token came back.
        let full_page = page.entries.len() == page_size;
        match page.scroll_id {
            Some(next) if full_page => scroll_id = Some(next),
            _ => break,
        }
    }

    info!(
        pages = report.pages,
        records = report.records,
        "crawl complete"
    );
    Ok(report)
}
