//! # cmrsync CMR
//!
//! HTTP client for the CMR metadata catalog and the paginated crawl
//! pipeline that fans changed concept ids out to the change queue.

pub mod client;
pub mod crawl;

pub use client::{CmrClient, CmrConfig, CmrError, CmrPage, CmrResult};
pub use crawl::{crawl, CrawlError, CrawlFailure, CrawlOptions, CrawlReport, PageSource, CHUNK_SIZE};
