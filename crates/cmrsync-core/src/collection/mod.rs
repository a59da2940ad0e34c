//! CMR collection documents.

pub mod model;

pub use model::{
    CollectionDocument, CollectionMeta, FeedEntry, FeedResponse, UmmDoi, UmmPlatform,
    UmmProject, UmmRecord, UmmRelatedUrl, UmmSearchResponse,
};

/// Base URL of the DOI resolver used for collection landing pages.
pub const DOI_BASE_URL: &str = "https://dx.doi.org";
