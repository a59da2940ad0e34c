//! Error types for the core seams.

use thiserror::Error;

/// Errors surfaced by a [`crate::ChangeSink`] implementation.
///
/// Concrete sinks (Redis, in-memory fakes) map their transport errors into
/// these variants so the crawl pipeline stays independent of the backend.
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("batch send failed: {0}")]
    Send(String),

    #[error("message encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}
