//! # cmrsync Core
//!
//! Domain models and business logic shared by the CMR graph synchronizer:
//! catalog document models, the change-notification envelope, and the
//! queue-sink seam the crawl pipeline writes through.

pub mod collection;
pub mod error;
pub mod message;

pub use error::SinkError;
pub use message::{ChangeAction, ChangeMessage, ChangeSink};
