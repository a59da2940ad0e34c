//! # cmrsync Queue
//!
//! Redis-backed change queue: the crawl pipeline pushes change
//! notifications in batches, the worker pops them one at a time.

pub mod client;
pub mod queue;

pub use client::{init_pool, QueueError, QueueResult, RedisPool};
pub use queue::{ChangeQueue, QueueConfig};
