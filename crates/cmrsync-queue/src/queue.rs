//! The change queue itself: batch producer and blocking consumer.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use cmrsync_core::{ChangeMessage, ChangeSink, SinkError};

use crate::client::{init_pool, QueueResult, RedisPool};

/// Configuration for the change queue.
#[derive(Debug, Clone, Deserialize)]
pub struct QueueConfig {
    pub url: String,
    /// Redis list key the change envelopes live under.
    pub key: String,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".to_string(),
            key: "cmrsync:changes".to_string(),
        }
    }
}

impl QueueConfig {
    /// Read configuration from `REDIS_URL` and `CHANGE_QUEUE_KEY`,
    /// falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            url: std::env::var("REDIS_URL").unwrap_or(defaults.url),
            key: std::env::var("CHANGE_QUEUE_KEY").unwrap_or(defaults.key),
        }
    }
}

/// Redis-backed change queue.
#[derive(Clone)]
pub struct ChangeQueue {
    pool: RedisPool,
    key: String,
}

impl ChangeQueue {
    pub async fn connect(config: &QueueConfig) -> QueueResult<Self> {
        let pool = init_pool(&config.url).await?;
        Ok(Self {
            pool,
            key: config.key.clone(),
        })
    }

    /// Push a batch of change messages in a single round trip.
    ///
    /// One `RPUSH` with one value per message keeps batch order intact.
    pub async fn push_batch(&self, messages: &[ChangeMessage]) -> QueueResult<()> {
        if messages.is_empty() {
            return Ok(());
        }

        let mut cmd = redis::cmd("RPUSH");
        cmd.arg(&self.key);
        for message in messages {
            cmd.arg(serde_json::to_string(message)?);
        }

        let mut conn = self.pool.clone();
        let queued: i64 = cmd.query_async(&mut conn).await?;
        debug!(batch = messages.len(), queued, "pushed change batch");
        Ok(())
    }

    /// Block up to `timeout_secs` for the next message.
    ///
    /// Returns `None` when the timeout elapses with an empty queue.
    pub async fn pop(&self, timeout_secs: f64) -> QueueResult<Option<ChangeMessage>> {
        let mut conn = self.pool.clone();
        let reply: Option<(String, String)> = redis::cmd("BLPOP")
            .arg(&self.key)
            .arg(timeout_secs)
            .query_async(&mut conn)
            .await?;

        match reply {
            Some((_, body)) => Ok(Some(serde_json::from_str(&body)?)),
            None => Ok(None),
        }
    }

    /// Number of messages currently queued.
    pub async fn len(&self) -> QueueResult<usize> {
        let mut conn = self.pool.clone();
        let len: usize = redis::cmd("LLEN")
            .arg(&self.key)
            .query_async(&mut conn)
            .await?;
        Ok(len)
    }
}

#[async_trait]
impl ChangeSink for ChangeQueue {
    async fn send_batch(&self, messages: &[ChangeMessage]) -> Result<(), SinkError> {
        self.push_batch(messages)
            .await
            .map_err(|e| SinkError::Send(e.to_string()))
    }
}
