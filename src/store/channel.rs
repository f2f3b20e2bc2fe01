//! Channel-backed KV storage backend ("channel as database").
//!
//! Every mutation is appended as a JSON [`LogRecord`] message to a private
//! storage channel, and mirrored into a process-local cache. Reads are served
//! from the cache only: a bot account cannot enumerate channel history, so a
//! fresh process starts empty no matter what the channel holds. The channel
//! is an audit log, not a queryable database.
//!
//! The platform connection is brought up lazily through a [`Connector`] and
//! guarded by a [`OnceCell`], so concurrent first callers share one attempt.
//! If connecting fails the backend keeps serving cached reads and rejects
//! writes until a later write manages to connect.

use super::backend::KvBackend;
use super::record::LogRecord;
use super::transport::{Connector, Transport};
use super::value::StoredValue;
use crate::error::{Result, StoreError};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

/// Storage backend that appends records to a chat channel.
pub struct ChannelBackend {
    channel_id: i64,
    connector: Arc<dyn Connector>,
    transport: OnceCell<Arc<dyn Transport>>,
    attempted: AtomicBool,
    cache: DashMap<String, StoredValue>,
}

impl ChannelBackend {
    /// Creates a backend writing to `channel_id`. Does not connect.
    pub fn new(channel_id: i64, connector: Arc<dyn Connector>) -> Self {
        Self {
            channel_id,
            connector,
            transport: OnceCell::new(),
            attempted: AtomicBool::new(false),
            cache: DashMap::new(),
        }
    }

    /// The storage channel id.
    pub fn channel_id(&self) -> i64 {
        self.channel_id
    }

    /// Returns true once a connection has been established.
    pub fn is_connected(&self) -> bool {
        self.transport.initialized()
    }

    /// Number of cached keys.
    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }

    /// Connects immediately instead of waiting for the first access.
    ///
    /// # Errors
    ///
    /// Returns the connector's error if the connection cannot be opened.
    pub async fn connect_now(&self) -> Result<()> {
        self.transport().await.map(|_| ())
    }

    /// Forgets every cached value, as a process restart would.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    async fn transport(&self) -> Result<&Arc<dyn Transport>> {
        self.transport
            .get_or_try_init(|| async {
                self.attempted.store(true, Ordering::Release);
                debug!(channel_id = self.channel_id, "Connecting storage channel");
                match self.connector.connect().await {
                    Ok(transport) => {
                        info!(
                            channel_id = self.channel_id,
                            "Storage channel connected; cache starts empty and fills on write"
                        );
                        Ok(transport)
                    }
                    Err(e) => {
                        warn!(
                            channel_id = self.channel_id,
                            error = %e,
                            "Could not connect storage channel; serving cached reads only"
                        );
                        Err(e)
                    }
                }
            })
            .await
    }

    /// Brings the connection up on the first access of any kind. Reads
    /// never retry a failed attempt.
    async fn touch(&self) {
        if !self.attempted.load(Ordering::Acquire) {
            let _ = self.transport().await;
        }
    }

    async fn append(&self, record: &LogRecord) -> Result<()> {
        let text = record.to_message()?;
        let transport = self.transport().await.map_err(|e| match e {
            StoreError::Connect { .. } => StoreError::NotConnected {
                channel_id: self.channel_id,
            },
            other => other,
        })?;
        transport.send_text(self.channel_id, &text).await
    }
}

#[async_trait]
impl KvBackend for ChannelBackend {
    fn name(&self) -> &'static str {
        "channel_logs"
    }

    async fn get(&self, key: &str) -> Result<Option<StoredValue>> {
        self.touch().await;
        Ok(self.cache.get(key).map(|entry| entry.value().clone()))
    }

    async fn set(&self, key: &str, value: StoredValue) -> Result<()> {
        let record = LogRecord::set(key, value);
        self.append(&record).await?;

        debug!(key, "Appended set record");
        if let Some(value) = record.value {
            self.cache.insert(record.key, value);
        }
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        if !self.cache.contains_key(key) {
            self.touch().await;
            return Ok(false);
        }

        self.append(&LogRecord::delete(key)).await?;
        debug!(key, "Appended delete record");
        self.cache.remove(key);
        Ok(true)
    }

    async fn list(&self, prefix: Option<&str>) -> Result<Vec<String>> {
        self.touch().await;
        Ok(self
            .cache
            .iter()
            .map(|entry| entry.key().clone())
            .filter(|key| prefix.is_none_or(|p| key.starts_with(p)))
            .collect())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        self.touch().await;
        Ok(self.cache.contains_key(key))
    }
}
