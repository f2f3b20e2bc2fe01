//! In-memory KV storage backend.
//!
//! Provides a fast, non-persistent key-value store using DashMap for
//! concurrent access. All data is lost when the process exits.

use super::backend::KvBackend;
use super::value::StoredValue;
use crate::error::Result;
use async_trait::async_trait;
use dashmap::DashMap;

/// In-memory key-value storage backend using DashMap.
///
/// Used when `DATABASE_MODE` is not `channel_logs`, and as the fallback
/// when the channel backend cannot be opened.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    data: DashMap<String, StoredValue>,
}

impl MemoryBackend {
    /// Creates a new empty in-memory backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of entries in the store.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[async_trait]
impl KvBackend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, key: &str) -> Result<Option<StoredValue>> {
        Ok(self.data.get(key).map(|entry| entry.value().clone()))
    }

    async fn set(&self, key: &str, value: StoredValue) -> Result<()> {
        self.data.insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        Ok(self.data.remove(key).is_some())
    }

    async fn list(&self, prefix: Option<&str>) -> Result<Vec<String>> {
        Ok(self
            .data
            .iter()
            .map(|entry| entry.key().clone())
            .filter(|key| prefix.is_none_or(|p| key.starts_with(p)))
            .collect())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.data.contains_key(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_set() {
        let backend = MemoryBackend::new();

        backend.set("users", vec![1, 2].into()).await.unwrap();
        let value = backend.get("users").await.unwrap();
        assert_eq!(value, Some(StoredValue::Ids(vec![1, 2])));
    }

    #[tokio::test]
    async fn test_get_nonexistent() {
        let backend = MemoryBackend::new();
        assert_eq!(backend.get("nonexistent").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_delete() {
        let backend = MemoryBackend::new();

        backend.set("approval_off_1", true.into()).await.unwrap();
        assert!(backend.delete("approval_off_1").await.unwrap());
        assert_eq!(backend.get("approval_off_1").await.unwrap(), None);
        assert!(!backend.delete("approval_off_1").await.unwrap());
    }

    #[tokio::test]
    async fn test_list() {
        let backend = MemoryBackend::new();

        backend.set("channel_1", "a".into()).await.unwrap();
        backend.set("channel_2", "b".into()).await.unwrap();
        backend.set("req_channel_1", "c".into()).await.unwrap();

        let mut all = backend.list(None).await.unwrap();
        all.sort();
        assert_eq!(all, vec!["channel_1", "channel_2", "req_channel_1"]);

        let mut channels = backend.list(Some("channel_")).await.unwrap();
        channels.sort();
        assert_eq!(channels, vec!["channel_1", "channel_2"]);
    }

    #[tokio::test]
    async fn test_exists_and_len() {
        let backend = MemoryBackend::new();
        assert!(backend.is_empty());

        backend.set("key", "value".into()).await.unwrap();
        assert!(backend.exists("key").await.unwrap());
        assert!(!backend.exists("nonexistent").await.unwrap());
        assert_eq!(backend.len(), 1);
    }

    #[tokio::test]
    async fn test_overwrite() {
        let backend = MemoryBackend::new();

        backend.set("key", "value1".into()).await.unwrap();
        backend.set("key", "value2".into()).await.unwrap();

        assert_eq!(
            backend.get("key").await.unwrap(),
            Some(StoredValue::from("value2"))
        );
    }
}
