//! Backend trait for the KV store.
//!
//! Defines the interface that all storage backends implement, enabling
//! pluggable storage (in-memory, storage channel).

use super::value::StoredValue;
use crate::error::Result;
use async_trait::async_trait;

/// Backend trait for key-value storage.
///
/// All backends must be thread-safe (`Send + Sync`) for use with tokio.
/// Operations are not atomic across keys; the last write to a key wins.
#[async_trait]
pub trait KvBackend: Send + Sync + 'static {
    /// Short backend name for logs and diagnostics.
    fn name(&self) -> &'static str;

    /// Retrieves a value by key.
    ///
    /// Returns `Ok(None)` if the key doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage operation fails.
    async fn get(&self, key: &str) -> Result<Option<StoredValue>>;

    /// Stores a value, overwriting any existing value for the key.
    ///
    /// # Errors
    ///
    /// Returns an error if the value could not be persisted. The previously
    /// stored value must remain readable in that case.
    async fn set(&self, key: &str, value: StoredValue) -> Result<()>;

    /// Deletes a key.
    ///
    /// Returns `Ok(true)` if the key existed and was removed,
    /// `Ok(false)` if it didn't exist. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage operation fails.
    async fn delete(&self, key: &str) -> Result<bool>;

    /// Lists all keys matching an optional prefix.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage operation fails.
    async fn list(&self, prefix: Option<&str>) -> Result<Vec<String>>;

    /// Checks if a key exists.
    ///
    /// Default implementation uses `get()`, but backends may override
    /// for efficiency.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage operation fails.
    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.get(key).await?.is_some())
    }
}
