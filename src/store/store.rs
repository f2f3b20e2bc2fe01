//! High-level `KvStore` wrapper over backend implementations.
//!
//! The facade turns backend errors into logged warnings and plain defaults,
//! so callers never handle a storage failure as an error value.

use super::backend::KvBackend;
use super::memory::MemoryBackend;
use super::value::StoredValue;
use std::sync::Arc;
use tracing::warn;

/// High-level key-value store interface.
///
/// `KvStore` is `Clone` and can be shared across tasks. No operation is
/// atomic across keys and there is no locking: the last write wins.
///
/// # Example
///
/// ```ignore
/// use linkshare::store::KvStore;
///
/// let store = KvStore::memory();
/// assert!(store.set("users", vec![42].into()).await);
/// assert!(store.exists("users").await);
/// ```
#[derive(Clone)]
pub struct KvStore {
    backend: Arc<dyn KvBackend>,
}

impl KvStore {
    /// Creates a new `KvStore` backed by an in-memory store.
    pub fn memory() -> Self {
        Self::custom(MemoryBackend::new())
    }

    /// Creates a new `KvStore` with a custom backend.
    pub fn custom<B: KvBackend>(backend: B) -> Self {
        Self {
            backend: Arc::new(backend),
        }
    }

    /// Creates a new `KvStore` over a shared backend.
    pub fn from_arc(backend: Arc<dyn KvBackend>) -> Self {
        Self { backend }
    }

    /// Name of the active backend.
    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Retrieves a value by key, `None` if missing or unreadable.
    pub async fn get(&self, key: &str) -> Option<StoredValue> {
        match self.backend.get(key).await {
            Ok(value) => value,
            Err(e) => {
                warn!(key, backend = self.backend.name(), error = %e, "KV get failed");
                None
            }
        }
    }

    /// Retrieves a value by key, falling back to `default`.
    pub async fn get_or(&self, key: &str, default: StoredValue) -> StoredValue {
        self.get(key).await.unwrap_or(default)
    }

    /// Stores a value. Returns `false` if the backend rejected the write.
    pub async fn set(&self, key: &str, value: StoredValue) -> bool {
        match self.backend.set(key, value).await {
            Ok(()) => true,
            Err(e) => {
                warn!(key, backend = self.backend.name(), error = %e, "KV set failed");
                false
            }
        }
    }

    /// Deletes a key. Deleting a missing key succeeds.
    pub async fn delete(&self, key: &str) -> bool {
        match self.backend.delete(key).await {
            Ok(_) => true,
            Err(e) => {
                warn!(key, backend = self.backend.name(), error = %e, "KV delete failed");
                false
            }
        }
    }

    /// Checks if a key exists.
    pub async fn exists(&self, key: &str) -> bool {
        match self.backend.exists(key).await {
            Ok(exists) => exists,
            Err(e) => {
                warn!(key, backend = self.backend.name(), error = %e, "KV exists failed");
                false
            }
        }
    }

    /// Lists all keys matching an optional prefix.
    pub async fn list_keys(&self, prefix: Option<&str>) -> Vec<String> {
        match self.backend.list(prefix).await {
            Ok(keys) => keys,
            Err(e) => {
                warn!(backend = self.backend.name(), error = %e, "KV list failed");
                Vec::new()
            }
        }
    }
}
