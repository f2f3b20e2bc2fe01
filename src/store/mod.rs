//! Key-value store with pluggable backends.
//!
//! Backends:
//!
//! - **MemoryBackend**: process-local, non-persistent storage
//! - **ChannelBackend**: appends every mutation as a JSON message to a
//!   private chat channel and serves reads from a local cache
//!
//! The backend is chosen once at startup by [`select_store`].
//!
//! # Custom Backends
//!
//! Implement the `KvBackend` trait to use custom storage:
//!
//! ```ignore
//! use linkshare::store::{KvBackend, KvStore};
//!
//! struct RedisBackend { /* ... */ }
//! impl KvBackend for RedisBackend { /* ... */ }
//!
//! let store = KvStore::custom(RedisBackend::new());
//! ```

mod backend;
mod channel;
mod memory;
mod record;
mod select;
#[allow(clippy::module_inception)]
mod store;
mod transport;
mod value;

#[cfg(test)]
pub(crate) mod fakes;

// Re-export the public API
pub use backend::KvBackend;
pub use channel::ChannelBackend;
pub use memory::MemoryBackend;
pub use record::{LogAction, LogRecord};
pub use select::{BackendKind, Selection, open_backend, select_store};
pub use store::KvStore;
pub use transport::{Connector, Transport};
pub use value::{ChannelRecord, ChannelStatus, InviteRecord, RequestChannelRecord, StoredValue};
