//! Chat-platform seam used by the channel backend.
//!
//! The channel backend never talks to Telegram directly. It asks a
//! [`Connector`] for a [`Transport`] on first use and sends every record
//! through it. The Telegram implementation lives in [`crate::bot::telegram`].

use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Sends text messages to a chat.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Posts `text` as a new message in `chat_id`.
    ///
    /// # Errors
    ///
    /// Returns an error on network or permission failures.
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<()>;
}

/// Establishes a [`Transport`].
///
/// Called at most once per successful connection; a failed attempt may be
/// retried by the next store access.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    /// Opens and authenticates a connection, and checks that the storage
    /// chat accepts messages from it.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Connect`](crate::error::StoreError::Connect) if
    /// the credentials are rejected, the platform is unreachable or the
    /// storage chat is not writable.
    async fn connect(&self) -> Result<Arc<dyn Transport>>;
}
