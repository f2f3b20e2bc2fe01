//! Startup backend selection.
//!
//! Opening the channel backend is an explicit step returning a typed result;
//! the caller decides what to do on failure. [`select_store`] makes that
//! decision once per process. It connects the storage channel before
//! committing to it, and any failure falls back to memory.

use super::channel::ChannelBackend;
use super::store::KvStore;
use super::transport::Connector;
use crate::config::{StorageConfig, StorageMode};
use crate::error::{Result, StoreError};
use std::sync::Arc;
use tracing::{info, warn};

/// Which backend ended up serving the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Memory,
    Channel,
}

/// Outcome of [`select_store`].
pub struct Selection {
    pub store: KvStore,
    pub kind: BackendKind,
    /// Why the channel backend was requested but not used.
    pub fallback: Option<String>,
}

/// Opens the channel backend for `config` without connecting it.
///
/// The connection is made on first access, or by
/// [`ChannelBackend::connect_now`].
///
/// # Errors
///
/// Returns [`StoreError::InvalidConfig`] for a zero channel id or an empty
/// bot token.
pub async fn open_backend(
    config: &StorageConfig,
    bot_token: &str,
    connector: Arc<dyn Connector>,
) -> Result<ChannelBackend> {
    if config.channel_id == 0 {
        return Err(StoreError::InvalidConfig(
            "storage channel id must be non-zero".to_string(),
        ));
    }
    if bot_token.trim().is_empty() {
        return Err(StoreError::InvalidConfig(
            "bot token is required for channel storage".to_string(),
        ));
    }

    Ok(ChannelBackend::new(config.channel_id, connector))
}

async fn open_connected(
    config: &StorageConfig,
    bot_token: &str,
    connector: Arc<dyn Connector>,
) -> Result<ChannelBackend> {
    let backend = open_backend(config, bot_token, connector).await?;
    backend.connect_now().await?;
    Ok(backend)
}

/// Picks the backend named by `config.mode`, falling back to memory.
///
/// In `channel_logs` mode the storage channel is connected here, so an
/// unreachable platform or an inaccessible channel is caught at startup
/// rather than on the first write.
pub async fn select_store(
    config: &StorageConfig,
    bot_token: &str,
    connector: Arc<dyn Connector>,
) -> Selection {
    match config.mode {
        StorageMode::Simple => {
            info!("Using in-memory database; data will not persist between restarts");
            Selection {
                store: KvStore::memory(),
                kind: BackendKind::Memory,
                fallback: None,
            }
        }
        StorageMode::ChannelLogs => match open_connected(config, bot_token, connector).await {
            Ok(backend) => {
                info!(channel_id = config.channel_id, "Using storage channel database");
                Selection {
                    store: KvStore::custom(backend),
                    kind: BackendKind::Channel,
                    fallback: None,
                }
            }
            Err(e) => {
                warn!(
                    error = %e,
                    "Channel database unavailable, falling back to in-memory database"
                );
                Selection {
                    store: KvStore::memory(),
                    kind: BackendKind::Memory,
                    fallback: Some(e.to_string()),
                }
            }
        },
    }
}
