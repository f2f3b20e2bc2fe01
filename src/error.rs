//! Store error types for typed error handling.
//!
//! Backends report failures through [`StoreError`]. The [`KvStore`] facade
//! and the domain layer absorb these into booleans and defaults, so they only
//! surface to code talking to a backend directly.
//!
//! [`KvStore`]: crate::store::KvStore

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors raised by key-value backends and their transports.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum StoreError {
    /// Backend configuration is unusable (missing token, zero channel id).
    #[error("invalid storage configuration: {0}")]
    InvalidConfig(String),

    /// Connecting to the chat platform failed.
    #[error("failed to connect to chat platform: {reason}")]
    Connect { reason: String },

    /// No connection is available; the backend is running cache-only.
    #[error("storage channel {channel_id} is not connected")]
    NotConnected { channel_id: i64 },

    /// Sending a record to the storage channel failed.
    #[error("failed to send record for '{key}': {reason}")]
    Send { key: String, reason: String },

    /// A record could not be encoded or decoded.
    #[error("record serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl StoreError {
    /// Create a send error for a key.
    pub fn send(key: impl Into<String>, reason: impl ToString) -> Self {
        Self::Send {
            key: key.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a connect error.
    pub fn connect(reason: impl ToString) -> Self {
        Self::Connect {
            reason: reason.to_string(),
        }
    }

    /// Returns true if the backend can still serve cached reads.
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Connect { .. } | Self::NotConnected { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = StoreError::send("users", "chat not found");
        assert_eq!(
            err.to_string(),
            "failed to send record for 'users': chat not found"
        );

        let err = StoreError::NotConnected { channel_id: -100 };
        assert_eq!(err.to_string(), "storage channel -100 is not connected");
    }

    #[test]
    fn test_is_degraded() {
        assert!(StoreError::connect("unauthorized").is_degraded());
        assert!(StoreError::NotConnected { channel_id: 1 }.is_degraded());
        assert!(!StoreError::send("k", "x").is_degraded());
        assert!(!StoreError::InvalidConfig("x".into()).is_degraded());
    }
}
