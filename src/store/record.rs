//! Wire format of records written to the storage channel.
//!
//! Each mutation becomes one pretty-printed JSON message:
//!
//! ```json
//! {
//!   "key": "users",
//!   "value": [1, 2],
//!   "timestamp": "2025-01-01T12:00:00.123456789Z",
//!   "action": "set"
//! }
//! ```
//!
//! Delete events carry no `value`. There is no schema version field.

use super::value::StoredValue;
use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Mutation kind of a [`LogRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogAction {
    Set,
    Delete,
}

/// One append-only mutation event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<StoredValue>,
    pub timestamp: DateTime<Utc>,
    pub action: LogAction,
}

impl LogRecord {
    /// A `set` event for `key`, stamped now.
    pub fn set(key: &str, value: StoredValue) -> Self {
        Self {
            key: key.to_string(),
            value: Some(value),
            timestamp: Utc::now(),
            action: LogAction::Set,
        }
    }

    /// A `delete` event for `key`, stamped now.
    pub fn delete(key: &str) -> Self {
        Self {
            key: key.to_string(),
            value: None,
            timestamp: Utc::now(),
            action: LogAction::Delete,
        }
    }

    /// Encodes the record as the message text sent to the channel.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be serialized.
    pub fn to_message(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Decodes a message previously produced by [`LogRecord::to_message`].
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid record.
    pub fn from_message(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}
