//! Values held by the key-value store.
//!
//! The store only ever holds a small closed set of shapes. [`StoredValue`]
//! is untagged, so each variant serializes to the same JSON a dynamic value
//! would: a bare boolean, a list of integers, a string, or an object.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a channel record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelStatus {
    Active,
    Deleted,
}

/// Primary channel record, stored under `channel_{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelRecord {
    pub id: i64,
    #[serde(default)]
    pub encoded_link: Option<String>,
    pub status: ChannelStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl ChannelRecord {
    /// Creates an active record with no token.
    #[must_use]
    pub fn new(id: i64) -> Self {
        Self {
            id,
            encoded_link: None,
            status: ChannelStatus::Active,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == ChannelStatus::Active
    }
}

/// Secondary ("request") channel record, stored under `req_channel_{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestChannelRecord {
    pub id: i64,
    pub req_encoded_link: String,
    pub created_at: DateTime<Utc>,
}

/// Current invite link of a channel, stored under `invite_{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InviteRecord {
    pub channel_id: i64,
    pub invite_link: String,
    #[serde(default)]
    pub is_request: bool,
    pub created_at: DateTime<Utc>,
}

/// A value stored under a key.
///
/// Variant order matters for deserialization: untagged enums try each
/// variant in turn, so records with more specific required fields come
/// before [`ChannelRecord`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoredValue {
    Flag(bool),
    Ids(Vec<i64>),
    Text(String),
    Invite(InviteRecord),
    RequestChannel(RequestChannelRecord),
    Channel(ChannelRecord),
}

impl StoredValue {
    /// Short name of the variant, used in log fields.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Flag(_) => "flag",
            Self::Ids(_) => "ids",
            Self::Text(_) => "text",
            Self::Invite(_) => "invite",
            Self::RequestChannel(_) => "req_channel",
            Self::Channel(_) => "channel",
        }
    }

    #[must_use]
    pub fn as_flag(&self) -> Option<bool> {
        match self {
            Self::Flag(flag) => Some(*flag),
            _ => None,
        }
    }

    #[must_use]
    pub fn into_ids(self) -> Option<Vec<i64>> {
        match self {
            Self::Ids(ids) => Some(ids),
            _ => None,
        }
    }

    #[must_use]
    pub fn into_text(self) -> Option<String> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    #[must_use]
    pub fn into_channel(self) -> Option<ChannelRecord> {
        match self {
            Self::Channel(record) => Some(record),
            _ => None,
        }
    }

    #[must_use]
    pub fn into_request_channel(self) -> Option<RequestChannelRecord> {
        match self {
            Self::RequestChannel(record) => Some(record),
            _ => None,
        }
    }

    #[must_use]
    pub fn into_invite(self) -> Option<InviteRecord> {
        match self {
            Self::Invite(record) => Some(record),
            _ => None,
        }
    }
}

impl From<bool> for StoredValue {
    fn from(flag: bool) -> Self {
        Self::Flag(flag)
    }
}

impl From<Vec<i64>> for StoredValue {
    fn from(ids: Vec<i64>) -> Self {
        Self::Ids(ids)
    }
}

impl From<String> for StoredValue {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for StoredValue {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<ChannelRecord> for StoredValue {
    fn from(record: ChannelRecord) -> Self {
        Self::Channel(record)
    }
}

impl From<RequestChannelRecord> for StoredValue {
    fn from(record: RequestChannelRecord) -> Self {
        Self::RequestChannel(record)
    }
}

impl From<InviteRecord> for StoredValue {
    fn from(record: InviteRecord) -> Self {
        Self::Invite(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalars_encode_as_bare_json() {
        assert_eq!(serde_json::to_value(StoredValue::Flag(true)).unwrap(), json!(true));
        assert_eq!(
            serde_json::to_value(StoredValue::Ids(vec![1, 2])).unwrap(),
            json!([1, 2])
        );
        assert_eq!(
            serde_json::to_value(StoredValue::from("https://t.me/+abc")).unwrap(),
            json!("https://t.me/+abc")
        );
    }

    #[test]
    fn test_empty_list_decodes_as_ids() {
        let value: StoredValue = serde_json::from_value(json!([])).unwrap();
        assert_eq!(value, StoredValue::Ids(vec![]));
    }

    #[test]
    fn test_records_decode_to_their_variant() {
        let invite: StoredValue = serde_json::from_value(json!({
            "channel_id": -100,
            "invite_link": "https://t.me/+x",
            "is_request": true,
            "created_at": "2025-01-01T00:00:00Z"
        }))
        .unwrap();
        assert_eq!(invite.kind(), "invite");

        let req: StoredValue = serde_json::from_value(json!({
            "id": -100,
            "req_encoded_link": "LTEwMA==",
            "created_at": "2025-01-01T00:00:00Z"
        }))
        .unwrap();
        assert_eq!(req.kind(), "req_channel");

        let channel: StoredValue = serde_json::from_value(json!({
            "id": -100,
            "encoded_link": "LTEwMA==",
            "status": "active",
            "created_at": "2025-01-01T00:00:00Z"
        }))
        .unwrap();
        let record = channel.into_channel().unwrap();
        assert!(record.is_active());
        assert_eq!(record.encoded_link.as_deref(), Some("LTEwMA=="));
    }

    #[test]
    fn test_accessors_reject_other_variants() {
        assert_eq!(StoredValue::Flag(true).into_ids(), None);
        assert_eq!(StoredValue::Ids(vec![1]).as_flag(), None);
        assert!(StoredValue::from("x").into_channel().is_none());
    }
}
