//! Domain access layer over the key-value store.
//!
//! [`Database`] gives the bot typed operations for users, admins, channels,
//! invite links, approval toggles and force-subscribe channels. Each one maps
//! onto fixed key names (see [`crate::constants`]) so records written by one
//! deployment stay readable by the next.
//!
//! Nothing here returns an error. Invalid input and storage failures are
//! logged and reported as `false` or `None`.
//!
//! Membership mutations (`add_user`, `remove_admin`, `add_fsub_channel`, ...)
//! return `true` when the requested state holds after the call, including
//! when it already held.

use crate::constants::{
    ADMINS_KEY, APPROVAL_OFF_PREFIX, CHANNEL_PREFIX, FSUB_CHANNELS_KEY, INVITE_PREFIX,
    ORIGINAL_PREFIX, REQ_CHANNEL_PREFIX, USERS_KEY, keyed,
};
use crate::store::{
    ChannelRecord, ChannelStatus, InviteRecord, KvStore, RequestChannelRecord, StoredValue,
};
use crate::token::encode_channel_id;
use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Current invite link of a channel and whether it is a join-request link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentInvite {
    pub invite_link: String,
    pub is_request: bool,
}

/// Typed domain operations over a [`KvStore`].
///
/// Constructed once per process and shared by reference (`Arc<Database>`).
pub struct Database {
    store: KvStore,
    // Serializes read-modify-write of the id lists
    lists: Mutex<()>,
}

fn valid_user(user_id: i64) -> bool {
    if user_id <= 0 {
        warn!(user_id, "Invalid user id");
        return false;
    }
    true
}

fn valid_channel(channel_id: i64) -> bool {
    if channel_id == 0 {
        warn!(channel_id, "Invalid channel id");
        return false;
    }
    true
}

impl Database {
    pub fn new(store: KvStore) -> Self {
        Self {
            store,
            lists: Mutex::new(()),
        }
    }

    /// In-memory database, mainly for tests.
    pub fn memory() -> Self {
        Self::new(KvStore::memory())
    }

    pub fn store(&self) -> &KvStore {
        &self.store
    }

    // ---------------------------------------------------------------------
    // Id lists
    // ---------------------------------------------------------------------

    async fn ids(&self, key: &str) -> Vec<i64> {
        self.store
            .get(key)
            .await
            .and_then(StoredValue::into_ids)
            .unwrap_or_default()
    }

    async fn insert_id(&self, key: &str, id: i64) -> bool {
        let _guard = self.lists.lock().await;
        let mut ids = self.ids(key).await;
        if ids.contains(&id) {
            return true;
        }
        ids.push(id);
        self.store.set(key, ids.into()).await
    }

    async fn remove_id(&self, key: &str, id: i64) -> bool {
        let _guard = self.lists.lock().await;
        let mut ids = self.ids(key).await;
        let before = ids.len();
        ids.retain(|&existing| existing != id);
        if ids.len() == before {
            return true;
        }
        self.store.set(key, ids.into()).await
    }

    // ---------------------------------------------------------------------
    // Users
    // ---------------------------------------------------------------------

    /// Registers a user.
    pub async fn add_user(&self, user_id: i64) -> bool {
        valid_user(user_id) && self.insert_id(USERS_KEY, user_id).await
    }

    pub async fn present_user(&self, user_id: i64) -> bool {
        user_id > 0 && self.ids(USERS_KEY).await.contains(&user_id)
    }

    pub async fn full_userbase(&self) -> Vec<i64> {
        self.ids(USERS_KEY).await
    }

    pub async fn del_user(&self, user_id: i64) -> bool {
        valid_user(user_id) && self.remove_id(USERS_KEY, user_id).await
    }

    pub async fn users_count(&self) -> usize {
        self.ids(USERS_KEY).await.len()
    }

    // ---------------------------------------------------------------------
    // Admins
    // ---------------------------------------------------------------------

    pub async fn add_admin(&self, user_id: i64) -> bool {
        valid_user(user_id) && self.insert_id(ADMINS_KEY, user_id).await
    }

    pub async fn remove_admin(&self, user_id: i64) -> bool {
        valid_user(user_id) && self.remove_id(ADMINS_KEY, user_id).await
    }

    pub async fn is_admin(&self, user_id: i64) -> bool {
        user_id > 0 && self.ids(ADMINS_KEY).await.contains(&user_id)
    }

    pub async fn list_admins(&self) -> Vec<i64> {
        self.ids(ADMINS_KEY).await
    }

    // ---------------------------------------------------------------------
    // Channels
    // ---------------------------------------------------------------------

    async fn channel_record(&self, channel_id: i64) -> Option<ChannelRecord> {
        self.store
            .get(&keyed(CHANNEL_PREFIX, channel_id))
            .await
            .and_then(StoredValue::into_channel)
    }

    /// Saves a fresh active channel record, replacing any existing one.
    pub async fn save_channel(&self, channel_id: i64, encoded_link: Option<&str>) -> bool {
        if !valid_channel(channel_id) {
            return false;
        }
        let mut record = ChannelRecord::new(channel_id);
        record.encoded_link = encoded_link.map(str::to_string);
        self.store
            .set(&keyed(CHANNEL_PREFIX, channel_id), record.into())
            .await
    }

    /// Ids of all active channels.
    pub async fn get_channels(&self) -> Vec<i64> {
        let mut channels = Vec::new();
        for key in self.store.list_keys(Some(CHANNEL_PREFIX)).await {
            let Ok(channel_id) = key[CHANNEL_PREFIX.len()..].parse::<i64>() else {
                debug!(key = %key, "Skipping malformed channel key");
                continue;
            };
            if self
                .channel_record(channel_id)
                .await
                .is_some_and(|record| record.is_active())
            {
                channels.push(channel_id);
            }
        }
        channels.sort_unstable();
        channels
    }

    /// Removes a channel's records and invite link.
    ///
    /// Returns `false` if the channel was not stored. The approval toggle and
    /// original link are left in place.
    pub async fn delete_channel(&self, channel_id: i64) -> bool {
        if !valid_channel(channel_id) {
            return false;
        }
        let key = keyed(CHANNEL_PREFIX, channel_id);
        if !self.store.exists(&key).await {
            return false;
        }
        let removed = self.store.delete(&key).await;
        self.store
            .delete(&keyed(REQ_CHANNEL_PREFIX, channel_id))
            .await;
        self.store.delete(&keyed(INVITE_PREFIX, channel_id)).await;
        removed
    }

    /// Issues (or re-issues) the channel's primary token and marks the
    /// channel active. The token is a pure function of the id.
    pub async fn save_encoded_link(&self, channel_id: i64) -> Option<String> {
        if !valid_channel(channel_id) {
            return None;
        }
        let token = encode_channel_id(channel_id);
        let now = Utc::now();

        let mut record = self
            .channel_record(channel_id)
            .await
            .unwrap_or_else(|| ChannelRecord::new(channel_id));
        record.encoded_link = Some(token.clone());
        record.status = ChannelStatus::Active;
        record.updated_at = Some(now);

        self.store
            .set(&keyed(CHANNEL_PREFIX, channel_id), record.into())
            .await
            .then_some(token)
    }

    /// Finds the active channel whose primary token is `encoded_link`.
    pub async fn get_channel_by_encoded_link(&self, encoded_link: &str) -> Option<i64> {
        if encoded_link.is_empty() {
            return None;
        }
        for key in self.store.list_keys(Some(CHANNEL_PREFIX)).await {
            let Some(record) = self
                .store
                .get(&key)
                .await
                .and_then(StoredValue::into_channel)
            else {
                continue;
            };
            if record.is_active() && record.encoded_link.as_deref() == Some(encoded_link) {
                return Some(record.id);
            }
        }
        None
    }

    /// Stores the channel's secondary ("request") token.
    pub async fn save_encoded_link2(&self, channel_id: i64, encoded_link: &str) -> Option<String> {
        if !valid_channel(channel_id) || encoded_link.is_empty() {
            warn!(channel_id, "Invalid secondary token input");
            return None;
        }
        let record = RequestChannelRecord {
            id: channel_id,
            req_encoded_link: encoded_link.to_string(),
            created_at: Utc::now(),
        };
        self.store
            .set(&keyed(REQ_CHANNEL_PREFIX, channel_id), record.into())
            .await
            .then(|| encoded_link.to_string())
    }

    /// Finds the channel whose secondary token is `encoded_link`.
    pub async fn get_channel_by_encoded_link2(&self, encoded_link: &str) -> Option<i64> {
        if encoded_link.is_empty() {
            return None;
        }
        for key in self.store.list_keys(Some(REQ_CHANNEL_PREFIX)).await {
            let Some(record) = self
                .store
                .get(&key)
                .await
                .and_then(StoredValue::into_request_channel)
            else {
                continue;
            };
            if record.req_encoded_link == encoded_link {
                return Some(record.id);
            }
        }
        None
    }

    // ---------------------------------------------------------------------
    // Invite links
    // ---------------------------------------------------------------------

    pub async fn save_invite_link(
        &self,
        channel_id: i64,
        invite_link: &str,
        is_request: bool,
    ) -> bool {
        if !valid_channel(channel_id) || invite_link.is_empty() {
            warn!(channel_id, "Invalid invite link input");
            return false;
        }
        let record = InviteRecord {
            channel_id,
            invite_link: invite_link.to_string(),
            is_request,
            created_at: Utc::now(),
        };
        self.store
            .set(&keyed(INVITE_PREFIX, channel_id), record.into())
            .await
    }

    pub async fn get_current_invite_link(&self, channel_id: i64) -> Option<CurrentInvite> {
        if channel_id == 0 {
            return None;
        }
        self.store
            .get(&keyed(INVITE_PREFIX, channel_id))
            .await
            .and_then(StoredValue::into_invite)
            .map(|record| CurrentInvite {
                invite_link: record.invite_link,
                is_request: record.is_request,
            })
    }

    /// Remembers the link a channel was originally shared with.
    pub async fn set_original_link(&self, channel_id: i64, link: &str) -> bool {
        if !valid_channel(channel_id) || link.is_empty() {
            return false;
        }
        self.store
            .set(&keyed(ORIGINAL_PREFIX, channel_id), link.into())
            .await
    }

    pub async fn get_original_link(&self, channel_id: i64) -> Option<String> {
        if channel_id == 0 {
            return None;
        }
        self.store
            .get(&keyed(ORIGINAL_PREFIX, channel_id))
            .await
            .and_then(StoredValue::into_text)
    }

    // ---------------------------------------------------------------------
    // Approval toggle
    // ---------------------------------------------------------------------

    pub async fn set_approval_off(&self, channel_id: i64, off: bool) -> bool {
        valid_channel(channel_id)
            && self
                .store
                .set(&keyed(APPROVAL_OFF_PREFIX, channel_id), off.into())
                .await
    }

    pub async fn is_approval_off(&self, channel_id: i64) -> bool {
        channel_id != 0
            && self
                .store
                .get(&keyed(APPROVAL_OFF_PREFIX, channel_id))
                .await
                .and_then(|value| value.as_flag())
                .unwrap_or(false)
    }

    // ---------------------------------------------------------------------
    // Force-subscribe channels
    // ---------------------------------------------------------------------

    pub async fn add_fsub_channel(&self, channel_id: i64) -> bool {
        valid_channel(channel_id) && self.insert_id(FSUB_CHANNELS_KEY, channel_id).await
    }

    pub async fn remove_fsub_channel(&self, channel_id: i64) -> bool {
        valid_channel(channel_id) && self.remove_id(FSUB_CHANNELS_KEY, channel_id).await
    }

    pub async fn get_fsub_channels(&self) -> Vec<i64> {
        self.ids(FSUB_CHANNELS_KEY).await
    }
}
