//! Shared constants: storage key names, defaults, and limits.
//!
//! Key names are part of the persisted format. Records already written to a
//! storage channel use exactly these strings, so they must not change.

/// Key holding the list of registered user ids.
pub const USERS_KEY: &str = "users";

/// Key holding the list of admin user ids.
pub const ADMINS_KEY: &str = "admins";

/// Key holding the list of force-subscribe channel ids.
pub const FSUB_CHANNELS_KEY: &str = "fsub_channels";

/// Prefix for primary channel records (`channel_{id}`).
pub const CHANNEL_PREFIX: &str = "channel_";

/// Prefix for secondary ("request") channel records (`req_channel_{id}`).
pub const REQ_CHANNEL_PREFIX: &str = "req_channel_";

/// Prefix for current invite link records (`invite_{id}`).
pub const INVITE_PREFIX: &str = "invite_";

/// Prefix for original link records (`original_{id}`).
pub const ORIGINAL_PREFIX: &str = "original_";

/// Prefix for per-channel approval toggles (`approval_off_{id}`).
pub const APPROVAL_OFF_PREFIX: &str = "approval_off_";

/// `DATABASE_MODE` value selecting the channel-backed store.
pub const CHANNEL_LOGS_MODE: &str = "channel_logs";

/// `DATABASE_MODE` value selecting the in-memory store.
pub const SIMPLE_MODE: &str = "simple";

/// Default owner id when none is configured.
pub const DEFAULT_OWNER_ID: i64 = 7_753_899_951;

/// Default storage channel id.
pub const DEFAULT_DATABASE_CHANNEL: i64 = -1_002_751_155_801;

/// Seconds to wait before approving a join request.
pub const DEFAULT_APPROVAL_WAIT_SECS: u64 = 5;

/// Upper bound accepted by `/reqtime`.
pub const MAX_APPROVAL_WAIT_SECS: u64 = 3600;

/// Default welcome text sent after approval. `{mention}` and `{title}` are
/// substituted.
pub const DEFAULT_WELCOME_TEXT: &str = "{mention}, your request to join {title} is approved.";

/// Default configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "linkshare.toml";

/// Default tracing filter.
pub const DEFAULT_LOG_FILTER: &str = "info,teloxide=warn";

/// Builds a key from a prefix and a numeric id.
#[must_use]
pub fn keyed(prefix: &str, id: i64) -> String {
    format!("{prefix}{id}")
}
