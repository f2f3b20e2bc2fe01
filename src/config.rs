//! Configuration for the link-sharing bot.
//!
//! Settings load from an optional TOML file and are then overridden by the
//! environment variables deployments already use (`TG_BOT_TOKEN`,
//! `DATABASE_MODE`, `DATABASE_CHANNEL`, ...). The sections are:
//!
//! - [`BotConfig`] - credentials, owner and configured admins
//! - [`StorageConfig`] - backend selection and storage channel
//! - [`ApprovalConfig`] - join-request auto-approval defaults
//! - [`LoggingConfig`] - tracing filter and output format

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::constants;

/// Result of configuration validation.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// Non-fatal warnings that should be logged but don't prevent operation.
    pub warnings: Vec<String>,
}

impl ValidationResult {
    /// Returns true if there are any warnings.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Root configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub bot: BotConfig,
    pub storage: StorageConfig,
    pub approval: ApprovalConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    pub token: String,
    pub owner_id: i64,
    /// Admins granted by configuration, in addition to stored admins.
    pub admins: Vec<i64>,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            owner_id: constants::DEFAULT_OWNER_ID,
            admins: Vec::new(),
        }
    }
}

/// Storage backend selector. Any value other than `channel_logs` means
/// the in-memory backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum StorageMode {
    #[default]
    Simple,
    ChannelLogs,
}

impl From<&str> for StorageMode {
    fn from(value: &str) -> Self {
        if value.trim() == constants::CHANNEL_LOGS_MODE {
            Self::ChannelLogs
        } else {
            Self::Simple
        }
    }
}

impl From<String> for StorageMode {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl StorageMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Simple => constants::SIMPLE_MODE,
            Self::ChannelLogs => constants::CHANNEL_LOGS_MODE,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub mode: StorageMode,
    /// Private channel receiving JSON records in `channel_logs` mode.
    pub channel_id: i64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            mode: StorageMode::Simple,
            channel_id: constants::DEFAULT_DATABASE_CHANNEL,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApprovalConfig {
    pub enabled: bool,
    pub wait_secs: u64,
    /// Chats whose join requests are handled. Empty means all chats.
    pub chat_ids: Vec<i64>,
    /// `CHAT_ID` entries that are not numeric ids, such as `@channel`
    /// usernames. Join requests are matched by numeric id only, so these
    /// are reported by [`Config::validate`] and otherwise ignored.
    #[serde(skip)]
    pub skipped_chat_ids: Vec<String>,
    /// Send a welcome message to approved users.
    pub welcome: bool,
    pub welcome_text: String,
}

impl Default for ApprovalConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            wait_secs: constants::DEFAULT_APPROVAL_WAIT_SECS,
            chat_ids: Vec::new(),
            skipped_chat_ids: Vec::new(),
            welcome: true,
            welcome_text: constants::DEFAULT_WELCOME_TEXT.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub filter: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: constants::DEFAULT_LOG_FILTER.to_string(),
            json: false,
        }
    }
}

impl Config {
    /// Loads configuration for the process.
    ///
    /// Reads `path` if given, otherwise `linkshare.toml` when it exists, then
    /// applies environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicitly named file is missing, any file
    /// contains invalid TOML, or an environment variable holds an invalid
    /// integer.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::load_from(path)?,
            None if Path::new(constants::DEFAULT_CONFIG_FILE).exists() => {
                Self::load_from(constants::DEFAULT_CONFIG_FILE)?
            }
            None => Self::default(),
        };
        config.apply_env(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// Load configuration from the specified TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or contains invalid TOML.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Applies environment overrides read through `var`.
    ///
    /// # Errors
    ///
    /// Returns an error naming the variable when an integer value is invalid.
    pub fn apply_env<F>(&mut self, var: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = var("TG_BOT_TOKEN") {
            self.bot.token = token;
        }
        if let Some(owner) = var("OWNER_ID") {
            self.bot.owner_id = parse_int("OWNER_ID", &owner)?;
        }
        if let Some(admins) = var("ADMINS") {
            self.bot.admins = parse_int_list("ADMINS", &admins)
                .context("Your Admins list does not contain valid integers")?;
        }
        if let Some(mode) = var("DATABASE_MODE") {
            self.storage.mode = StorageMode::from(mode);
        }
        if let Some(channel) = var("DATABASE_CHANNEL") {
            self.storage.channel_id = parse_int("DATABASE_CHANNEL", &channel)?;
        }
        if let Some(chats) = var("CHAT_ID") {
            let (ids, skipped) = split_chat_ids(&chats);
            self.approval.chat_ids = ids;
            self.approval.skipped_chat_ids = skipped;
        }
        if let Some(wait) = var("APPROVAL_WAIT_TIME") {
            self.approval.wait_secs = wait
                .trim()
                .parse()
                .with_context(|| format!("APPROVAL_WAIT_TIME is not a number: {wait}"))?;
        }
        if let Some(welcome) = var("APPROVED_WELCOME") {
            self.approval.welcome = welcome.trim().eq_ignore_ascii_case("on");
        }
        if let Some(text) = var("APPROVED_WELCOME_TEXT") {
            self.approval.welcome_text = text;
        }
        Ok(())
    }

    /// Every user allowed to run admin commands by configuration alone.
    #[must_use]
    pub fn configured_admins(&self) -> Vec<i64> {
        let mut admins = self.bot.admins.clone();
        if !admins.contains(&self.bot.owner_id) {
            admins.push(self.bot.owner_id);
        }
        admins
    }

    /// Validate configuration.
    ///
    /// Returns a `ValidationResult` containing any non-fatal warnings.
    #[must_use]
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        if self.bot.token.trim().is_empty() {
            result
                .warnings
                .push("TG_BOT_TOKEN is empty; the bot cannot start".to_string());
        } else if !self.bot.token.contains(':') {
            result
                .warnings
                .push("TG_BOT_TOKEN does not look like '<id>:<secret>'".to_string());
        }

        if self.bot.owner_id <= 0 {
            result
                .warnings
                .push(format!("OWNER_ID {} is not a user id", self.bot.owner_id));
        }

        if self.storage.mode == StorageMode::ChannelLogs {
            if self.storage.channel_id == 0 {
                result.warnings.push(
                    "DATABASE_CHANNEL is 0; falling back to the in-memory database".to_string(),
                );
            } else if self.storage.channel_id > 0 {
                result.warnings.push(format!(
                    "DATABASE_CHANNEL {} is positive; channel ids are usually negative",
                    self.storage.channel_id
                ));
            }
        }

        if !self.approval.skipped_chat_ids.is_empty() {
            result.warnings.push(format!(
                "CHAT_ID entries ignored, only numeric chat ids are supported: {}",
                self.approval.skipped_chat_ids.join(" ")
            ));
        }

        if self.approval.wait_secs > constants::MAX_APPROVAL_WAIT_SECS {
            result.warnings.push(format!(
                "approval wait of {}s exceeds {}s",
                self.approval.wait_secs,
                constants::MAX_APPROVAL_WAIT_SECS
            ));
        }

        result
    }
}

fn parse_int(name: &str, value: &str) -> Result<i64> {
    value
        .trim()
        .parse()
        .with_context(|| format!("{name} is not a valid integer: {value}"))
}

fn parse_int_list(name: &str, value: &str) -> Result<Vec<i64>> {
    value
        .split_whitespace()
        .map(|item| parse_int(name, item))
        .collect()
}

/// Splits a `CHAT_ID` list into numeric ids and the entries that are not.
fn split_chat_ids(value: &str) -> (Vec<i64>, Vec<String>) {
    let mut ids = Vec::new();
    let mut skipped = Vec::new();
    for item in value.split_whitespace() {
        match item.parse() {
            Ok(id) => ids.push(id),
            Err(_) => skipped.push(item.to_string()),
        }
    }
    (ids, skipped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.storage.mode, StorageMode::Simple);
        assert_eq!(config.storage.channel_id, constants::DEFAULT_DATABASE_CHANNEL);
        assert_eq!(config.approval.wait_secs, 5);
        assert!(config.approval.enabled);
        assert_eq!(config.bot.owner_id, constants::DEFAULT_OWNER_ID);
    }

    #[test]
    fn test_storage_mode_parsing() {
        assert_eq!(StorageMode::from("channel_logs"), StorageMode::ChannelLogs);
        assert_eq!(StorageMode::from("simple"), StorageMode::Simple);
        assert_eq!(StorageMode::from("mongodb"), StorageMode::Simple);
        assert_eq!(StorageMode::from(""), StorageMode::Simple);
    }

    #[test]
    fn test_load_from_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[bot]
token = "123:abc"
owner_id = 42
admins = [7, 8]

[storage]
mode = "channel_logs"
channel_id = -100500

[approval]
wait_secs = 10
chat_ids = [-1001]
"#
        )
        .unwrap();

        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.bot.token, "123:abc");
        assert_eq!(config.bot.admins, vec![7, 8]);
        assert_eq!(config.storage.mode, StorageMode::ChannelLogs);
        assert_eq!(config.storage.channel_id, -100_500);
        assert_eq!(config.approval.wait_secs, 10);
        assert_eq!(config.approval.chat_ids, vec![-1001]);
        // Untouched sections keep their defaults
        assert!(config.approval.welcome);
        assert_eq!(config.logging.filter, constants::DEFAULT_LOG_FILTER);
    }

    #[test]
    fn test_load_from_invalid_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[bot\ntoken = 1").unwrap();
        assert!(Config::load_from(file.path()).is_err());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config
            .apply_env(env(&[
                ("TG_BOT_TOKEN", "1:x"),
                ("OWNER_ID", "99"),
                ("ADMINS", "1 2  3"),
                ("DATABASE_MODE", "channel_logs"),
                ("DATABASE_CHANNEL", "-123"),
                ("CHAT_ID", "-5 -6"),
                ("APPROVED_WELCOME", "OFF"),
                ("APPROVAL_WAIT_TIME", "0"),
            ]))
            .unwrap();

        assert_eq!(config.bot.token, "1:x");
        assert_eq!(config.bot.owner_id, 99);
        assert_eq!(config.bot.admins, vec![1, 2, 3]);
        assert_eq!(config.storage.mode, StorageMode::ChannelLogs);
        assert_eq!(config.storage.channel_id, -123);
        assert_eq!(config.approval.chat_ids, vec![-5, -6]);
        assert!(!config.approval.welcome);
        assert_eq!(config.approval.wait_secs, 0);
    }

    #[test]
    fn test_env_rejects_invalid_admins() {
        let mut config = Config::default();
        let err = config.apply_env(env(&[("ADMINS", "1 two")])).unwrap_err();
        assert!(format!("{err:#}").contains("Admins list"));
    }

    #[test]
    fn test_env_chat_ids_skip_usernames() {
        let mut config = Config::default();
        config.bot.token = "123:abc".to_string();
        config
            .apply_env(env(&[("CHAT_ID", "-1001 @mychannel -1002")]))
            .unwrap();

        assert_eq!(config.approval.chat_ids, vec![-1001, -1002]);
        assert_eq!(config.approval.skipped_chat_ids, vec!["@mychannel"]);

        let result = config.validate();
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("@mychannel"));
    }

    #[test]
    fn test_configured_admins_include_owner_once() {
        let mut config = Config::default();
        config.bot.owner_id = 5;
        config.bot.admins = vec![1, 5];
        assert_eq!(config.configured_admins(), vec![1, 5]);

        config.bot.admins = vec![1];
        assert_eq!(config.configured_admins(), vec![1, 5]);
    }

    #[test]
    fn test_validate_warnings() {
        let mut config = Config::default();
        assert!(config.validate().has_warnings());

        config.bot.token = "123:abc".to_string();
        assert!(!config.validate().has_warnings());

        config.storage.mode = StorageMode::ChannelLogs;
        config.storage.channel_id = 0;
        let result = config.validate();
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("DATABASE_CHANNEL"));
    }
}
