//! Bot commands and their argument parsing.
//!
//! Everything that only needs the database lives in [`BotState::execute`],
//! which returns the reply text. Commands that call the Bot API (`/genlink`)
//! are handled in [`super::handlers`].

use crate::approval::JoinRequestApprover;
use crate::constants::MAX_APPROVAL_WAIT_SECS;
use crate::database::Database;
use std::sync::Arc;
use teloxide::utils::command::BotCommands;
use thiserror::Error;

#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Supported commands:")]
pub enum Command {
    #[command(description = "register, or open a shared channel link")]
    Start(String),
    #[command(description = "show this text")]
    Help,
    #[command(description = "share a channel: /genlink <channel_id> [req]")]
    Genlink(String),
    #[command(description = "set approval delay: /reqtime <seconds>")]
    Reqtime(String),
    #[command(description = "toggle auto-approval: /reqmode on|off")]
    Reqmode(String),
    #[command(description = "disable auto-approval for a channel")]
    Approveoff(String),
    #[command(description = "enable auto-approval for a channel")]
    Approveon(String),
    #[command(description = "grant admin rights: /addadmin <user_id>")]
    Addadmin(String),
    #[command(description = "revoke admin rights: /deladmin <user_id>")]
    Deladmin(String),
    #[command(description = "list admins")]
    Admins,
    #[command(description = "add a force-subscribe channel")]
    Addfsub(String),
    #[command(description = "remove a force-subscribe channel")]
    Delfsub(String),
    #[command(description = "list force-subscribe channels")]
    Fsubs,
    #[command(description = "count registered users")]
    Users,
}

impl Command {
    /// Commands restricted to the owner and admins.
    pub fn requires_admin(&self) -> bool {
        !matches!(self, Self::Start(_) | Self::Help)
    }
}

/// A command argument that could not be used.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UsageError {
    #[error("Usage: /{command} {usage}")]
    Usage {
        command: &'static str,
        usage: &'static str,
    },
    #[error("Wait time must be at most {max} seconds", max = MAX_APPROVAL_WAIT_SECS)]
    WaitTooLong,
}

fn usage(command: &'static str, usage: &'static str) -> UsageError {
    UsageError::Usage { command, usage }
}

/// Parses a non-zero channel id such as `-1001234567890`.
pub fn parse_channel_id(command: &'static str, arg: &str) -> Result<i64, UsageError> {
    match arg.trim().parse::<i64>() {
        Ok(id) if id != 0 => Ok(id),
        _ => Err(usage(command, "<channel_id>")),
    }
}

/// Parses a positive user id.
pub fn parse_user_id(command: &'static str, arg: &str) -> Result<i64, UsageError> {
    match arg.trim().parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(usage(command, "<user_id>")),
    }
}

/// Parses the `/reqtime` argument.
pub fn parse_wait_secs(arg: &str) -> Result<u64, UsageError> {
    let secs = arg
        .trim()
        .parse::<u64>()
        .map_err(|_| usage("reqtime", "<seconds>"))?;
    if secs > MAX_APPROVAL_WAIT_SECS {
        return Err(UsageError::WaitTooLong);
    }
    Ok(secs)
}

/// Parses the `/reqmode` argument.
pub fn parse_mode(arg: &str) -> Result<bool, UsageError> {
    match arg.trim().to_ascii_lowercase().as_str() {
        "on" => Ok(true),
        "off" => Ok(false),
        _ => Err(usage("reqmode", "on|off")),
    }
}

/// Parses the `/genlink` arguments: a channel id and an optional `req` flag.
pub fn parse_genlink(arg: &str) -> Result<(i64, bool), UsageError> {
    let mut parts = arg.split_whitespace();
    let channel = parts.next().unwrap_or_default();
    let channel_id = parse_channel_id("genlink", channel)?;
    match parts.next() {
        None => Ok((channel_id, false)),
        Some(flag) if flag.eq_ignore_ascii_case("req") => Ok((channel_id, true)),
        Some(_) => Err(usage("genlink", "<channel_id> [req]")),
    }
}

/// Shared state handed to every handler.
pub struct BotState {
    pub db: Arc<Database>,
    pub approver: Arc<JoinRequestApprover>,
    /// Owner plus admins granted by configuration.
    pub configured_admins: Vec<i64>,
    pub bot_username: String,
}

impl BotState {
    /// True for the owner, configured admins and stored admins.
    pub async fn is_authorized(&self, user_id: i64) -> bool {
        self.configured_admins.contains(&user_id) || self.db.is_admin(user_id).await
    }

    /// Runs a database-only command and returns the reply.
    pub async fn execute(&self, command: Command, user_id: i64) -> String {
        match self.run(command, user_id).await {
            Ok(reply) => reply,
            Err(e) => e.to_string(),
        }
    }

    async fn run(&self, command: Command, user_id: i64) -> Result<String, UsageError> {
        let reply = match command {
            Command::Start(arg) => self.start(user_id, arg.trim()).await,
            Command::Help => Command::descriptions().to_string(),
            Command::Genlink(_) => "Link generation needs the Bot API.".to_string(),
            Command::Reqtime(arg) => {
                let secs = parse_wait_secs(&arg)?;
                self.approver.settings().set_wait_secs(secs);
                format!("Request approval time set to {secs} seconds.")
            }
            Command::Reqmode(arg) => {
                let enabled = parse_mode(&arg)?;
                self.approver.settings().set_enabled(enabled);
                format!(
                    "Auto-approval has been {}.",
                    if enabled { "enabled" } else { "disabled" }
                )
            }
            Command::Approveoff(arg) => {
                let channel_id = parse_channel_id("approveoff", &arg)?;
                let saved = self.db.set_approval_off(channel_id, true).await;
                toggle_reply(saved, "OFF", channel_id)
            }
            Command::Approveon(arg) => {
                let channel_id = parse_channel_id("approveon", &arg)?;
                let saved = self.db.set_approval_off(channel_id, false).await;
                toggle_reply(saved, "ON", channel_id)
            }
            Command::Addadmin(arg) => {
                let admin = parse_user_id("addadmin", &arg)?;
                if self.db.add_admin(admin).await {
                    format!("User {admin} is now an admin.")
                } else {
                    format!("Failed to add admin {admin}.")
                }
            }
            Command::Deladmin(arg) => {
                let admin = parse_user_id("deladmin", &arg)?;
                if self.db.remove_admin(admin).await {
                    format!("User {admin} is no longer an admin.")
                } else {
                    format!("Failed to remove admin {admin}.")
                }
            }
            Command::Admins => list_reply("Admins", &self.db.list_admins().await),
            Command::Addfsub(arg) => {
                let channel_id = parse_channel_id("addfsub", &arg)?;
                if self.db.add_fsub_channel(channel_id).await {
                    format!("Channel {channel_id} added to FSub channels.")
                } else {
                    format!("Failed to add FSub channel {channel_id}.")
                }
            }
            Command::Delfsub(arg) => {
                let channel_id = parse_channel_id("delfsub", &arg)?;
                if self.db.remove_fsub_channel(channel_id).await {
                    format!("Channel {channel_id} removed from FSub channels.")
                } else {
                    format!("Failed to remove FSub channel {channel_id}.")
                }
            }
            Command::Fsubs => {
                let channels = self.db.get_fsub_channels().await;
                list_reply("FSub channels", &channels)
            }
            Command::Users => {
                let count = self.db.users_count().await;
                format!("{count} users are using this bot.")
            }
        };
        Ok(reply)
    }

    async fn start(&self, user_id: i64, token: &str) -> String {
        self.db.add_user(user_id).await;
        if token.is_empty() {
            return "Welcome! Open a shared link to get a channel invite.".to_string();
        }

        let channel = match self.db.get_channel_by_encoded_link(token).await {
            Some(channel_id) => Some(channel_id),
            None => self.db.get_channel_by_encoded_link2(token).await,
        };
        let Some(channel_id) = channel else {
            return "This link is invalid or has expired.".to_string();
        };

        match self.db.get_current_invite_link(channel_id).await {
            Some(invite) if invite.is_request => {
                format!("Request to join here: {}", invite.invite_link)
            }
            Some(invite) => format!("Join here: {}", invite.invite_link),
            None => "No invite link is available for this channel yet.".to_string(),
        }
    }
}

fn toggle_reply(success: bool, state: &str, channel_id: i64) -> String {
    if success {
        format!("Auto-approval is now {state} for channel {channel_id}.")
    } else {
        format!("Failed to set auto-approval {state} for channel {channel_id}.")
    }
}

fn list_reply(title: &str, ids: &[i64]) -> String {
    if ids.is_empty() {
        return format!("{title}: none");
    }
    let lines: Vec<String> = ids.iter().map(|id| format!("- {id}")).collect();
    format!("{title}:\n{}", lines.join("\n"))
}
