//! Telegram implementations of the store and approval seams.

use crate::approval::{ChatModerator, JoinRequest};
use crate::error::{Result, StoreError};
use crate::store::{Connector, Transport};
use async_trait::async_trait;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::{ChatId, UserId};
use tracing::debug;

/// Connects a bot account to the storage channel.
///
/// Before the transport is handed out the bot must authenticate with `getMe`
/// and be an administrator of the storage channel. A bad token, a wrong
/// channel id or missing rights all surface as a connection failure rather
/// than as a failed write.
pub struct TelegramConnector {
    bot: Bot,
    channel_id: i64,
}

impl TelegramConnector {
    pub fn new(bot: Bot, channel_id: i64) -> Self {
        Self { bot, channel_id }
    }
}

#[async_trait]
impl Connector for TelegramConnector {
    async fn connect(&self) -> Result<Arc<dyn Transport>> {
        let me = self.bot.get_me().await.map_err(StoreError::connect)?;
        let member = self
            .bot
            .get_chat_member(ChatId(self.channel_id), me.user.id)
            .await
            .map_err(|e| {
                StoreError::connect(format!("channel {}: {e}", self.channel_id))
            })?;
        if !member.kind.is_privileged() {
            return Err(StoreError::connect(format!(
                "bot is not an administrator of channel {}",
                self.channel_id
            )));
        }

        debug!(
            bot_id = me.user.id.0,
            channel_id = self.channel_id,
            "Storage bot authenticated"
        );
        Ok(Arc::new(TelegramTransport {
            bot: self.bot.clone(),
        }))
    }
}

struct TelegramTransport {
    bot: Bot,
}

#[async_trait]
impl Transport for TelegramTransport {
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<()> {
        self.bot
            .send_message(ChatId(chat_id), text)
            .await
            .map_err(|e| StoreError::send(format!("chat {chat_id}"), e))?;
        Ok(())
    }
}

/// Approves join requests through the Bot API.
pub struct TelegramModerator {
    bot: Bot,
}

impl TelegramModerator {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

fn user_id(id: i64) -> UserId {
    UserId(id.unsigned_abs())
}

#[async_trait]
impl ChatModerator for TelegramModerator {
    async fn is_member(&self, chat_id: i64, user: i64) -> anyhow::Result<bool> {
        let member = self.bot.get_chat_member(ChatId(chat_id), user_id(user)).await?;
        Ok(member.kind.is_present())
    }

    async fn approve(&self, chat_id: i64, user: i64) -> anyhow::Result<()> {
        self.bot
            .approve_chat_join_request(ChatId(chat_id), user_id(user))
            .await?;
        Ok(())
    }

    async fn welcome(&self, request: &JoinRequest, text: &str) -> anyhow::Result<()> {
        self.bot.send_message(ChatId(request.user_id), text).await?;
        Ok(())
    }
}
