//! Update handlers registered with the dispatcher.

use super::commands::{BotState, Command, parse_genlink};
use super::telegram::TelegramModerator;
use crate::approval::JoinRequest;
use crate::token::{deep_link, encode_request_token};
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::payloads::CreateChatInviteLinkSetters;
use teloxide::types::{ChatId, ChatJoinRequest};
use tracing::{debug, warn};

const NOT_AUTHORIZED: &str = "You are not authorized to use this command.";

pub async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
    state: Arc<BotState>,
) -> ResponseResult<()> {
    let Some(user) = msg.from.as_ref() else {
        return Ok(());
    };
    let user_id = user.id.0 as i64;

    if cmd.requires_admin() && !state.is_authorized(user_id).await {
        debug!(user_id, ?cmd, "Rejected admin command");
        bot.send_message(msg.chat.id, NOT_AUTHORIZED).await?;
        return Ok(());
    }

    let reply = match cmd {
        Command::Genlink(arg) => genlink(&bot, &state, &arg).await,
        other => state.execute(other, user_id).await,
    };
    bot.send_message(msg.chat.id, reply).await?;
    Ok(())
}

/// Creates an invite link for a channel and replies with a deep link that
/// resolves to it.
async fn genlink(bot: &Bot, state: &BotState, arg: &str) -> String {
    let (channel_id, is_request) = match parse_genlink(arg) {
        Ok(parsed) => parsed,
        Err(e) => return e.to_string(),
    };

    let link = if is_request {
        bot.create_chat_invite_link(ChatId(channel_id))
            .creates_join_request(true)
            .await
            .map(|invite| invite.invite_link)
    } else {
        bot.export_chat_invite_link(ChatId(channel_id)).await
    };
    let link = match link {
        Ok(link) => link,
        Err(e) => {
            warn!(channel_id, error = %e, "Could not create invite link");
            return format!(
                "Could not create an invite link for {channel_id}. Is the bot an admin there?"
            );
        }
    };

    let db = &state.db;
    if db.get_original_link(channel_id).await.is_none() {
        db.set_original_link(channel_id, &link).await;
    }
    if !db.save_invite_link(channel_id, &link, is_request).await {
        return format!("Failed to save the invite link for {channel_id}.");
    }

    let token = if is_request {
        db.save_encoded_link2(channel_id, &encode_request_token(channel_id))
            .await
    } else {
        db.save_encoded_link(channel_id).await
    };
    match token {
        Some(token) => {
            let link = deep_link(&state.bot_username, &token);
            format!("Share this link: {link}")
        }
        None => format!("Failed to save the link token for {channel_id}."),
    }
}

/// Hands a join request to the approver on its own task, so the delay does
/// not hold up other updates.
pub async fn handle_join_request(
    bot: Bot,
    request: ChatJoinRequest,
    state: Arc<BotState>,
) -> ResponseResult<()> {
    let join = JoinRequest {
        chat_id: request.chat.id.0,
        chat_title: request.chat.title().unwrap_or_default().to_string(),
        user_id: request.from.id.0 as i64,
        user_name: request.from.full_name(),
    };
    let approver = Arc::clone(&state.approver);
    let moderator = TelegramModerator::new(bot);

    tokio::spawn(async move {
        let outcome = approver.process(&join, &moderator).await;
        debug!(
            chat_id = join.chat_id,
            user_id = join.user_id,
            ?outcome,
            "Join request processed"
        );
    });
    Ok(())
}
