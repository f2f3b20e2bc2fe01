//! Telegram wiring for the link-sharing bot.
//!
//! - [`commands`] - command set, argument parsing, database-only replies
//! - [`handlers`] - dispatcher endpoints for commands and join requests
//! - [`telegram`] - Bot API implementations of the store and approval seams

pub mod commands;
pub mod handlers;
pub mod telegram;

use crate::approval::{ApprovalSettings, JoinRequestApprover};
use crate::config::Config;
use crate::database::Database;
use crate::store::select_store;
use anyhow::{Context, Result};
use commands::{BotState, Command};
use std::sync::Arc;
use telegram::TelegramConnector;
use teloxide::prelude::*;
use tracing::{info, warn};

/// Starts the bot and runs until interrupted.
///
/// # Errors
///
/// Returns an error if no bot token is configured or the token is rejected.
/// Storage problems never stop the bot. An unusable storage channel is
/// detected here at startup and the bot falls back to memory.
pub async fn run(config: Config) -> Result<()> {
    for warning in config.validate().warnings {
        warn!("{warning}");
    }
    anyhow::ensure!(
        !config.bot.token.trim().is_empty(),
        "TG_BOT_TOKEN is required to run the bot"
    );

    let bot = Bot::new(&config.bot.token);
    let me = bot.get_me().await.context("Failed to authenticate bot")?;
    let bot_username = me.user.username.clone().unwrap_or_default();

    let selection = select_store(
        &config.storage,
        &config.bot.token,
        Arc::new(TelegramConnector::new(bot.clone(), config.storage.channel_id)),
    )
    .await;
    let db = Arc::new(Database::new(selection.store));

    let settings = Arc::new(ApprovalSettings::from_config(&config.approval));
    let approver = Arc::new(JoinRequestApprover::new(settings, Arc::clone(&db)));
    let state = Arc::new(BotState {
        db,
        approver,
        configured_admins: config.configured_admins(),
        bot_username,
    });

    info!(
        bot = %state.bot_username,
        backend = ?selection.kind,
        "Bot started"
    );

    let handler = dptree::entry()
        .branch(
            Update::filter_message()
                .filter_command::<Command>()
                .endpoint(handlers::handle_command),
        )
        .branch(
            Update::filter_chat_join_request().endpoint(handlers::handle_join_request),
        );

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    info!("Bot stopped");
    Ok(())
}
