//! `linkshare` command-line entry point.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use linkshare::config::{Config, StorageMode};
use linkshare::token::{decode_channel_token, encode_channel_id};
use linkshare::{bot, logging};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "linkshare", version, about = "Channel link-sharing Telegram bot")]
struct Cli {
    /// Path to a TOML config file (default: ./linkshare.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the bot until interrupted
    Run,
    /// Load and validate configuration, then report the storage backend
    Check,
    /// Print the share token for a channel id
    Encode {
        #[arg(allow_hyphen_values = true)]
        channel_id: i64,
    },
    /// Print the channel id behind a share token
    Decode { token: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run => {
            let config = Config::load(cli.config.as_deref())?;
            logging::init(&config.logging);
            bot::run(config).await
        }
        Commands::Check => {
            let config = Config::load(cli.config.as_deref())?;
            let result = config.validate();
            println!("storage mode: {}", config.storage.mode.as_str());
            if config.storage.mode == StorageMode::ChannelLogs {
                println!("storage channel: {}", config.storage.channel_id);
            }
            println!(
                "approval: enabled={} wait={}s",
                config.approval.enabled, config.approval.wait_secs
            );
            for warning in &result.warnings {
                println!("warning: {warning}");
            }
            if result.has_warnings() {
                println!("{} warning(s)", result.warnings.len());
            } else {
                println!("configuration OK");
            }
            Ok(())
        }
        Commands::Encode { channel_id } => {
            println!("{}", encode_channel_id(channel_id));
            Ok(())
        }
        Commands::Decode { token } => {
            let channel_id = decode_channel_token(&token)
                .with_context(|| format!("Not a channel token: {token}"))?;
            println!("{channel_id}");
            Ok(())
        }
    }
}
