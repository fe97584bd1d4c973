mod bot;
mod config;
mod format;
mod platform;
mod setup;
mod songs;
mod webhook;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use teloxide::Bot;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::bot::AppState;
use crate::config::Config;
use crate::platform::telegram::TelegramMessenger;
use crate::songs::SongApiClient;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,songbot=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // songbot [set-webhook] [config.toml]
    let mut args = std::env::args().skip(1).peekable();
    let register_webhook = args.next_if(|arg| arg == "set-webhook").is_some();
    let config_path = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config.toml"));

    info!("Loading configuration from: {}", config_path.display());
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    let bot = Bot::new(&config.telegram.bot_token);

    if register_webhook {
        return setup::set_webhook(&bot, &config).await;
    }

    info!("Configuration loaded successfully");
    info!("  Song API: {}", config.api.base_url);
    info!("  Bind: {}", config.server.bind);

    // Built once, shared read-only by every webhook invocation.
    let state = Arc::new(AppState::new(
        Arc::new(TelegramMessenger::new(bot)),
        SongApiClient::new(&config.api.base_url),
    ));

    info!("Bot is starting...");
    webhook::serve(&config.server.bind, state).await
}
