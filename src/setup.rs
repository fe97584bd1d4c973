//! `songbot set-webhook`: point Telegram at the deployed webhook URL.

use anyhow::{Context, Result};
use reqwest::Url;
use teloxide::prelude::*;
use tracing::info;

use crate::config::Config;

/// Validate the config and return the URL Telegram should deliver to.
fn webhook_target(config: &Config) -> Result<Url> {
    if config.telegram.bot_token.is_empty() {
        anyhow::bail!("TELEGRAM_BOT_TOKEN is required to register the webhook");
    }
    let url = config
        .telegram
        .webhook_url
        .as_deref()
        .context("Please set WEBHOOK_URL environment variable")?;
    Url::parse(url).with_context(|| format!("Invalid webhook URL: {url}"))
}

pub async fn set_webhook(bot: &Bot, config: &Config) -> Result<()> {
    let url = webhook_target(config)?;

    bot.set_webhook(url.clone())
        .await
        .with_context(|| format!("Failed to set webhook to {url}"))?;

    info!("Webhook set successfully: {}", url);
    Ok(())
}
