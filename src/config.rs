use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::{error, info};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct TelegramConfig {
    /// Usually supplied through TELEGRAM_BOT_TOKEN rather than the file
    #[serde(default)]
    pub bot_token: String,
    /// Public URL Telegram should deliver updates to (used by `set-webhook`)
    #[serde(default)]
    pub webhook_url: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    #[serde(default = "default_api_base_url")]
    pub base_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_base_url(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_api_base_url() -> String {
    "https://airsongsapi.vercel.app".to_string()
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

impl Config {
    /// Load the optional TOML file, then apply environment overrides.
    /// A missing file falls back to defaults; a malformed one is an error.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            Self::parse(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?
        } else {
            info!("No config file at {}, using defaults", path.display());
            Config::default()
        };

        config.apply_overrides(|key| std::env::var(key).ok());

        if config.telegram.bot_token.is_empty() {
            // The webhook still comes up, but every Telegram call will be rejected.
            error!("TELEGRAM_BOT_TOKEN environment variable not set.");
        }

        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(content)?;
        config.normalize();
        Ok(config)
    }

    /// Environment wins over the file. `var` is the lookup, injected for tests.
    pub fn apply_overrides<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = var("TELEGRAM_BOT_TOKEN").filter(|t| !t.trim().is_empty()) {
            self.telegram.bot_token = token.trim().to_string();
        }
        if let Some(url) = var("WEBHOOK_URL").filter(|u| !u.trim().is_empty()) {
            self.telegram.webhook_url = Some(url.trim().to_string());
        }
        if let Some(port) = var("PORT").and_then(|p| p.trim().parse::<u16>().ok()) {
            self.server.bind = format!("0.0.0.0:{port}");
        }
        self.normalize();
    }

    fn normalize(&mut self) {
        let trimmed = self.api.base_url.trim().trim_end_matches('/');
        self.api.base_url = if trimmed.is_empty() {
            default_api_base_url()
        } else {
            trimmed.to_string()
        };
    }
}
