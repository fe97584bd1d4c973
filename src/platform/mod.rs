pub mod telegram;

use anyhow::Result;
use async_trait::async_trait;
use teloxide::types::{CallbackQueryId, ChatId, MessageId, ParseMode};

use crate::format::{AudioCard, Button};

/// Outbound chat actions the bot needs. The Telegram implementation lives in
/// [`telegram::TelegramMessenger`]; handlers only see this trait.
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Send a text message, parsed with `parse_mode` when given.
    async fn send_text(
        &self,
        chat_id: ChatId,
        text: &str,
        parse_mode: Option<ParseMode>,
        buttons: &[Button],
    ) -> Result<()>;

    /// Send audio by URL reference with caption, metadata and buttons.
    async fn send_audio(&self, chat_id: ChatId, card: &AudioCard) -> Result<()>;

    /// Replace the text of a message the bot sent earlier (plain text).
    async fn edit_text(&self, chat_id: ChatId, message_id: MessageId, text: &str) -> Result<()>;

    /// Clear the loading indicator on the pressed button.
    async fn answer_callback(&self, id: CallbackQueryId) -> Result<()>;

    /// Best-effort "typing..." indicator.
    async fn typing(&self, chat_id: ChatId) -> Result<()>;
}
