use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Url;
use teloxide::prelude::*;
use teloxide::types::{
    CallbackQueryId, ChatAction, InlineKeyboardButton, InlineKeyboardMarkup, InputFile, MessageId,
    ParseMode,
};
use tracing::warn;

use crate::format::{AudioCard, Button};
use crate::platform::Messenger;

/// [`Messenger`] backed by the Telegram Bot API.
pub struct TelegramMessenger {
    bot: Bot,
}

impl TelegramMessenger {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

/// One inline row. Link buttons with an unparseable URL are dropped.
fn keyboard(buttons: &[Button]) -> Option<InlineKeyboardMarkup> {
    let row: Vec<InlineKeyboardButton> = buttons
        .iter()
        .filter_map(|button| match button {
            Button::Callback { label, data } => {
                Some(InlineKeyboardButton::callback(label.clone(), data.clone()))
            }
            Button::Link { label, url } => match Url::parse(url) {
                Ok(url) => Some(InlineKeyboardButton::url(label.clone(), url)),
                Err(e) => {
                    warn!("Dropping link button with bad URL {}: {}", url, e);
                    None
                }
            },
        })
        .collect();

    if row.is_empty() {
        None
    } else {
        Some(InlineKeyboardMarkup::new(vec![row]))
    }
}

#[async_trait]
impl Messenger for TelegramMessenger {
    async fn send_text(
        &self,
        chat_id: ChatId,
        text: &str,
        parse_mode: Option<ParseMode>,
        buttons: &[Button],
    ) -> Result<()> {
        let mut request = self.bot.send_message(chat_id, text);
        if let Some(mode) = parse_mode {
            request = request.parse_mode(mode);
        }
        if let Some(markup) = keyboard(buttons) {
            request = request.reply_markup(markup);
        }
        request.await.context("Failed to send message")?;
        Ok(())
    }

    async fn send_audio(&self, chat_id: ChatId, card: &AudioCard) -> Result<()> {
        let audio = Url::parse(&card.audio_url)
            .with_context(|| format!("Invalid audio URL: {}", card.audio_url))?;

        let mut request = self
            .bot
            .send_audio(chat_id, InputFile::url(audio))
            .caption(card.caption.clone())
            .parse_mode(ParseMode::MarkdownV2)
            .performer(card.performer.clone())
            .title(card.title.clone());

        // Telegram fetches the thumbnail itself; a bad URL just means no thumbnail.
        if let Some(thumbnail) = card
            .thumbnail_url
            .as_deref()
            .and_then(|url| Url::parse(url).ok())
        {
            request = request.thumbnail(InputFile::url(thumbnail));
        }
        if let Some(markup) = keyboard(&card.buttons) {
            request = request.reply_markup(markup);
        }

        request.await.context("Failed to send audio")?;
        Ok(())
    }

    async fn edit_text(&self, chat_id: ChatId, message_id: MessageId, text: &str) -> Result<()> {
        self.bot
            .edit_message_text(chat_id, message_id, text)
            .await
            .context("Failed to edit message")?;
        Ok(())
    }

    async fn answer_callback(&self, id: CallbackQueryId) -> Result<()> {
        self.bot
            .answer_callback_query(id)
            .await
            .context("Failed to answer callback query")?;
        Ok(())
    }

    async fn typing(&self, chat_id: ChatId) -> Result<()> {
        self.bot
            .send_chat_action(chat_id, ChatAction::Typing)
            .await
            .context("Failed to send chat action")?;
        Ok(())
    }
}
