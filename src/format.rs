//! Turns song records into chat-ready text and button layouts.
//!
//! Everything here is pure so the dispatcher can stay a thin sequence of
//! sends. Song text is Telegram MarkdownV2 with every dynamic field escaped.

use std::borrow::Cow;

use teloxide::utils::markdown::{bold, escape, link};

use crate::songs::Song;

/// Telegram rejects texts longer than this.
pub const MESSAGE_LIMIT: usize = 4096;
/// How much lyrics text survives when the limit is exceeded.
pub const LYRICS_KEEP: usize = 4000;
pub const LYRICS_TRUNCATED_SUFFIX: &str =
    "\n\n... (lyrics truncated due to Telegram message limit)";

pub const LYRICS_PREFIX: &str = "lyrics_";

/// Inline button, independent of the chat platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Button {
    Callback { label: String, data: String },
    Link { label: String, url: String },
}

/// A playable song: the audio is sent by URL reference and fetched by the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioCard {
    pub audio_url: String,
    pub thumbnail_url: Option<String>,
    pub performer: String,
    pub title: String,
    pub caption: String,
    pub status: String,
    pub buttons: Vec<Button>,
}

impl AudioCard {
    /// Text used when the platform refuses the audio reference.
    pub fn fallback_text(&self) -> String {
        format!(
            "{}\n🔗 {}\n{}",
            self.caption,
            link(&self.audio_url, &escape("Listen/Download Here")),
            escape(&format!(
                "⚠️ Could not send audio directly, but here's the link. Status: {}",
                self.status
            )),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SongReply {
    /// Flagged unavailable by the API; text only, no buttons.
    Status(String),
    /// No media URL at all; text only, no buttons.
    Warning(String),
    Audio(AudioCard),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackAction {
    Lyrics(String),
    Unknown,
}

pub fn render(song: &Song) -> SongReply {
    let caption = caption(song);

    if song.is_disabled() {
        return SongReply::Status(format!(
            "{}\n{}",
            caption,
            escape(&format!(
                "🚫 Status: {} (Streaming/Download not available)",
                song.disabled_reason()
            ))
        ));
    }

    let Some(audio_url) = song.audio_url() else {
        return SongReply::Warning(format!(
            "{}\n{}",
            caption,
            escape("⚠️ No playable audio found for this song.")
        ));
    };

    SongReply::Audio(AudioCard {
        audio_url: audio_url.to_string(),
        thumbnail_url: song.image_url.clone(),
        performer: song.artists().to_string(),
        title: song.title().to_string(),
        caption,
        status: song
            .disabled_text
            .clone()
            .unwrap_or_else(|| "Available".to_string()),
        buttons: buttons(song),
    })
}

fn caption(song: &Song) -> String {
    format!(
        "🎶 {} by {}\n💿 Album: {}\n⏳ Duration: {}",
        bold(&escape(song.title())),
        escape(song.artists()),
        escape(song.album()),
        format_duration(song.duration),
    )
}

fn buttons(song: &Song) -> Vec<Button> {
    let mut row = Vec::new();
    if let Some(id) = &song.id {
        row.push(Button::Callback {
            label: "Get Lyrics".to_string(),
            data: format!("{LYRICS_PREFIX}{id}"),
        });
    }
    if let Some(url) = &song.permalink {
        row.push(Button::Link {
            label: "View on JioSaavn".to_string(),
            url: url.clone(),
        });
    }
    row
}

/// `m:ss`, minutes unbounded.
pub fn format_duration(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Cut lyrics that would not fit in one message. Counts chars, not bytes.
pub fn truncate_lyrics(text: &str) -> Cow<'_, str> {
    if text.chars().count() <= MESSAGE_LIMIT {
        return Cow::Borrowed(text);
    }
    let mut cut: String = text.chars().take(LYRICS_KEEP).collect();
    cut.push_str(LYRICS_TRUNCATED_SUFFIX);
    Cow::Owned(cut)
}

const LYRICS_HEADER: &str = "📜 Lyrics:\n\n";

/// Plain text (no parse mode) so arbitrary lyrics never break markup.
/// Lyrics up to the limit pass through whole, so the header is left off when
/// it would push the message over.
pub fn lyrics_message(text: &str) -> String {
    let body = truncate_lyrics(text);
    if LYRICS_HEADER.chars().count() + body.chars().count() > MESSAGE_LIMIT {
        return body.into_owned();
    }
    format!("{LYRICS_HEADER}{body}")
}

/// The id is the text between the first and second underscore. An id that
/// itself contains `_` is therefore cut short (`lyrics_4_2` yields `4`).
pub fn parse_callback(data: &str) -> CallbackAction {
    if !data.starts_with(LYRICS_PREFIX) {
        return CallbackAction::Unknown;
    }
    let id = data.split('_').nth(1).unwrap_or_default();
    CallbackAction::Lyrics(id.to_string())
}
