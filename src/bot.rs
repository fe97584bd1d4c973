use std::sync::Arc;

use anyhow::Result;
use teloxide::types::{
    CallbackQuery, ChatId, Message, MessageId, ParseMode, Update, UpdateKind,
};
use tracing::{debug, error, info};

use crate::format::{self, CallbackAction, SongReply};
use crate::platform::Messenger;
use crate::songs::{Song, SongApiClient};

/// Songs sent per search; the rest of the API response is dropped silently.
pub const MAX_RESULTS: usize = 5;

const GREETING: &str = "Hello! I am QuantXsongs Bot. Send me a song name to search for it, \
     and I'll provide streaming links, download options, and lyrics.";

const HELP: &str = "Commands:\n\
     /start - Start the bot\n\
     /help - Show this help message\n\n\
     How to use:\n\
     1. Send me any song name\n\
     2. Listen to the results right here in the chat\n\
     3. Tap \"Get Lyrics\" under a song for its lyrics\n\n\
     Tip: include the artist name for more accurate results.";

const SEARCH_FAILED: &str =
    "Sorry, I couldn't fetch any songs at the moment. Please try again later.";
const FETCHING_LYRICS: &str = "Fetching lyrics... Please wait.";
const LYRICS_NOT_FOUND: &str = "Sorry, lyrics not found for this song.";
const UNKNOWN_ACTION: &str = "Unknown action.";

/// Process-lifetime state, built once in `main` and shared by every webhook call.
pub struct AppState {
    messenger: Arc<dyn Messenger>,
    songs: SongApiClient,
}

impl AppState {
    pub fn new(messenger: Arc<dyn Messenger>, songs: SongApiClient) -> Self {
        Self { messenger, songs }
    }
}

/// Handle one update to completion. Every outbound call is awaited in order.
pub async fn dispatch(state: &AppState, update: Update) -> Result<()> {
    match update.kind {
        UpdateKind::Message(msg) => handle_message(state, &msg).await,
        UpdateKind::CallbackQuery(query) => handle_callback_query(state, query).await,
        _ => {
            debug!("Unhandled update: {:?}", update.id);
            Ok(())
        }
    }
}

/// `/name args` or `/name@bot args` → `name`.
fn command_name(text: &str) -> Option<&str> {
    let rest = text.strip_prefix('/')?;
    let token = rest.split_whitespace().next().unwrap_or_default();
    token.split('@').next()
}

async fn handle_message(state: &AppState, msg: &Message) -> Result<()> {
    let text = match msg.text() {
        Some(t) => t,
        None => return Ok(()),
    };

    match command_name(text) {
        Some("start") => {
            state
                .messenger
                .send_text(msg.chat.id, GREETING, None, &[])
                .await
        }
        Some("help") => state.messenger.send_text(msg.chat.id, HELP, None, &[]).await,
        Some(other) => {
            debug!("Ignoring unknown command /{}", other);
            Ok(())
        }
        None => search_songs(state, msg.chat.id, text).await,
    }
}

async fn search_songs(state: &AppState, chat_id: ChatId, query: &str) -> Result<()> {
    info!("Received search query: '{}' in chat {}", query, chat_id.0);

    state
        .messenger
        .send_text(
            chat_id,
            &format!("Searching for '{query}'... Please wait, this might take a moment."),
            None,
            &[],
        )
        .await?;

    state.messenger.typing(chat_id).await.ok();

    let songs = match state.songs.search(query).await {
        Some(songs) => songs,
        None => {
            return state
                .messenger
                .send_text(chat_id, SEARCH_FAILED, None, &[])
                .await;
        }
    };

    if songs.is_empty() {
        return state
            .messenger
            .send_text(
                chat_id,
                &format!("No songs found for '{query}'. Please try a different search term."),
                None,
                &[],
            )
            .await;
    }

    for song in songs.iter().take(MAX_RESULTS) {
        send_song(state.messenger.as_ref(), chat_id, song).await?;
    }

    Ok(())
}

/// Exactly one message per song: audio, or text when audio is unavailable or refused.
async fn send_song(messenger: &dyn Messenger, chat_id: ChatId, song: &Song) -> Result<()> {
    match format::render(song) {
        SongReply::Status(text) | SongReply::Warning(text) => {
            messenger
                .send_text(chat_id, &text, Some(ParseMode::MarkdownV2), &[])
                .await
        }
        SongReply::Audio(card) => {
            if let Err(e) = messenger.send_audio(chat_id, &card).await {
                error!("Failed to send audio for {}: {:#}", card.title, e);
                messenger
                    .send_text(
                        chat_id,
                        &card.fallback_text(),
                        Some(ParseMode::MarkdownV2),
                        &card.buttons,
                    )
                    .await?;
            }
            Ok(())
        }
    }
}

async fn handle_callback_query(state: &AppState, query: CallbackQuery) -> Result<()> {
    // Always acknowledge first so the client stops showing the spinner.
    state.messenger.answer_callback(query.id.clone()).await?;

    let data = query.data.as_deref().unwrap_or_default();
    info!("Received callback data: {}", data);

    let Some(message) = query.message.as_ref() else {
        debug!("Callback query without an attached message, nothing to edit");
        return Ok(());
    };

    handle_callback_data(state, message.chat().id, message.id(), data).await
}

async fn handle_callback_data(
    state: &AppState,
    chat_id: ChatId,
    message_id: MessageId,
    data: &str,
) -> Result<()> {
    let song_id = match format::parse_callback(data) {
        CallbackAction::Lyrics(id) => id,
        CallbackAction::Unknown => {
            return state
                .messenger
                .edit_text(chat_id, message_id, UNKNOWN_ACTION)
                .await;
        }
    };

    state
        .messenger
        .edit_text(chat_id, message_id, FETCHING_LYRICS)
        .await?;

    let lyrics = state.songs.lyrics(&song_id).await;
    let text = match lyrics.as_ref().and_then(|l| l.text()) {
        Some(text) => format::lyrics_message(text),
        None => LYRICS_NOT_FOUND.to_string(),
    };

    state.messenger.edit_text(chat_id, message_id, &text).await
}
