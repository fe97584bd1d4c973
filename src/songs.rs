use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::{error, info};

const NOT_AVAILABLE: &str = "N/A";
const DEFAULT_DISABLED_REASON: &str = "Pro Only";

/// One track as returned by the song search API.
///
/// The API is loosely typed (ids and durations arrive as strings or numbers),
/// so scalars are normalised on the way in and absent values are substituted
/// by the accessors below. Booleans are not strings and read as absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Song {
    #[serde(default, deserialize_with = "loose_string")]
    pub id: Option<String>,
    #[serde(default, rename = "song", deserialize_with = "loose_string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    pub primary_artists: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    pub album: Option<String>,
    #[serde(default, deserialize_with = "loose_seconds")]
    pub duration: u64,
    #[serde(default, deserialize_with = "loose_string")]
    pub media_url: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    pub media_preview_url: Option<String>,
    #[serde(default, rename = "image", deserialize_with = "loose_string")]
    pub image_url: Option<String>,
    #[serde(default, rename = "perma_url", deserialize_with = "loose_string")]
    pub permalink: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    pub disabled: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    pub disabled_text: Option<String>,
}

impl Song {
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or(NOT_AVAILABLE)
    }

    pub fn artists(&self) -> &str {
        self.primary_artists.as_deref().unwrap_or(NOT_AVAILABLE)
    }

    pub fn album(&self) -> &str {
        self.album.as_deref().unwrap_or(NOT_AVAILABLE)
    }

    /// Only the literal string "true" marks a song as unavailable.
    pub fn is_disabled(&self) -> bool {
        self.disabled.as_deref() == Some("true")
    }

    pub fn disabled_reason(&self) -> &str {
        self.disabled_text.as_deref().unwrap_or(DEFAULT_DISABLED_REASON)
    }

    /// Full-length media first, then the preview clip.
    pub fn audio_url(&self) -> Option<&str> {
        self.media_url
            .as_deref()
            .or(self.media_preview_url.as_deref())
    }
}

/// Response of the lyrics endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Lyrics {
    #[serde(default, deserialize_with = "loose_string")]
    lyrics: Option<String>,
    #[serde(default)]
    data: Option<LyricsData>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct LyricsData {
    #[serde(default, deserialize_with = "loose_string")]
    lyrics: Option<String>,
}

impl Lyrics {
    /// The lyrics text, if the response carried a non-empty one.
    pub fn text(&self) -> Option<&str> {
        self.lyrics
            .as_deref()
            .or_else(|| self.data.as_ref().and_then(|d| d.lyrics.as_deref()))
    }
}

/// Thin wrapper over the song search API. Failures are logged and collapse
/// to `None`; callers decide what to tell the user.
pub struct SongApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl SongApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn search(&self, query: &str) -> Option<Vec<Song>> {
        let url = format!(
            "{}/result/?query={}",
            self.base_url,
            urlencoding::encode(query)
        );
        info!("Fetching songs from: {}", url);

        match self.get_json(&url).await {
            Ok(songs) => Some(songs),
            Err(e) => {
                error!("Error fetching songs from API: {:#}", e);
                None
            }
        }
    }

    pub async fn lyrics(&self, song_id: &str) -> Option<Lyrics> {
        let url = format!(
            "{}/lyrics/?query={}",
            self.base_url,
            urlencoding::encode(song_id)
        );
        info!("Fetching lyrics from: {}", url);

        match self.get_json(&url).await {
            Ok(lyrics) => Some(lyrics),
            Err(e) => {
                error!("Error fetching lyrics from API: {:#}", e);
                None
            }
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to send request to song API")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Song API error ({}): {}", status, body);
        }

        response
            .json()
            .await
            .context("Failed to parse song API response")
    }
}

fn loose_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn loose_seconds<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let seconds = match value {
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Some(Value::String(s)) => {
            let s = s.trim();
            s.parse::<u64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().filter(|f| *f >= 0.0).map(|f| f as u64))
        }
        _ => None,
    };
    Ok(seconds.unwrap_or(0))
}
