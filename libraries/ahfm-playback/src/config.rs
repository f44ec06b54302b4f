//! Playback configuration

use crate::error::{PlaybackError, Result};
use serde::{Deserialize, Serialize};
use url::Url;

/// The one stream this player knows about
pub const DEFAULT_STREAM_ADDRESS: &str = "http://us.ah.fm:443";

/// Configuration for the playback controller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Stream endpoint the engine is bound to
    #[serde(default = "default_stream_address")]
    pub stream_address: String,

    /// Content of the background notification
    #[serde(default)]
    pub notification: NotificationSettings,
}

/// Text shown in the background notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationSettings {
    #[serde(default = "default_title")]
    pub title: String,

    #[serde(default = "default_text")]
    pub text: String,
}

impl PlaybackConfig {
    /// Check that the stream address is a usable http(s) URL
    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.stream_address).map_err(|e| {
            PlaybackError::Config(format!(
                "Invalid stream address '{}': {}",
                self.stream_address, e
            ))
        })?;

        match url.scheme() {
            "http" | "https" => {}
            other => {
                return Err(PlaybackError::Config(format!(
                    "Unsupported stream scheme '{}' (expected http or https)",
                    other
                )))
            }
        }

        if url.host_str().is_none() {
            return Err(PlaybackError::Config(format!(
                "Stream address '{}' has no host",
                self.stream_address
            )));
        }

        Ok(())
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            stream_address: default_stream_address(),
            notification: NotificationSettings::default(),
        }
    }
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            title: default_title(),
            text: default_text(),
        }
    }
}

fn default_stream_address() -> String {
    DEFAULT_STREAM_ADDRESS.to_string()
}

fn default_title() -> String {
    "AHFM".to_string()
}

fn default_text() -> String {
    "Listening to AH.FM".to_string()
}
