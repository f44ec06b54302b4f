/// Console host configuration
use ahfm_playback::{PlaybackConfig, PlaybackError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file, read from the working directory when present
pub const DEFAULT_CONFIG_FILE: &str = "ahfm.toml";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub playback: PlaybackConfig,

    #[serde(default)]
    pub engine: EngineSettings,
}

/// Behaviour of the simulated engine
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EngineSettings {
    /// How long buffering takes before the engine reports ready
    #[serde(default = "default_prepare_delay_ms")]
    pub prepare_delay_ms: u64,

    /// Report a failure instead of readiness
    #[serde(default)]
    pub fail_prepare: bool,
}

impl AppConfig {
    /// Load configuration from a file and the environment
    ///
    /// Uses `path` if given (it must exist), else `ahfm.toml` if present.
    /// Environment variables prefixed with `AHFM_` override the file, with
    /// `__` between nesting levels, e.g. `AHFM_PLAYBACK__STREAM_ADDRESS`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                settings = settings.add_source(config::File::from(path).required(true));
            }
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        settings = settings.add_source(
            config::Environment::with_prefix("AHFM")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: AppConfig = settings
            .build()
            .map_err(|e| PlaybackError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| PlaybackError::Config(e.to_string()))?;

        config.playback.validate()?;
        Ok(config)
    }
}

fn default_prepare_delay_ms() -> u64 {
    800
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            prepare_delay_ms: default_prepare_delay_ms(),
            fail_prepare: false,
        }
    }
}
