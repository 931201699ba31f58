//! Client configuration.
//!
//! Defaults reproduce the public endpoint's expectations. Every field can be
//! overridden from a YAML file or from `VIET_TTS_*` environment variables.

use crate::playback::PlaybackConfig;
use crate::{Error, ErrorContext, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://translate.google.com/translate_tts";
pub const DEFAULT_PROBE_URL: &str = "https://www.google.com";
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_probe_url() -> String {
    DEFAULT_PROBE_URL.to_string()
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_language() -> String {
    "vi".to_string()
}

fn default_client_id() -> String {
    "tw-ob".to_string()
}

fn default_probe_timeout_ms() -> u64 {
    5_000
}

fn default_fetch_timeout_ms() -> u64 {
    10_000
}

fn default_max_chars() -> usize {
    200
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TtsConfig {
    /// TTS endpoint receiving the `ie`/`q`/`tl`/`client` query.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Host checked once at construction.
    #[serde(default = "default_probe_url")]
    pub probe_url: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Target language code sent as `tl`.
    #[serde(default = "default_language")]
    pub language: String,
    /// Client identifier sent as `client`.
    #[serde(default = "default_client_id")]
    pub client_id: String,
    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,
    #[serde(default = "default_fetch_timeout_ms")]
    pub fetch_timeout_ms: u64,
    /// Normalized texts longer than this (in characters) are split by sentence.
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,
    /// Directory for segment scratch files; the OS temp dir when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temp_dir: Option<PathBuf>,
    #[serde(default)]
    pub playback: PlaybackConfig,
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            probe_url: default_probe_url(),
            user_agent: default_user_agent(),
            language: default_language(),
            client_id: default_client_id(),
            probe_timeout_ms: default_probe_timeout_ms(),
            fetch_timeout_ms: default_fetch_timeout_ms(),
            max_chars: default_max_chars(),
            temp_dir: None,
            playback: PlaybackConfig::default(),
        }
    }
}

impl TtsConfig {
    /// Defaults with environment overrides applied.
    ///
    /// - `VIET_TTS_BASE_URL`, `VIET_TTS_PROBE_URL`
    /// - `VIET_TTS_PROBE_TIMEOUT_SECS` (default 5), `VIET_TTS_FETCH_TIMEOUT_SECS` (default 10)
    /// - `VIET_TTS_MAX_CHARS` (default 200)
    /// - `VIET_TTS_TEMP_DIR`, `VIET_TTS_PLAYER`
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var("VIET_TTS_BASE_URL") {
            self.base_url = url;
        }
        if let Ok(url) = std::env::var("VIET_TTS_PROBE_URL") {
            self.probe_url = url;
        }
        if let Some(secs) = env_parse::<u64>("VIET_TTS_PROBE_TIMEOUT_SECS") {
            self.probe_timeout_ms = secs.saturating_mul(1_000);
        }
        if let Some(secs) = env_parse::<u64>("VIET_TTS_FETCH_TIMEOUT_SECS") {
            self.fetch_timeout_ms = secs.saturating_mul(1_000);
        }
        if let Some(n) = env_parse::<usize>("VIET_TTS_MAX_CHARS") {
            self.max_chars = n;
        }
        if let Ok(dir) = std::env::var("VIET_TTS_TEMP_DIR") {
            self.temp_dir = Some(PathBuf::from(dir));
        }
        if let Ok(player) = std::env::var("VIET_TTS_PLAYER") {
            self.playback.player = Some(player);
        }
        self
    }

    /// Load from a YAML file; missing keys keep their defaults.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&raw).map_err(|e| match e {
            Error::Configuration { message, context } => Error::Configuration {
                message,
                context: context.with_details(path.display().to_string()),
            },
            other => other,
        })
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self> {
        let cfg: TtsConfig = serde_yaml::from_str(raw).map_err(|e| {
            Error::configuration_with_context(
                format!("invalid YAML: {}", e),
                ErrorContext::new().with_source("config"),
            )
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        for (field, value) in [("base_url", &self.base_url), ("probe_url", &self.probe_url)] {
            url::Url::parse(value).map_err(|e| {
                Error::configuration_with_context(
                    format!("invalid URL '{}': {}", value, e),
                    ErrorContext::new()
                        .with_field_path(field)
                        .with_source("config"),
                )
            })?;
        }
        if self.max_chars == 0 {
            return Err(Error::configuration_with_context(
                "chunk threshold must be positive",
                ErrorContext::new()
                    .with_field_path("max_chars")
                    .with_source("config"),
            ));
        }
        if self.language.trim().is_empty() {
            return Err(Error::configuration_with_context(
                "language must not be empty",
                ErrorContext::new()
                    .with_field_path("language")
                    .with_source("config"),
            ));
        }
        Ok(())
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_probe_url(mut self, url: impl Into<String>) -> Self {
        self.probe_url = url.into();
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn with_max_chars(mut self, max_chars: usize) -> Self {
        self.max_chars = max_chars;
        self
    }

    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    pub fn with_playback(mut self, playback: PlaybackConfig) -> Self {
        self.playback = playback;
        self
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    pub fn scratch_dir(&self) -> PathBuf {
        self.temp_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.parse::<T>().ok())
}
