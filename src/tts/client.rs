//! TTS (Text-to-Speech) client.

use super::types::{Dialect, EngineState, SynthesisReport};
use crate::config::TtsConfig;
use crate::playback::{CommandPlayer, Player};
use crate::{audio, text, Error, ErrorContext, Result};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Phrase spoken by [`TtsClient::test_voice`].
pub const TEST_PHRASE: &str = "Xin chào, đây là giọng nói tiếng Việt";

const VOICE_DESCRIPTION: &str = "Vietnamese (Google TTS)";

/// Client for Vietnamese speech synthesis.
///
/// Availability is decided once when the client is built and never changes;
/// every operation on an unavailable client fails before touching the
/// network or the filesystem.
pub struct TtsClient {
    http_client: Client,
    config: TtsConfig,
    state: EngineState,
    player: Box<dyn Player>,
}

impl TtsClient {
    pub fn builder() -> TtsClientBuilder {
        TtsClientBuilder::new()
    }

    /// Build a client from `config`, probing connectivity.
    pub fn connect(config: TtsConfig) -> Result<Self> {
        Self::builder().config(config).build()
    }

    /// Build a client with an injected engine state; no probe is issued.
    pub fn with_state(config: TtsConfig, state: EngineState) -> Result<Self> {
        Self::builder().config(config).state(state).build()
    }

    pub fn is_available(&self) -> bool {
        self.state.is_available()
    }

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    pub fn config(&self) -> &TtsConfig {
        &self.config
    }

    fn ensure_available(&self) -> Result<()> {
        if self.state.is_available() {
            Ok(())
        } else {
            warn!("TTS engine not available");
            Err(Error::NetworkUnavailable)
        }
    }

    /// Synthesize `text` into `output`.
    ///
    /// Text longer than the configured threshold is split on periods; each
    /// segment is fetched on its own and the results are merged in order.
    /// Segments that fail are left out and listed in the report.
    pub fn synthesize_to_file(
        &self,
        text: &str,
        output: impl AsRef<Path>,
        dialect: Dialect,
    ) -> Result<SynthesisReport> {
        self.ensure_available()?;
        let output = output.as_ref();
        let processed = text::preprocess(text);
        if processed.is_empty() {
            return Err(Error::EmptyText);
        }
        let preview: String = processed.chars().take(50).collect();
        info!(%dialect, chars = text::char_len(&processed), "generating audio for: {}...", preview);

        if text::char_len(&processed) <= self.config.max_chars {
            self.fetch_segment(&processed, output)?;
            let format = audio::detect_format(output)?;
            return Ok(SynthesisReport {
                text: processed,
                segments: 1,
                fetched: vec![0],
                dropped: Vec::new(),
                format,
                output: output.to_path_buf(),
            });
        }

        let segments = text::split_sentences(&processed);
        if segments.is_empty() {
            return Err(Error::EmptyText);
        }
        let total = segments.len();
        let run_id = Uuid::new_v4().simple().to_string();
        let scratch = self.config.scratch_dir();
        let mut files = SegmentFiles::default();
        let mut fetched = Vec::new();
        let mut dropped = Vec::new();
        let mut last_error = None;

        for (index, segment) in segments.iter().enumerate() {
            let path = scratch.join(format!("temp_audio_{}_{}.wav", run_id, index));
            match self.fetch_segment(segment, &path) {
                Ok(()) => {
                    files.0.push(path);
                    fetched.push(index);
                }
                Err(e) => {
                    warn!(segment = index, "segment dropped: {}", e);
                    if path.exists() {
                        if let Err(e) = std::fs::remove_file(&path) {
                            debug!(path = %path.display(), "failed to remove temp file: {}", e);
                        }
                    }
                    dropped.push(index);
                    last_error = Some(e);
                }
            }
        }

        if files.0.is_empty() {
            return Err(Error::NoAudio {
                segments: total,
                last: Box::new(last_error.unwrap_or(Error::EmptyText)),
            });
        }

        let format = audio::merge_segments(&files.0, output).map_err(|e| {
            warn!("error merging audio files: {}", e);
            e
        })?;
        if !dropped.is_empty() {
            warn!(
                dropped = ?dropped,
                total,
                "partial synthesis: some segments are missing from the output"
            );
        }

        Ok(SynthesisReport {
            text: processed,
            segments: total,
            fetched,
            dropped,
            format,
            output: output.to_path_buf(),
        })
    }

    /// Fetch one segment and write the response body verbatim to `dest`.
    fn fetch_segment(&self, text: &str, dest: &Path) -> Result<()> {
        let url = reqwest::Url::parse_with_params(
            self.state.base_url(),
            &[
                ("ie", "UTF-8"),
                ("q", text),
                ("tl", self.config.language.as_str()),
                ("client", self.config.client_id.as_str()),
            ],
        )
        .map_err(|e| {
            Error::configuration_with_context(
                format!("invalid endpoint URL: {}", e),
                ErrorContext::new()
                    .with_field_path("base_url")
                    .with_source("fetch"),
            )
        })?;

        let response = self
            .http_client
            .get(url)
            .timeout(self.config.fetch_timeout())
            .send()
            .map_err(|e| {
                let err = Error::request_failed(
                    e.status().map(|s| s.as_u16()),
                    e.to_string(),
                );
                warn!("error generating single audio: {}", err);
                err
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            warn!(status = status.as_u16(), "TTS endpoint rejected request");
            return Err(Error::request_failed(
                Some(status.as_u16()),
                format!("unexpected status {}", status),
            ));
        }

        let body = response.bytes().map_err(|e| {
            Error::request_failed(
                Some(status.as_u16()),
                format!("failed to read TTS response: {}", e),
            )
        })?;
        std::fs::write(dest, &body)?;
        if !dest.exists() {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{} missing after write", dest.display()),
            )));
        }
        info!(bytes = body.len(), "audio generated: {}", dest.display());
        Ok(())
    }

    /// Synthesize `text` and play it.
    ///
    /// Audio goes to a private temporary directory that is removed once
    /// playback returns, so the wait policy of the player decides how much
    /// of the audio is heard.
    pub fn speak(&self, text: &str, dialect: Dialect) -> Result<()> {
        self.ensure_available()?;
        let dir = tempfile::Builder::new()
            .prefix("viet-tts-")
            .tempdir_in(self.config.scratch_dir())?;
        let raw = dir.path().join("speech");
        let report = self.synthesize_to_file(text, &raw, dialect)?;

        // Players pick a decoder from the file extension.
        let playable = dir
            .path()
            .join(format!("speech.{}", report.format.extension()));
        std::fs::rename(&raw, &playable)?;
        self.player.play(&playable)
    }

    /// Speak [`TEST_PHRASE`] with the given dialect.
    pub fn speak_test_phrase(&self, dialect: Dialect) -> Result<()> {
        self.speak(TEST_PHRASE, dialect)
    }

    /// Dialect labels and their descriptions; empty when unavailable.
    ///
    /// The endpoint has one Vietnamese voice, so every label maps to it.
    pub fn available_voices(&self) -> BTreeMap<Dialect, &'static str> {
        if !self.state.is_available() {
            return BTreeMap::new();
        }
        Dialect::ALL
            .iter()
            .map(|d| (*d, VOICE_DESCRIPTION))
            .collect()
    }

    /// Length of a WAV file in seconds; `0.0` when missing, unreadable, or
    /// when the engine is unavailable.
    pub fn audio_duration(&self, path: impl AsRef<Path>) -> f64 {
        if !self.state.is_available() {
            return 0.0;
        }
        let path = path.as_ref();
        if !path.exists() {
            return 0.0;
        }
        match audio::wav_duration(path) {
            Ok(secs) => secs,
            Err(e) => {
                warn!(path = %path.display(), "error getting audio duration: {}", e);
                0.0
            }
        }
    }

    /// Release resources. The client owns nothing that needs explicit release.
    pub fn cleanup(&self) {
        debug!("cleanup: nothing to release");
    }

    /// [`synthesize_to_file`](Self::synthesize_to_file), collapsed to success or failure.
    pub fn generate_audio(&self, text: &str, output: impl AsRef<Path>, dialect: Dialect) -> bool {
        match self.synthesize_to_file(text, output, dialect) {
            Ok(_) => true,
            Err(e) => {
                warn!("error generating audio: {}", e);
                false
            }
        }
    }

    /// [`speak`](Self::speak), collapsed to success or failure.
    pub fn speak_text(&self, text: &str, dialect: Dialect) -> bool {
        match self.speak(text, dialect) {
            Ok(()) => true,
            Err(e) => {
                warn!("error speaking text: {}", e);
                false
            }
        }
    }

    /// [`speak_test_phrase`](Self::speak_test_phrase), collapsed to success or failure.
    pub fn test_voice(&self, dialect: Dialect) -> bool {
        self.speak_text(TEST_PHRASE, dialect)
    }
}

/// Segment scratch files, removed on drop.
#[derive(Default)]
struct SegmentFiles(Vec<PathBuf>);

impl Drop for SegmentFiles {
    fn drop(&mut self) {
        for path in &self.0 {
            if let Err(e) = std::fs::remove_file(path) {
                debug!(path = %path.display(), "failed to remove temp file: {}", e);
            }
        }
    }
}

fn probe(http_client: &Client, config: &TtsConfig) -> EngineState {
    match http_client
        .get(&config.probe_url)
        .timeout(config.probe_timeout())
        .send()
    {
        Ok(resp) if resp.status() == StatusCode::OK => {
            info!("Google TTS engine initialized");
            EngineState::available(config.base_url.clone())
        }
        Ok(resp) => {
            warn!(status = resp.status().as_u16(), "no internet connection");
            EngineState::unavailable(config.base_url.clone())
        }
        Err(e) => {
            warn!("error initializing Google TTS: {}", e);
            EngineState::unavailable(config.base_url.clone())
        }
    }
}

pub struct TtsClientBuilder {
    config: Option<TtsConfig>,
    state: Option<EngineState>,
    player: Option<Box<dyn Player>>,
}

impl TtsClientBuilder {
    pub fn new() -> Self {
        Self {
            config: None,
            state: None,
            player: None,
        }
    }

    pub fn config(mut self, config: TtsConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Skip the connectivity probe and use this state instead.
    pub fn state(mut self, state: EngineState) -> Self {
        self.state = Some(state);
        self
    }

    /// Replace the command-line player built from the playback config.
    pub fn player(mut self, player: impl Player + 'static) -> Self {
        self.player = Some(Box::new(player));
        self
    }

    pub fn build(self) -> Result<TtsClient> {
        let config = self.config.unwrap_or_else(TtsConfig::from_env);
        config.validate()?;

        let http_client = Client::builder()
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| Error::configuration(format!("Failed to create HTTP client: {}", e)))?;

        let state = match self.state {
            Some(state) => state,
            None => probe(&http_client, &config),
        };
        let player = self
            .player
            .unwrap_or_else(|| {
                Box::new(CommandPlayer::from_config(&config.playback)) as Box<dyn Player>
            });

        Ok(TtsClient {
            http_client,
            config,
            state,
            player,
        })
    }
}

impl Default for TtsClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
