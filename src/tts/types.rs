//! TTS (Text-to-Speech) types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Audio container detected from a response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    Wav,
    Mp3,
    Unknown,
}

impl AudioFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Wav => "audio/wav",
            Self::Mp3 => "audio/mpeg",
            Self::Unknown => "application/octet-stream",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Wav => "wav",
            Self::Mp3 => "mp3",
            Self::Unknown => "bin",
        }
    }

    /// Detect the container from its leading magic bytes.
    pub fn sniff(header: &[u8]) -> Self {
        if header.len() >= 12 && &header[0..4] == b"RIFF" && &header[8..12] == b"WAVE" {
            return Self::Wav;
        }
        if header.starts_with(b"ID3") {
            return Self::Mp3;
        }
        // MPEG audio frame sync: 11 set bits.
        if header.len() >= 2 && header[0] == 0xFF && header[1] & 0xE0 == 0xE0 {
            return Self::Mp3;
        }
        Self::Unknown
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Wav => "WAV",
            Self::Mp3 => "MP3",
            Self::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Regional voice label.
///
/// The remote endpoint exposes a single Vietnamese voice, so the dialect is
/// accepted for API compatibility and logged, but never changes the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[default]
    North,
    Central,
    South,
}

impl Dialect {
    pub const ALL: [Dialect; 3] = [Dialect::North, Dialect::Central, Dialect::South];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::North => "north",
            Self::Central => "central",
            Self::South => "south",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dialect {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "north" | "bac" | "bắc" => Ok(Self::North),
            "central" | "trung" => Ok(Self::Central),
            "south" | "nam" => Ok(Self::South),
            other => Err(crate::Error::configuration_with_context(
                format!("unknown dialect '{}'", other),
                crate::ErrorContext::new()
                    .with_field_path("dialect")
                    .with_details("expected one of: north, central, south"),
            )),
        }
    }
}

/// Availability decided once by the connectivity probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineState {
    available: bool,
    base_url: String,
}

impl EngineState {
    pub fn new(available: bool, base_url: impl Into<String>) -> Self {
        Self {
            available,
            base_url: base_url.into(),
        }
    }

    pub fn available(base_url: impl Into<String>) -> Self {
        Self::new(true, base_url)
    }

    pub fn unavailable(base_url: impl Into<String>) -> Self {
        Self::new(false, base_url)
    }

    pub fn is_available(&self) -> bool {
        self.available
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Outcome of a successful synthesis.
#[derive(Debug, Clone)]
pub struct SynthesisReport {
    /// Normalized text that was sent to the endpoint.
    pub text: String,
    /// Number of segments the text was split into (1 for short text).
    pub segments: usize,
    /// Indices of the segments that made it into the output, in order.
    pub fetched: Vec<usize>,
    /// Indices of the segments that failed and were left out.
    pub dropped: Vec<usize>,
    pub format: AudioFormat,
    pub output: PathBuf,
}

impl SynthesisReport {
    /// True when some segments were left out of the output.
    pub fn is_partial(&self) -> bool {
        !self.dropped.is_empty()
    }
}
