//! # viet-tts
//!
//! Vietnamese text-to-speech client for the public `translate_tts` endpoint.
//!
//! ## Overview
//!
//! The client runs one linear pipeline:
//!
//! - **Probe**: a connectivity check decides, once, whether the engine is usable
//! - **Normalize**: text is filtered to the Vietnamese alphabet and basic punctuation
//! - **Fetch**: short text is fetched in one request, long text one sentence at a time
//! - **Merge**: sentence audio is concatenated in order (WAV frames or MP3 streams)
//! - **Play**: optional local playback through an external player
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use viet_tts::{Dialect, TtsClient, TtsConfig};
//!
//! fn main() -> viet_tts::Result<()> {
//!     let client = TtsClient::connect(TtsConfig::from_env())?;
//!     let report = client.synthesize_to_file("Xin chào", "xin_chao.mp3", Dialect::North)?;
//!     println!("{} segment(s), format {}", report.segments, report.format);
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`tts`] | Client, builder and result types |
//! | [`text`] | Normalization and sentence splitting |
//! | [`audio`] | Segment merging and duration |
//! | [`playback`] | External player invocation |
//! | [`config`] | Configuration from defaults, env and YAML |

pub mod audio;
pub mod config;
pub mod playback;
pub mod text;
pub mod tts;

pub use config::TtsConfig;
pub use playback::{CommandPlayer, PlaybackConfig, PlaybackWait, Player};
pub use tts::{AudioFormat, Dialect, EngineState, SynthesisReport, TtsClient, TtsClientBuilder};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext, ErrorKind};
