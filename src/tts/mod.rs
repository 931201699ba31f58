//! TTS（文字转语音）模块：通过公开的 translate_tts 接口将越南语文本合成为音频。

mod client;
mod types;

pub use client::{TtsClient, TtsClientBuilder, TEST_PHRASE};
pub use types::{AudioFormat, Dialect, EngineState, SynthesisReport};
