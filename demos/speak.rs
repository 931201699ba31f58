//! Speak a sentence through the local audio player
//!
//! Configuration comes from `VIET_TTS_*` environment variables; see `TtsConfig::from_env`.
//!
//! Usage:
//!   cargo run --example speak -- "Xin chào các bạn" south
//!   VIET_TTS_PLAYER=ffplay cargo run --example speak -- "Xin chào"

use viet_tts::{Dialect, TtsClient, TtsConfig};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("info".parse()?),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let text = args
        .next()
        .unwrap_or_else(|| viet_tts::tts::TEST_PHRASE.to_string());
    let dialect: Dialect = match args.next() {
        Some(label) => label.parse()?,
        None => Dialect::default(),
    };

    let client = TtsClient::connect(TtsConfig::from_env())?;
    if !client.is_available() {
        eprintln!("TTS engine not available (no internet connection?)");
        std::process::exit(1);
    }

    println!("Voices:");
    for (dialect, description) in client.available_voices() {
        println!("  {dialect}: {description}");
    }

    client.speak(&text, dialect)?;
    client.cleanup();
    Ok(())
}
