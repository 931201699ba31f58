//! Synthesize text into an audio file and report what was produced
//!
//! Usage:
//!   cargo run --example synthesize_file -- output.mp3 "Một câu dài. Một câu khác."
//!   cargo run --example synthesize_file -- output.mp3 "..." --config tts.yaml

use viet_tts::{Dialect, TtsClient, TtsConfig};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() < 2 {
        anyhow::bail!("usage: synthesize_file <output> <text> [--config <file.yaml>]");
    }
    let output = &args[0];
    let text = &args[1];

    let config = match args.iter().position(|a| a == "--config") {
        Some(i) => {
            let path = args
                .get(i + 1)
                .ok_or_else(|| anyhow::anyhow!("--config needs a path"))?;
            TtsConfig::from_yaml_file(path)?.with_env_overrides()
        }
        None => TtsConfig::from_env(),
    };

    let client = TtsClient::connect(config)?;
    let report = client.synthesize_to_file(text, output, Dialect::North)?;

    println!("Normalized: {}", report.text);
    println!(
        "Segments: {} fetched, {} dropped, format {}",
        report.fetched.len(),
        report.dropped.len(),
        report.format
    );
    if report.is_partial() {
        println!("Warning: segments {:?} are missing from {}", report.dropped, output);
    }
    let secs = client.audio_duration(&report.output);
    if secs > 0.0 {
        println!("Duration: {secs:.2}s");
    }
    Ok(())
}
