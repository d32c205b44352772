//! Cuts an interval out of an audio file.
//!
//! usage: sonoscribe-clip <input> <start-seconds> <end-seconds> [output]

use std::path::PathBuf;
use std::sync::Arc;

use sonoscribe::application::ports::AudioCodec;
use sonoscribe::application::services::ClipService;
use sonoscribe::infrastructure::audio::SymphoniaCodec;
use sonoscribe::infrastructure::observability::{init_tracing, TracingConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing(TracingConfig::default());

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() < 3 {
        eprintln!("usage: sonoscribe-clip <input> <start-seconds> <end-seconds> [output]");
        std::process::exit(2);
    }

    let input = PathBuf::from(&args[0]);
    anyhow::ensure!(input.exists(), "file not found: {}", input.display());

    let start: f64 = args[1]
        .parse()
        .map_err(|_| anyhow::anyhow!("start must be a number, got {:?}", args[1]))?;
    let end: f64 = args[2]
        .parse()
        .map_err(|_| anyhow::anyhow!("end must be a number, got {:?}", args[2]))?;
    let output = args.get(3).map(PathBuf::from);

    let codec: Arc<dyn AudioCodec> = Arc::new(SymphoniaCodec::new());
    let service = ClipService::new(codec);

    let outcome = service.clip(&input, start, end, output).await?;
    println!(
        "wrote {} ({:.2}s{})",
        outcome.output.display(),
        outcome.duration_secs,
        if outcome.clamped { ", end clamped" } else { "" }
    );

    Ok(())
}
