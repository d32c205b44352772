//! Compares transcription throughput under the four pipeline
//! configurations: baseline, VAD only, preprocessing only, and VAD plus
//! preprocessing. Same ports as the server, model loaded once.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;

use sonoscribe::application::ports::{AsrEngine, AudioCodec, TranscriptionConfig};
use sonoscribe::application::services::TranscriptionService;
use sonoscribe::infrastructure::asr::{load_engine, BackendPreference};
use sonoscribe::infrastructure::audio::SymphoniaCodec;
use sonoscribe::infrastructure::observability::{init_tracing, TracingConfig};
use sonoscribe::presentation::{BackendSetting, Settings};

struct BenchCase {
    name: &'static str,
    vad_filter: bool,
    preprocess: bool,
}

const CASES: [BenchCase; 4] = [
    BenchCase {
        name: "baseline",
        vad_filter: false,
        preprocess: false,
    },
    BenchCase {
        name: "vad",
        vad_filter: true,
        preprocess: false,
    },
    BenchCase {
        name: "preprocessing",
        vad_filter: false,
        preprocess: true,
    },
    BenchCase {
        name: "vad + preprocessing",
        vad_filter: true,
        preprocess: true,
    },
];

struct BenchResult {
    name: &'static str,
    transcribe_secs: f64,
    segments: usize,
    chars: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing(TracingConfig::default());

    let audio: PathBuf = match std::env::args().nth(1) {
        Some(path) => PathBuf::from(path),
        None => {
            eprintln!("usage: sonoscribe-bench <audio-file>");
            std::process::exit(2);
        }
    };
    anyhow::ensure!(audio.exists(), "file not found: {}", audio.display());

    let settings = Settings::load().context("failed to load settings")?;
    let preference = match settings.asr.backend {
        BackendSetting::Auto => BackendPreference::Auto,
        BackendSetting::Accelerated => BackendPreference::Accelerated,
        BackendSetting::Cpu => BackendPreference::Cpu,
    };

    let load_started = Instant::now();
    let engine: Arc<dyn AsrEngine> = Arc::new(
        load_engine(&settings.asr.model_path, preference, settings.asr.threads)
            .context("failed to load the speech recognition model")?,
    );
    let model_load_secs = load_started.elapsed().as_secs_f64();
    println!("model loaded in {model_load_secs:.2}s");

    let codec: Arc<dyn AudioCodec> = Arc::new(SymphoniaCodec::new());
    let service = TranscriptionService::new(engine);
    let base_config = settings.asr.transcription_config();

    let mut results = Vec::with_capacity(CASES.len());
    for case in &CASES {
        println!("running: {}", case.name);
        let result = run_case(case, &audio, &codec, &service, &base_config).await?;
        println!(
            "  {:.2}s, {} segments, {} chars",
            result.transcribe_secs, result.segments, result.chars
        );
        results.push(result);
    }

    print_summary(&results);
    Ok(())
}

async fn run_case(
    case: &BenchCase,
    audio: &Path,
    codec: &Arc<dyn AudioCodec>,
    service: &TranscriptionService,
    base_config: &TranscriptionConfig,
) -> anyhow::Result<BenchResult> {
    let input = if case.preprocess {
        match codec.canonicalize(audio).await {
            Ok(path) => Some(path),
            Err(err) => {
                tracing::warn!(error = %err, "preprocessing failed, using the original file");
                None
            }
        }
    } else {
        None
    };

    let config = TranscriptionConfig {
        vad_filter: case.vad_filter,
        ..base_config.clone()
    };

    let target = input.as_deref().unwrap_or(audio);
    let transcription = service.transcribe(target, &config).await?;

    if let Some(path) = input {
        if path != audio {
            let _ = tokio::fs::remove_file(&path).await;
        }
    }

    Ok(BenchResult {
        name: case.name,
        transcribe_secs: transcription.processing_time,
        segments: transcription.segments.len(),
        chars: transcription.full_text.chars().count(),
    })
}

fn print_summary(results: &[BenchResult]) {
    let baseline = results
        .first()
        .map(|r| r.transcribe_secs)
        .unwrap_or_default();

    println!();
    println!("{:<24} {:>8} {:>9}", "config", "time", "speedup");
    println!("{}", "-".repeat(43));
    for result in results {
        let speedup = if result.transcribe_secs > 0.0 {
            baseline / result.transcribe_secs
        } else {
            0.0
        };
        println!(
            "{:<24} {:>7.2}s {:>8.2}x",
            result.name, result.transcribe_secs, speedup
        );
    }

    if let Some(best) = results
        .iter()
        .min_by(|a, b| a.transcribe_secs.total_cmp(&b.transcribe_secs))
    {
        println!();
        println!("fastest: {}", best.name);
    }
}
