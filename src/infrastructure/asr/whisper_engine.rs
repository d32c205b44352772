//! whisper.cpp transcription backend via whisper-rs.
//!
//! The context is loaded once at process startup and shared read-only
//! across requests; each invocation creates its own decoding state, so
//! concurrent requests never contend on the model.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

use crate::application::ports::{AsrEngine, AsrError, SegmentStream, TranscriptionConfig};
use crate::domain::{DetectionInfo, RawSegment};
use crate::infrastructure::audio::pcm_decoder::decode_to_mono_pcm;
use crate::infrastructure::audio::resampler::resample;
use crate::infrastructure::audio::CANONICAL_SAMPLE_RATE;

use super::engine_factory::ComputeBackend;
use super::silence::{speech_spans, Timeline};

/// Reported language code when auto-detection is requested; the binding
/// exposes no detected-language read-back after a full decode.
const AUTO_FALLBACK_LANGUAGE: &str = "en";

pub struct WhisperAsrEngine {
    context: Arc<WhisperContext>,
    threads: usize,
}

impl WhisperAsrEngine {
    /// Loads the GGML model. Fails fast so the factory can degrade to the
    /// next compute backend before the serving loop starts.
    pub fn load(
        model_path: &Path,
        backend: ComputeBackend,
        threads: usize,
    ) -> Result<Self, AsrError> {
        let path = model_path
            .to_str()
            .ok_or_else(|| AsrError::ModelLoadFailed("model path is not valid UTF-8".into()))?;

        let mut context_params = WhisperContextParameters::default();
        context_params.use_gpu = matches!(backend, ComputeBackend::Accelerated);

        tracing::info!(
            model = %model_path.display(),
            backend = ?backend,
            "loading speech recognition model"
        );

        let context = WhisperContext::new_with_params(path, context_params)
            .map_err(|e| AsrError::ModelLoadFailed(e.to_string()))?;

        tracing::info!("speech recognition model loaded");

        Ok(Self {
            context: Arc::new(context),
            threads,
        })
    }
}

#[async_trait]
impl AsrEngine for WhisperAsrEngine {
    async fn transcribe(
        &self,
        audio: &Path,
        config: &TranscriptionConfig,
    ) -> Result<(SegmentStream, DetectionInfo), AsrError> {
        let bytes = tokio::fs::read(audio)
            .await
            .map_err(|e| AsrError::DecodingFailed(format!("{}: {}", audio.display(), e)))?;

        let context = Arc::clone(&self.context);
        let config = config.clone();
        let threads = self.threads;

        tokio::task::spawn_blocking(move || transcribe_blocking(&context, threads, &config, &bytes))
            .await
            .map_err(|e| AsrError::Task(e.to_string()))?
    }
}

fn transcribe_blocking(
    context: &WhisperContext,
    threads: usize,
    config: &TranscriptionConfig,
    bytes: &[u8],
) -> Result<(SegmentStream, DetectionInfo), AsrError> {
    let decoded = decode_to_mono_pcm(bytes).map_err(|e| AsrError::DecodingFailed(e.to_string()))?;
    let samples = resample(&decoded.samples, decoded.sample_rate, CANONICAL_SAMPLE_RATE)
        .map_err(|e| AsrError::DecodingFailed(e.to_string()))?;

    let timeline = if config.vad_filter {
        let spans = speech_spans(&samples, CANONICAL_SAMPLE_RATE, config.min_silence);
        if spans.is_empty() {
            tracing::debug!("voice-activity filter found no speech");
            return Ok((SegmentStream::empty(), detection_info(config, None)));
        }
        Some(Timeline::new(spans, CANONICAL_SAMPLE_RATE))
    } else {
        None
    };

    let decode_input = match &timeline {
        Some(timeline) => timeline.filtered(&samples),
        None => samples,
    };

    let mut state = context
        .create_state()
        .map_err(|e| AsrError::InferenceFailed(format!("state: {}", e)))?;

    let strategy = if config.beam_width > 1 {
        SamplingStrategy::BeamSearch {
            beam_size: config.beam_width as i32,
            patience: -1.0,
        }
    } else {
        SamplingStrategy::Greedy { best_of: 1 }
    };

    let mut params = FullParams::new(strategy);
    params.set_language(config.language.as_deref());
    params.set_translate(false);
    params.set_token_timestamps(true);
    params.set_print_special(false);
    params.set_print_progress(false);
    params.set_print_realtime(false);
    params.set_print_timestamps(false);
    if threads > 0 {
        params.set_n_threads(threads as i32);
    }

    state
        .full(params, &decode_input)
        .map_err(|e| AsrError::InferenceFailed(e.to_string()))?;

    let mut segments = Vec::new();
    let mut probability_sum = 0.0f64;
    let mut token_count = 0u64;

    for idx in 0..state.full_n_segments() {
        let Some(segment) = state.get_segment(idx) else {
            continue;
        };
        let text = segment
            .to_str_lossy()
            .map(|cow| cow.to_string())
            .unwrap_or_default();

        let mut start_secs = segment.start_timestamp() as f64 / 100.0;
        let mut end_secs = segment.end_timestamp() as f64 / 100.0;
        if let Some(timeline) = &timeline {
            start_secs = timeline.to_original_secs(start_secs);
            end_secs = timeline.to_original_secs(end_secs);
        }

        for token_idx in 0..segment.n_tokens().max(0) {
            if let Some(token) = segment.get_token(token_idx) {
                probability_sum += f64::from(token.token_probability());
                token_count += 1;
            }
        }

        segments.push(RawSegment {
            start_secs,
            end_secs,
            text,
        });
    }

    let mean_probability = if token_count == 0 {
        0.0
    } else {
        (probability_sum / token_count as f64).clamp(0.0, 1.0) as f32
    };

    Ok((
        SegmentStream::from_segments(segments),
        detection_info(config, Some(mean_probability)),
    ))
}

/// A pinned language is reported with full confidence; auto mode reports
/// the decode confidence against the fallback code.
fn detection_info(config: &TranscriptionConfig, confidence: Option<f32>) -> DetectionInfo {
    match &config.language {
        Some(code) => DetectionInfo {
            language: code.clone(),
            probability: 1.0,
        },
        None => DetectionInfo {
            language: AUTO_FALLBACK_LANGUAGE.to_string(),
            probability: confidence.unwrap_or(0.0),
        },
    }
}
