use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::application::ports::{AudioCodec, AudioCodecError};

use super::pcm_decoder::decode_to_mono_pcm;
use super::resampler::resample;

/// Sample rate of the canonical recognition form.
pub const CANONICAL_SAMPLE_RATE: u32 = 16_000;

/// Suffix marker of canonicalized files.
pub const PREPROCESSED_SUFFIX: &str = "_preprocessed";

// -0.1 dBFS, the headroom pydub-style peak normalization leaves.
const PEAK_TARGET: f32 = 0.988_55;

/// Symphonia-backed implementation of the audio collaborator: decodes any
/// supported container, writes lossless 16-bit WAV.
#[derive(Default)]
pub struct SymphoniaCodec;

impl SymphoniaCodec {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AudioCodec for SymphoniaCodec {
    async fn canonicalize(&self, input: &Path) -> Result<PathBuf, AudioCodecError> {
        let input = input.to_path_buf();
        tokio::task::spawn_blocking(move || canonicalize_blocking(&input))
            .await
            .map_err(|e| AudioCodecError::Task(e.to_string()))?
    }

    async fn duration_secs(&self, input: &Path) -> Result<f64, AudioCodecError> {
        let input = input.to_path_buf();
        tokio::task::spawn_blocking(move || {
            let bytes = std::fs::read(&input)?;
            Ok(decode_to_mono_pcm(&bytes)?.duration_secs())
        })
        .await
        .map_err(|e| AudioCodecError::Task(e.to_string()))?
    }

    async fn slice(
        &self,
        input: &Path,
        start_secs: f64,
        end_secs: f64,
        output: &Path,
    ) -> Result<f64, AudioCodecError> {
        let input = input.to_path_buf();
        let output = output.to_path_buf();
        tokio::task::spawn_blocking(move || {
            slice_blocking(&input, start_secs, end_secs, &output)
        })
        .await
        .map_err(|e| AudioCodecError::Task(e.to_string()))?
    }
}

fn canonicalize_blocking(input: &Path) -> Result<PathBuf, AudioCodecError> {
    let bytes = std::fs::read(input)?;
    let decoded = decode_to_mono_pcm(&bytes)?;
    let mut samples = resample(&decoded.samples, decoded.sample_rate, CANONICAL_SAMPLE_RATE)?;
    normalize_peak(&mut samples);

    let output = preprocessed_path(input);
    write_wav(&output, &samples, CANONICAL_SAMPLE_RATE)?;

    tracing::debug!(
        input = %input.display(),
        output = %output.display(),
        samples = samples.len(),
        "canonical form written"
    );

    Ok(output)
}

fn slice_blocking(
    input: &Path,
    start_secs: f64,
    end_secs: f64,
    output: &Path,
) -> Result<f64, AudioCodecError> {
    let bytes = std::fs::read(input)?;
    let decoded = decode_to_mono_pcm(&bytes)?;
    let rate = f64::from(decoded.sample_rate);

    let start = (start_secs * rate) as usize;
    let end = ((end_secs * rate) as usize).min(decoded.samples.len());
    if start >= end {
        return Err(AudioCodecError::EncodingFailed(format!(
            "empty slice window [{start_secs}, {end_secs})"
        )));
    }

    let window = &decoded.samples[start..end];
    write_wav(output, window, decoded.sample_rate)?;

    Ok(window.len() as f64 / rate)
}

fn preprocessed_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("audio");
    input.with_file_name(format!("{stem}{PREPROCESSED_SUFFIX}.wav"))
}

/// Scales the buffer so its peak lands on the reference level. Digital
/// silence is left untouched.
fn normalize_peak(samples: &mut [f32]) {
    let peak = samples.iter().fold(0.0f32, |acc, s| acc.max(s.abs()));
    if peak <= f32::EPSILON {
        return;
    }
    let gain = PEAK_TARGET / peak;
    for sample in samples.iter_mut() {
        *sample *= gain;
    }
}

fn write_wav(path: &Path, samples: &[f32], sample_rate: u32) -> Result<(), AudioCodecError> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec)
        .map_err(|e| AudioCodecError::EncodingFailed(e.to_string()))?;
    for &sample in samples {
        let quantized = (sample.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i16;
        writer
            .write_sample(quantized)
            .map_err(|e| AudioCodecError::EncodingFailed(e.to_string()))?;
    }
    writer
        .finalize()
        .map_err(|e| AudioCodecError::EncodingFailed(e.to_string()))?;
    Ok(())
}
