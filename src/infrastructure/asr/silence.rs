//! Energy-based voice-activity filtering.
//!
//! Frames of audio below an RMS threshold count as silence; silence runs
//! shorter than the configured minimum stay inside the surrounding speech
//! span, longer runs split the audio into separate spans that are skipped
//! before decoding.

use std::time::Duration;

/// RMS level below which a frame counts as silence.
const RMS_THRESHOLD: f32 = 0.01;

/// Frame length in milliseconds.
const FRAME_MS: usize = 30;

/// Half-open range of samples containing speech.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpeechSpan {
    pub start: usize,
    pub end: usize,
}

impl SpeechSpan {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }
}

/// Detects speech spans in mono PCM. Returns an empty list for audio that
/// never rises above the silence threshold.
pub fn speech_spans(
    samples: &[f32],
    sample_rate: u32,
    min_silence: Duration,
) -> Vec<SpeechSpan> {
    let frame_len = (sample_rate as usize * FRAME_MS) / 1000;
    if frame_len == 0 || samples.is_empty() {
        return Vec::new();
    }

    let min_silence_samples =
        (min_silence.as_secs_f64() * f64::from(sample_rate)) as usize;

    let mut spans: Vec<SpeechSpan> = Vec::new();
    let mut current: Option<SpeechSpan> = None;

    for (index, frame) in samples.chunks(frame_len).enumerate() {
        let start = index * frame_len;
        let end = start + frame.len();
        if rms(frame) >= RMS_THRESHOLD {
            current = match current {
                Some(span) => Some(SpeechSpan {
                    start: span.start,
                    end,
                }),
                None => Some(SpeechSpan { start, end }),
            };
        } else if let Some(span) = current.take() {
            spans.push(span);
        }
    }
    if let Some(span) = current {
        spans.push(span);
    }

    merge_short_gaps(spans, min_silence_samples)
}

/// Silence gaps shorter than the minimum are bridged; only gaps at least
/// as long as the minimum split speech into separate spans.
fn merge_short_gaps(spans: Vec<SpeechSpan>, min_silence_samples: usize) -> Vec<SpeechSpan> {
    let mut merged: Vec<SpeechSpan> = Vec::with_capacity(spans.len());
    for span in spans {
        match merged.last_mut() {
            Some(last) if span.start - last.end < min_silence_samples => {
                last.end = span.end;
            }
            _ => merged.push(span),
        }
    }
    merged
}

fn rms(frame: &[f32]) -> f32 {
    if frame.is_empty() {
        return 0.0;
    }
    let sum: f32 = frame.iter().map(|s| s * s).sum();
    (sum / frame.len() as f32).sqrt()
}

/// Maps positions on the silence-stripped timeline back onto the original
/// recording, so segment timestamps stay aligned with the uploaded audio
/// even though decoding skipped the silent spans.
pub struct Timeline {
    spans: Vec<SpeechSpan>,
    sample_rate: u32,
}

impl Timeline {
    pub fn new(spans: Vec<SpeechSpan>, sample_rate: u32) -> Self {
        Self { spans, sample_rate }
    }

    /// Concatenates the speech spans into the buffer handed to the
    /// decoder.
    pub fn filtered(&self, samples: &[f32]) -> Vec<f32> {
        let total: usize = self.spans.iter().map(SpeechSpan::len).sum();
        let mut out = Vec::with_capacity(total);
        for span in &self.spans {
            out.extend_from_slice(&samples[span.start..span.end.min(samples.len())]);
        }
        out
    }

    /// Original-timeline position of a filtered-timeline timestamp.
    pub fn to_original_secs(&self, filtered_secs: f64) -> f64 {
        let rate = f64::from(self.sample_rate);
        let mut remaining = (filtered_secs * rate).round() as usize;
        for span in &self.spans {
            if remaining <= span.len() {
                return (span.start + remaining) as f64 / rate;
            }
            remaining -= span.len();
        }
        match self.spans.last() {
            Some(span) => span.end as f64 / rate,
            None => filtered_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RATE: u32 = 16_000;

    fn tone(secs: f64) -> Vec<f32> {
        let count = (secs * f64::from(RATE)) as usize;
        (0..count)
            .map(|i| (i as f32 * 0.1).sin() * 0.5)
            .collect()
    }

    fn silence(secs: f64) -> Vec<f32> {
        vec![0.0; (secs * f64::from(RATE)) as usize]
    }

    #[test]
    fn pure_silence_has_no_speech_spans() {
        let spans = speech_spans(&silence(5.0), RATE, Duration::from_millis(500));
        assert!(spans.is_empty());
    }

    #[test]
    fn single_burst_yields_one_span_covering_it() {
        let mut samples = silence(0.3);
        samples.extend(tone(1.4));
        samples.extend(silence(0.3));

        let spans = speech_spans(&samples, RATE, Duration::from_millis(500));
        assert_eq!(spans.len(), 1);
        let start_secs = spans[0].start as f64 / f64::from(RATE);
        let end_secs = spans[0].end as f64 / f64::from(RATE);
        assert!((start_secs - 0.3).abs() < 0.1);
        assert!((end_secs - 1.7).abs() < 0.1);
    }

    #[test]
    fn short_gap_stays_inside_one_span() {
        let mut samples = tone(1.0);
        samples.extend(silence(0.2));
        samples.extend(tone(1.0));

        let spans = speech_spans(&samples, RATE, Duration::from_millis(500));
        assert_eq!(spans.len(), 1);
    }

    #[test]
    fn long_gap_splits_speech_into_two_spans() {
        let mut samples = tone(1.0);
        samples.extend(silence(1.0));
        samples.extend(tone(1.0));

        let spans = speech_spans(&samples, RATE, Duration::from_millis(500));
        assert_eq!(spans.len(), 2);
    }

    #[test]
    fn timestamps_map_back_across_a_skipped_gap() {
        let mut samples = tone(1.0);
        samples.extend(silence(1.0));
        samples.extend(tone(1.0));

        let spans = speech_spans(&samples, RATE, Duration::from_millis(500));
        let timeline = Timeline::new(spans, RATE);

        // 1.5s on the filtered timeline falls 0.5s into the second span,
        // which starts at ~2.0s of the original recording.
        let original = timeline.to_original_secs(1.5);
        assert!((original - 2.5).abs() < 0.1, "got {original}");

        let filtered = timeline.filtered(&samples);
        assert!(filtered.len() < samples.len());
    }

    #[test]
    fn mapping_is_monotonic() {
        let mut samples = tone(0.8);
        samples.extend(silence(0.7));
        samples.extend(tone(0.5));

        let spans = speech_spans(&samples, RATE, Duration::from_millis(500));
        let timeline = Timeline::new(spans, RATE);

        let mut last = 0.0;
        for step in 0..13 {
            let mapped = timeline.to_original_secs(step as f64 * 0.1);
            assert!(mapped >= last);
            last = mapped;
        }
    }
}
