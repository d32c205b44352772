mod engine_factory;
mod silence;
mod whisper_engine;

pub use engine_factory::{load_engine, BackendPreference, ComputeBackend};
pub use silence::{speech_spans, SpeechSpan, Timeline};
pub use whisper_engine::WhisperAsrEngine;
