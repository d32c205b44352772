use std::path::Path;

use crate::application::ports::AsrError;

use super::whisper_engine::WhisperAsrEngine;

/// Concrete execution mode of the recognition model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComputeBackend {
    Accelerated,
    Cpu,
}

/// Startup-time backend selection. `Auto` tries the accelerated mode and
/// degrades to CPU when loading fails; the per-request path never makes
/// this decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendPreference {
    Auto,
    Accelerated,
    Cpu,
}

impl BackendPreference {
    pub fn candidates(self) -> &'static [ComputeBackend] {
        match self {
            Self::Auto => &[ComputeBackend::Accelerated, ComputeBackend::Cpu],
            Self::Accelerated => &[ComputeBackend::Accelerated],
            Self::Cpu => &[ComputeBackend::Cpu],
        }
    }
}

/// Loads the engine once, walking the preference's candidate backends in
/// order. Runs before the serving loop starts.
pub fn load_engine(
    model_path: &Path,
    preference: BackendPreference,
    threads: usize,
) -> Result<WhisperAsrEngine, AsrError> {
    let mut last_error = None;
    for backend in preference.candidates() {
        match WhisperAsrEngine::load(model_path, *backend, threads) {
            Ok(engine) => return Ok(engine),
            Err(err) => {
                tracing::warn!(
                    backend = ?backend,
                    error = %err,
                    "compute backend unavailable"
                );
                last_error = Some(err);
            }
        }
    }
    Err(last_error
        .unwrap_or_else(|| AsrError::ModelLoadFailed("no compute backend available".into())))
}
