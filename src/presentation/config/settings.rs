use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::application::ports::TranscriptionConfig;

const DEFAULT_CONFIG_PATH: &str = "sonoscribe.toml";

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub scratch: ScratchSettings,
    pub asr: AsrSettings,
    pub preprocessing: PreprocessingSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScratchSettings {
    /// Directory holding staged uploads for the lifetime of a request.
    pub dir: PathBuf,
    pub max_file_size_mb: u64,
}

impl ScratchSettings {
    pub fn max_upload_bytes(&self) -> u64 {
        self.max_file_size_mb * 1024 * 1024
    }
}

impl Default for ScratchSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("uploads"),
            max_file_size_mb: 300,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AsrSettings {
    pub model_path: PathBuf,
    /// Target language code, or "auto" for engine-side detection.
    pub language: String,
    pub beam_width: u32,
    pub vad_filter: bool,
    pub min_silence_ms: u64,
    pub backend: BackendSetting,
    /// Decoder threads; 0 keeps the engine default.
    pub threads: usize,
}

impl AsrSettings {
    pub fn transcription_config(&self) -> TranscriptionConfig {
        let language = if self.language.eq_ignore_ascii_case("auto") {
            None
        } else {
            Some(self.language.clone())
        };
        TranscriptionConfig {
            beam_width: self.beam_width,
            language,
            vad_filter: self.vad_filter,
            min_silence: Duration::from_millis(self.min_silence_ms),
        }
    }
}

impl Default for AsrSettings {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("models/ggml-large-v3-turbo-q8_0.bin"),
            language: "vi".to_string(),
            beam_width: 5,
            vad_filter: true,
            min_silence_ms: 500,
            backend: BackendSetting::Auto,
            threads: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendSetting {
    #[default]
    Auto,
    Accelerated,
    Cpu,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PreprocessingSettings {
    pub enabled: bool,
}

impl Default for PreprocessingSettings {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Settings {
    /// Reads the TOML file named by `SONOSCRIBE_CONFIG` (default
    /// `sonoscribe.toml`) when present, then applies environment
    /// overrides. A missing file yields the defaults.
    pub fn load() -> Result<Self, SettingsError> {
        let path =
            std::env::var("SONOSCRIBE_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let mut settings = if Path::new(&path).exists() {
            let raw = std::fs::read_to_string(&path)?;
            toml::from_str(&raw).map_err(|e| SettingsError::Parse(e.to_string()))?
        } else {
            Settings::default()
        };
        settings.apply_env_overrides();
        Ok(settings)
    }

    fn apply_env_overrides(&mut self) {
        if let Some(port) = env_parse::<u16>("SERVER_PORT") {
            self.server.port = port;
        }
        if let Ok(dir) = std::env::var("SCRATCH_DIR") {
            self.scratch.dir = PathBuf::from(dir);
        }
        if let Ok(model) = std::env::var("ASR_MODEL_PATH") {
            self.asr.model_path = PathBuf::from(model);
        }
        if let Ok(language) = std::env::var("ASR_LANGUAGE") {
            self.asr.language = language;
        }
        if let Ok(backend) = std::env::var("ASR_BACKEND") {
            match backend.to_lowercase().as_str() {
                "auto" => self.asr.backend = BackendSetting::Auto,
                "accelerated" | "gpu" => self.asr.backend = BackendSetting::Accelerated,
                "cpu" => self.asr.backend = BackendSetting::Cpu,
                other => tracing::warn!(value = other, "unknown ASR_BACKEND, keeping configured"),
            }
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid configuration: {0}")]
    Parse(String),
}
