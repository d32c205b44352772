use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use uuid::Uuid;

/// Audio container formats accepted at the upload boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AudioFormat {
    Mp3,
    Wav,
    M4a,
    Ogg,
    Flac,
    Aac,
}

impl AudioFormat {
    pub const ALL: [AudioFormat; 6] = [
        AudioFormat::Mp3,
        AudioFormat::Wav,
        AudioFormat::M4a,
        AudioFormat::Ogg,
        AudioFormat::Flac,
        AudioFormat::Aac,
    ];

    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "mp3" => Some(Self::Mp3),
            "wav" => Some(Self::Wav),
            "m4a" => Some(Self::M4a),
            "ogg" => Some(Self::Ogg),
            "flac" => Some(Self::Flac),
            "aac" => Some(Self::Aac),
            _ => None,
        }
    }

    pub fn from_filename(filename: &str) -> Option<Self> {
        let (_, extension) = filename.rsplit_once('.')?;
        Self::from_extension(extension)
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::Wav => "wav",
            Self::M4a => "m4a",
            Self::Ogg => "ogg",
            Self::Flac => "flac",
            Self::Aac => "aac",
        }
    }

    /// Comma-separated list of accepted extensions, for user-facing
    /// validation messages.
    pub fn allowed_list() -> String {
        Self::ALL
            .iter()
            .map(|f| f.extension())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Unique name for a staged upload on scratch storage. Derived from a
/// random identifier plus a timestamp so concurrent requests can never
/// collide, regardless of the user-supplied filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScratchName(String);

impl ScratchName {
    pub fn generate(format: AudioFormat) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        Self(format!(
            "{}_{}.{}",
            Uuid::new_v4().simple(),
            timestamp,
            format.extension()
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ScratchName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_every_allowed_extension() {
        for format in AudioFormat::ALL {
            let filename = format!("recording.{}", format.extension());
            assert_eq!(AudioFormat::from_filename(&filename), Some(format));
        }
    }

    #[test]
    fn extension_matching_is_case_insensitive() {
        assert_eq!(AudioFormat::from_filename("A.MP3"), Some(AudioFormat::Mp3));
        assert_eq!(AudioFormat::from_filename("b.Wav"), Some(AudioFormat::Wav));
    }

    #[test]
    fn rejects_unknown_and_missing_extensions() {
        assert_eq!(AudioFormat::from_filename("notes.txt"), None);
        assert_eq!(AudioFormat::from_filename("no-extension"), None);
        assert_eq!(AudioFormat::from_filename(""), None);
    }

    #[test]
    fn generated_names_are_unique_and_keep_the_extension() {
        let a = ScratchName::generate(AudioFormat::Ogg);
        let b = ScratchName::generate(AudioFormat::Ogg);
        assert_ne!(a, b);
        assert!(a.as_str().ends_with(".ogg"));
        assert!(b.as_str().ends_with(".ogg"));
    }
}
