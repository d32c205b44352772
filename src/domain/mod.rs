mod segment;
mod transcript;
mod upload;

pub use segment::{round2, RawSegment, Segment};
pub use transcript::{DetectionInfo, Transcription};
pub use upload::{AudioFormat, ScratchName};
