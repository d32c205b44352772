mod asr_engine;
mod audio_codec;
mod scratch_store;

pub use asr_engine::{AsrEngine, AsrError, SegmentStream, TranscriptionConfig};
pub use audio_codec::{AudioCodec, AudioCodecError};
pub use scratch_store::{ScratchStore, ScratchStoreError};
