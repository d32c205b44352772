pub mod pcm_decoder;
pub mod resampler;
mod wav_codec;

pub use wav_codec::{SymphoniaCodec, CANONICAL_SAMPLE_RATE, PREPROCESSED_SUFFIX};
