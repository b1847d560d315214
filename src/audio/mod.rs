pub mod chunker;
pub mod codec;

pub use chunker::{chunk_duration, chunks, AudioChunks, CHUNK_SIZE};
pub use codec::{
    decode_wav, encode, is_wav, pcm_from_samples, samples_from_pcm, AudioFormat, CodecError,
    DecodedWav,
};

/// Bytes per sample of the 16-bit mono PCM the service speaks.
pub const BYTES_PER_SAMPLE: usize = 2;
