use super::BYTES_PER_SAMPLE;
use std::iter::FusedIterator;
use std::time::Duration;

/// Outbound audio frame size mandated by the recognition protocol.
/// 200ms at 8kHz, 100ms at 16kHz.
pub const CHUNK_SIZE: usize = 3200;

/// Lazy sequence of fixed-size PCM frames over a borrowed buffer.
///
/// Every frame is `CHUNK_SIZE` bytes except possibly the last. The sequence
/// is consumed as it is iterated and cannot be cloned or rewound.
#[derive(Debug)]
pub struct AudioChunks<'a> {
    remaining: &'a [u8],
    chunk_size: usize,
}

/// Split `pcm` into protocol-sized frames. Empty input yields no frames.
pub fn chunks(pcm: &[u8]) -> AudioChunks<'_> {
    AudioChunks::with_chunk_size(pcm, CHUNK_SIZE)
}

impl<'a> AudioChunks<'a> {
    pub(crate) fn with_chunk_size(pcm: &'a [u8], chunk_size: usize) -> Self {
        debug_assert!(chunk_size > 0);
        Self {
            remaining: pcm,
            chunk_size,
        }
    }
}

impl<'a> Iterator for AudioChunks<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining.is_empty() {
            return None;
        }
        let split = self.chunk_size.min(self.remaining.len());
        let (chunk, rest) = self.remaining.split_at(split);
        self.remaining = rest;
        Some(chunk)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining.len().div_ceil(self.chunk_size);
        (n, Some(n))
    }
}

impl ExactSizeIterator for AudioChunks<'_> {}

impl FusedIterator for AudioChunks<'_> {}

/// Playback time of `len` bytes of 16-bit mono PCM at `sample_rate_hz`.
pub fn chunk_duration(len: usize, sample_rate_hz: u32) -> Duration {
    let bytes_per_second = sample_rate_hz as u64 * BYTES_PER_SAMPLE as u64;
    if bytes_per_second == 0 {
        return Duration::ZERO;
    }
    Duration::from_nanos(len as u64 * 1_000_000_000 / bytes_per_second)
}
