//! # Audio Framing Tests
//!
//! Chunking laws over realistic buffer sizes, and the WAV files the CLI
//! writes and reads back from disk.

use speech_center::audio::{self, AudioFormat, CHUNK_SIZE};
use std::time::Duration;

#[test]
fn test_chunk_count_and_coverage() {
    for len in [1, CHUNK_SIZE - 1, CHUNK_SIZE, CHUNK_SIZE + 1, 10 * CHUNK_SIZE + 17] {
        let pcm: Vec<u8> = (0..len).map(|i| (i % 251) as u8).collect();
        let frames: Vec<&[u8]> = audio::chunks(&pcm).collect();

        assert_eq!(frames.len(), len.div_ceil(CHUNK_SIZE), "len {}", len);
        assert!(frames.iter().all(|f| f.len() <= CHUNK_SIZE && !f.is_empty()));
        assert!(frames[..frames.len() - 1].iter().all(|f| f.len() == CHUNK_SIZE));
        assert_eq!(frames.concat(), pcm);
    }
}

#[test]
fn test_one_second_of_audio_paces_to_one_second() {
    let pcm = vec![0u8; 16_000 * 2];
    let total: Duration = audio::chunks(&pcm)
        .map(|f| audio::chunk_duration(f.len(), 16_000))
        .sum();
    assert_eq!(total, Duration::from_secs(1));
}

#[test]
fn test_wav_file_written_and_read_back() {
    let samples: Vec<i16> = (0..1600).map(|i| ((i * 37) % 2000 - 1000) as i16).collect();
    let wav = audio::encode(&audio::pcm_from_samples(&samples), 16_000, AudioFormat::Wav).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hello.wav");
    std::fs::write(&path, &wav).unwrap();

    let contents = std::fs::read(&path).unwrap();
    assert!(audio::is_wav(&contents));
    assert_eq!(contents.len(), 44 + samples.len() * 2);

    let decoded = audio::decode_wav(&contents).unwrap();
    assert_eq!(decoded.sample_rate, 16_000);
    assert_eq!(decoded.into_pcm(), audio::pcm_from_samples(&samples));
}

#[test]
fn test_raw_pcm_is_not_mistaken_for_wav() {
    assert!(!audio::is_wav(&[0u8; 64]));
    assert!(!audio::is_wav(b"RIFF"));
}
