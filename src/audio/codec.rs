use super::BYTES_PER_SAMPLE;
use std::io::Cursor;
use strum::{Display, EnumString};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("PCM payload has odd length {len}; expected whole 16-bit samples")]
    MalformedPcm { len: usize },

    #[error("Unsupported WAV layout: {0}")]
    UnsupportedWav(String),

    #[error("WAV encoding error: {0}")]
    Wav(#[from] hound::Error),
}

/// Container for synthesized audio written back to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum AudioFormat {
    /// Headerless little-endian 16-bit PCM
    Raw,
    /// RIFF/WAVE, PCM tag 1, mono, 16-bit
    Wav,
}

/// PCM samples recovered from a WAV container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedWav {
    pub sample_rate: u32,
    pub samples: Vec<i16>,
}

impl DecodedWav {
    pub fn into_pcm(self) -> Vec<u8> {
        pcm_from_samples(&self.samples)
    }
}

/// Convert accumulated PCM into the requested output representation.
///
/// `Raw` is a byte-identical passthrough. `Wav` requires whole 16-bit
/// samples; the output is deterministic for a given input.
pub fn encode(pcm: &[u8], sample_rate: u32, format: AudioFormat) -> Result<Vec<u8>, CodecError> {
    match format {
        AudioFormat::Raw => Ok(pcm.to_vec()),
        AudioFormat::Wav => encode_wav(pcm, sample_rate),
    }
}

fn encode_wav(pcm: &[u8], sample_rate: u32) -> Result<Vec<u8>, CodecError> {
    let samples = samples_from_pcm(pcm)?;

    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::with_capacity(44 + pcm.len()));
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec)?;
        for sample in samples {
            writer.write_sample(sample)?;
        }
        writer.finalize()?;
    }

    Ok(cursor.into_inner())
}

/// Read a mono 16-bit WAV file back into samples.
pub fn decode_wav(bytes: &[u8]) -> Result<DecodedWav, CodecError> {
    let mut reader = hound::WavReader::new(Cursor::new(bytes))?;
    let spec = reader.spec();

    if spec.channels != 1
        || spec.bits_per_sample != 16
        || spec.sample_format != hound::SampleFormat::Int
    {
        return Err(CodecError::UnsupportedWav(format!(
            "{} channels, {} bits, {:?}",
            spec.channels, spec.bits_per_sample, spec.sample_format
        )));
    }

    let samples = reader.samples::<i16>().collect::<Result<Vec<_>, _>>()?;

    Ok(DecodedWav {
        sample_rate: spec.sample_rate,
        samples,
    })
}

/// Interpret little-endian bytes as signed 16-bit samples.
pub fn samples_from_pcm(pcm: &[u8]) -> Result<Vec<i16>, CodecError> {
    if pcm.len() % BYTES_PER_SAMPLE != 0 {
        return Err(CodecError::MalformedPcm { len: pcm.len() });
    }

    Ok(pcm
        .chunks_exact(BYTES_PER_SAMPLE)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect())
}

pub fn pcm_from_samples(samples: &[i16]) -> Vec<u8> {
    let mut pcm = Vec::with_capacity(samples.len() * BYTES_PER_SAMPLE);
    for sample in samples {
        pcm.extend_from_slice(&sample.to_le_bytes());
    }
    pcm
}

/// True when `bytes` starts with a RIFF/WAVE header.
pub fn is_wav(bytes: &[u8]) -> bool {
    bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WAVE"
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn sweep() -> Vec<i16> {
        (-400..400).map(|i| (i * 81) as i16).chain([i16::MIN, i16::MAX, 0]).collect()
    }

    #[test]
    fn test_raw_is_identity() {
        let pcm = vec![0x01, 0x02, 0x03];
        assert_eq!(encode(&pcm, 8000, AudioFormat::Raw).unwrap(), pcm);
        assert!(encode(&[], 8000, AudioFormat::Raw).unwrap().is_empty());
    }

    #[test]
    fn test_wav_round_trip() {
        let samples = sweep();
        let wav = encode(&pcm_from_samples(&samples), 16000, AudioFormat::Wav).unwrap();

        let decoded = decode_wav(&wav).unwrap();
        assert_eq!(decoded.sample_rate, 16000);
        assert_eq!(decoded.samples, samples);
    }

    #[test]
    fn test_wav_header_fields() {
        let wav = encode(&pcm_from_samples(&[1, -1]), 8000, AudioFormat::Wav).unwrap();

        assert!(is_wav(&wav));
        assert_eq!(&wav[12..16], b"fmt ");
        assert_eq!(u16::from_le_bytes([wav[20], wav[21]]), 1, "PCM format tag");
        assert_eq!(u16::from_le_bytes([wav[22], wav[23]]), 1, "mono");
        assert_eq!(
            u32::from_le_bytes([wav[24], wav[25], wav[26], wav[27]]),
            8000,
            "sample rate"
        );
        assert_eq!(u16::from_le_bytes([wav[34], wav[35]]), 16, "bit depth");
    }

    #[test]
    fn test_wav_is_deterministic() {
        let pcm = pcm_from_samples(&sweep());
        let first = encode(&pcm, 8000, AudioFormat::Wav).unwrap();
        let second = encode(&pcm, 8000, AudioFormat::Wav).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_odd_length_is_malformed() {
        let err = encode(&[0x00, 0x01, 0x02], 8000, AudioFormat::Wav).unwrap_err();
        assert!(matches!(err, CodecError::MalformedPcm { len: 3 }));
    }

    #[test]
    fn test_empty_pcm_encodes_header_only() {
        let wav = encode(&[], 8000, AudioFormat::Wav).unwrap();
        assert!(decode_wav(&wav).unwrap().samples.is_empty());
    }

    #[test]
    fn test_decode_rejects_stereo() {
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: 8000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
            writer.write_sample(0i16).unwrap();
            writer.write_sample(0i16).unwrap();
            writer.finalize().unwrap();
        }

        let err = decode_wav(&cursor.into_inner()).unwrap_err();
        assert!(matches!(err, CodecError::UnsupportedWav(_)));
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!(AudioFormat::from_str("wav").unwrap(), AudioFormat::Wav);
        assert_eq!(AudioFormat::from_str("RAW").unwrap(), AudioFormat::Raw);
        assert!(AudioFormat::from_str("mp3").is_err());
    }
}
