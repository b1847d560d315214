//! Session-level protocol types shared by both stream directions.
//!
//! These are closed sum types: the wire message set is fixed, and every
//! consumer matches them exhaustively. Mapping to and from the protobuf
//! messages happens in the transport layer.

use std::fmt;
use std::time::Duration;
use strum::{Display, EnumString};

/// Which of the two streaming RPCs a session drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Audio out, text in
    Recognition,
    /// Text out, audio in
    Synthesis,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Recognition => write!(f, "recognition"),
            Direction::Synthesis => write!(f, "synthesis"),
        }
    }
}

/// Pre-trained recognition models selectable instead of a grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Topic {
    Generic,
    Banking,
    Telco,
}

/// What the recognizer should listen for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionResource {
    /// Inline grammar source text
    Grammar(String),
    Topic(Topic),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionConfig {
    pub resource: RecognitionResource,
    /// BCP-47 language tag, e.g. "en-US"
    pub language: String,
    pub sample_rate_hz: u32,
}

/// Output sample rates offered by the synthesis service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum SampleRate {
    #[strum(to_string = "8khz", serialize = "8", serialize = "8000")]
    Hz8000,
    #[strum(to_string = "16khz", serialize = "16", serialize = "16000")]
    Hz16000,
}

impl SampleRate {
    pub fn hz(self) -> u32 {
        match self {
            SampleRate::Hz8000 => 8000,
            SampleRate::Hz16000 => 16000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesisConfig {
    pub voice: String,
    pub sample_rate: SampleRate,
}

/// The single configuration message opening every stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionConfig {
    Recognition(RecognitionConfig),
    Synthesis(SynthesisConfig),
}

impl SessionConfig {
    pub fn direction(&self) -> Direction {
        match self {
            SessionConfig::Recognition(_) => Direction::Recognition,
            SessionConfig::Synthesis(_) => Direction::Synthesis,
        }
    }
}

/// Client → service. On the wire: one `Config`, any number of payloads, one
/// `EndOfStream`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundFrame {
    Config(SessionConfig),
    Audio(Vec<u8>),
    Text(String),
    EndOfStream,
}

impl OutboundFrame {
    pub fn kind(&self) -> &'static str {
        match self {
            OutboundFrame::Config(_) => "config",
            OutboundFrame::Audio(_) => "audio",
            OutboundFrame::Text(_) => "text",
            OutboundFrame::EndOfStream => "end-of-stream",
        }
    }
}

/// A piece of recognised speech. Non-final fragments may still be revised by
/// the service.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptFragment {
    pub text: String,
    pub is_final: bool,
    pub duration: Duration,
}

/// Service → client.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundMessage {
    Transcript(TranscriptFragment),
    Error { domain: String, reason: String },
    Audio(Vec<u8>),
    EndOfUtterance,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_topic_parsing_ignores_case() {
        assert_eq!(Topic::from_str("generic").unwrap(), Topic::Generic);
        assert_eq!(Topic::from_str("BANKING").unwrap(), Topic::Banking);
        assert_eq!(Topic::from_str("Telco").unwrap(), Topic::Telco);
        assert!(Topic::from_str("medical").is_err());
        assert_eq!(Topic::Banking.to_string(), "banking");
    }

    #[test]
    fn test_sample_rate_aliases() {
        for input in ["8khz", "8kHz", "8", "8000"] {
            assert_eq!(SampleRate::from_str(input).unwrap(), SampleRate::Hz8000);
        }
        for input in ["16khz", "16kHz", "16", "16000"] {
            assert_eq!(SampleRate::from_str(input).unwrap(), SampleRate::Hz16000);
        }
        assert!(SampleRate::from_str("44khz").is_err());
        assert_eq!(SampleRate::Hz16000.hz(), 16000);
    }

    #[test]
    fn test_config_direction() {
        let config = SessionConfig::Synthesis(SynthesisConfig {
            voice: "tommy_en_us".to_string(),
            sample_rate: SampleRate::Hz8000,
        });
        assert_eq!(config.direction(), Direction::Synthesis);
    }
}
