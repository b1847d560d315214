//! # Service Protos
//!
//! Wire definitions for the Speech Center streaming services.
//!
//! The message types are written as `prost` derives rather than generated by
//! `tonic-build`, so building the client does not need `protoc`. Field tags
//! follow the proto definitions quoted on each module.

pub mod recognizer;
pub mod texttospeech;

// Re-export common types for convenience
pub use recognizer::speech_recognizer_client::SpeechRecognizerClient;
pub use texttospeech::text_to_speech_client::TextToSpeechClient;
