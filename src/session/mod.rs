//! # Streaming sessions
//!
//! A session drives one bidirectional stream to completion. The receive half
//! is drained by a spawned collector task while the calling task sends the
//! config, the payload and the end marker. The first of the two sides to
//! fail decides the outcome, and the stream is released exactly once on
//! every exit path.
//!
//! ```no_run
//! # async fn demo(channel: std::sync::Arc<dyn speech_center::transport::SpeechChannel>) -> speech_center::Result<()> {
//! use speech_center::session::{RecognitionOptions, StreamSession};
//!
//! let session = StreamSession::new(channel);
//! let pcm = std::fs::read("call.raw").unwrap_or_default();
//! let text = session
//!     .run_recognition(&pcm, RecognitionOptions::with_topic("generic"))
//!     .await?;
//! println!("{}", text);
//! # Ok(())
//! # }
//! ```

mod collector;
pub mod observer;
mod sender;

pub use observer::{LogObserver, SessionObserver};

use crate::audio::{self, AudioFormat};
use crate::error::{Result, SessionError};
use crate::protocol::{
    RecognitionConfig, RecognitionResource, SampleRate, SessionConfig, SynthesisConfig, Topic,
};
use crate::transport::{DuplexStream, FrameSender, SpeechChannel, StreamHandle};
use collector::{Aggregate, ResponseCollector};
use sender::{PacedSender, Payload};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

pub const DEFAULT_LANGUAGE: &str = "en-US";
pub const DEFAULT_RECOGNITION_SAMPLE_RATE: u32 = 8000;

/// Per-session limits. The default is unbounded and never cancelled.
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    pub timeout: Option<Duration>,
    pub cancellation: CancellationToken,
}

/// Parameters of a recognition request, as supplied by the caller.
///
/// Exactly one of `grammar` and `topic` must be set.
#[derive(Debug, Clone)]
pub struct RecognitionOptions {
    /// Inline grammar source
    pub grammar: Option<String>,
    /// Topic model name, matched case-insensitively
    pub topic: Option<String>,
    pub language: String,
    pub sample_rate_hz: u32,
}

impl Default for RecognitionOptions {
    fn default() -> Self {
        Self {
            grammar: None,
            topic: None,
            language: DEFAULT_LANGUAGE.to_string(),
            sample_rate_hz: DEFAULT_RECOGNITION_SAMPLE_RATE,
        }
    }
}

impl RecognitionOptions {
    pub fn with_grammar(grammar: impl Into<String>) -> Self {
        Self {
            grammar: Some(grammar.into()),
            ..Default::default()
        }
    }

    pub fn with_topic(topic: impl Into<String>) -> Self {
        Self {
            topic: Some(topic.into()),
            ..Default::default()
        }
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn sample_rate_hz(mut self, sample_rate_hz: u32) -> Self {
        self.sample_rate_hz = sample_rate_hz;
        self
    }

    /// Check the options and build the config message.
    pub fn validate(&self) -> Result<RecognitionConfig> {
        let resource = match (&self.grammar, &self.topic) {
            (Some(_), Some(_)) => {
                return Err(SessionError::InvalidConfig(
                    "grammar and topic are mutually exclusive".to_string(),
                ))
            }
            (None, None) => {
                return Err(SessionError::InvalidConfig(
                    "one of grammar or topic is required".to_string(),
                ))
            }
            (Some(grammar), None) => {
                if grammar.trim().is_empty() {
                    return Err(SessionError::InvalidConfig(
                        "grammar cannot be empty".to_string(),
                    ));
                }
                RecognitionResource::Grammar(grammar.clone())
            }
            (None, Some(topic)) => {
                let topic = Topic::from_str(topic.trim()).map_err(|_| {
                    SessionError::InvalidConfig(format!("unrecognized topic: {}", topic))
                })?;
                RecognitionResource::Topic(topic)
            }
        };

        if self.language.trim().is_empty() {
            return Err(SessionError::InvalidConfig(
                "language cannot be empty".to_string(),
            ));
        }
        if self.sample_rate_hz == 0 {
            return Err(SessionError::InvalidConfig(
                "sample rate must be positive".to_string(),
            ));
        }

        Ok(RecognitionConfig {
            resource,
            language: self.language.clone(),
            sample_rate_hz: self.sample_rate_hz,
        })
    }
}

/// Parameters of a synthesis request.
#[derive(Debug, Clone)]
pub struct SynthesisOptions {
    pub text: String,
    pub voice: String,
    pub sample_rate: Option<SampleRate>,
    /// Container for the returned audio
    pub format: AudioFormat,
}

impl SynthesisOptions {
    pub fn new(text: impl Into<String>, voice: impl Into<String>, sample_rate: SampleRate) -> Self {
        Self {
            text: text.into(),
            voice: voice.into(),
            sample_rate: Some(sample_rate),
            format: AudioFormat::Wav,
        }
    }

    pub fn format(mut self, format: AudioFormat) -> Self {
        self.format = format;
        self
    }

    pub fn validate(&self) -> Result<SynthesisConfig> {
        if self.text.trim().is_empty() {
            return Err(SessionError::InvalidConfig(
                "text cannot be empty".to_string(),
            ));
        }
        if self.voice.trim().is_empty() {
            return Err(SessionError::InvalidConfig(
                "voice cannot be empty".to_string(),
            ));
        }
        let sample_rate = self.sample_rate.ok_or_else(|| {
            SessionError::InvalidConfig("sampling rate is required".to_string())
        })?;

        Ok(SynthesisConfig {
            voice: self.voice.clone(),
            sample_rate,
        })
    }
}

/// Runs sessions over a shared channel. Each call opens its own stream, so
/// one `StreamSession` can serve concurrent calls.
pub struct StreamSession {
    channel: Arc<dyn SpeechChannel>,
    observer: Arc<dyn SessionObserver>,
    options: SessionOptions,
}

impl StreamSession {
    pub fn new(channel: Arc<dyn SpeechChannel>) -> Self {
        Self {
            channel,
            observer: Arc::new(LogObserver),
            options: SessionOptions::default(),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn SessionObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn with_options(mut self, options: SessionOptions) -> Self {
        self.options = options;
        self
    }

    /// Stream `audio` (raw 16-bit mono PCM) to the recognizer in real time
    /// and return the final transcript.
    pub async fn run_recognition(&self, audio: &[u8], options: RecognitionOptions) -> Result<String> {
        let config = options.validate()?;
        let payload = Payload::Audio {
            pcm: audio,
            sample_rate_hz: config.sample_rate_hz,
        };

        match self.exchange(SessionConfig::Recognition(config), payload).await? {
            Aggregate::Transcript(text) => Ok(text),
            Aggregate::Audio(_) => Err(SessionError::CollectorLost),
        }
    }

    /// Synthesize `options.text` and return it encoded as `options.format`.
    pub async fn run_synthesis(&self, options: SynthesisOptions) -> Result<Vec<u8>> {
        let config = options.validate()?;
        let sample_rate = config.sample_rate;

        let pcm = match self
            .exchange(SessionConfig::Synthesis(config), Payload::Text(&options.text))
            .await?
        {
            Aggregate::Audio(pcm) => pcm,
            Aggregate::Transcript(_) => return Err(SessionError::CollectorLost),
        };

        self.observer.synthesized(pcm.len(), sample_rate);
        Ok(audio::encode(&pcm, sample_rate.hz(), options.format)?)
    }

    async fn exchange(&self, config: SessionConfig, payload: Payload<'_>) -> Result<Aggregate> {
        let direction = config.direction();
        let DuplexStream {
            mut sender,
            receiver,
            handle,
        } = self
            .channel
            .open(direction)
            .await
            .map_err(SessionError::Open)?;
        self.observer.stream_opened(direction);

        let (result_rx, task) = ResponseCollector::new(
            direction,
            receiver,
            Arc::clone(&self.observer),
            handle.clone(),
        )
        .spawn();
        let guard = StreamGuard {
            task,
            handle,
            observer: Arc::clone(&self.observer),
        };

        let outcome = tokio::select! {
            biased;
            _ = self.options.cancellation.cancelled() => Err(SessionError::Cancelled),
            elapsed = expire(self.options.timeout) => Err(SessionError::TimedOut(elapsed)),
            result = drive(sender.as_mut(), self.observer.as_ref(), config, payload, result_rx) => result,
        };

        drop(guard);
        outcome
    }
}

/// Stops the collector and releases the stream when dropped, including when
/// the caller drops the session future mid-stream.
struct StreamGuard {
    task: JoinHandle<()>,
    handle: StreamHandle,
    observer: Arc<dyn SessionObserver>,
}

impl Drop for StreamGuard {
    fn drop(&mut self) {
        self.task.abort();
        if self.handle.close() {
            self.observer.stream_closed();
        }
    }
}

/// Races the send sequence against the collector's result.
async fn drive(
    sender: &mut dyn FrameSender,
    observer: &dyn SessionObserver,
    config: SessionConfig,
    payload: Payload<'_>,
    mut result_rx: oneshot::Receiver<Result<Aggregate>>,
) -> Result<Aggregate> {
    enum First {
        Collected(std::result::Result<Result<Aggregate>, oneshot::error::RecvError>),
        Sent(Result<()>),
    }

    let mut paced = PacedSender::new(sender, observer);
    let first = tokio::select! {
        biased;
        collected = &mut result_rx => First::Collected(collected),
        sent = paced.run(config, payload) => First::Sent(sent),
    };

    match first {
        First::Collected(collected) => {
            let result = collected.map_err(|_| SessionError::CollectorLost)?;
            if result.is_ok() {
                observer.input_truncated();
            }
            result
        }
        First::Sent(sent) => {
            sent?;
            result_rx.await.map_err(|_| SessionError::CollectorLost)?
        }
    }
}

async fn expire(timeout: Option<Duration>) -> Duration {
    match timeout {
        Some(timeout) => {
            tokio::time::sleep(timeout).await;
            timeout
        }
        None => std::future::pending().await,
    }
}
