use super::observer::SessionObserver;
use crate::audio::{chunk_duration, chunks};
use crate::error::{Result, SessionError};
use crate::protocol::{OutboundFrame, SessionConfig};
use crate::transport::FrameSender;
use tokio::time::{sleep_until, Instant};

/// What follows the config message on the wire.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Payload<'a> {
    /// Raw PCM, sent as real-time paced chunks.
    Audio { pcm: &'a [u8], sample_rate_hz: u32 },
    /// A single text frame, sent without pacing.
    Text(&'a str),
}

/// Writes one complete outbound sequence: config, payload, end marker, then
/// half-close. The first failure aborts the sequence.
pub(crate) struct PacedSender<'a> {
    sender: &'a mut dyn FrameSender,
    observer: &'a dyn SessionObserver,
}

impl<'a> PacedSender<'a> {
    pub(crate) fn new(sender: &'a mut dyn FrameSender, observer: &'a dyn SessionObserver) -> Self {
        Self { sender, observer }
    }

    pub(crate) async fn run(&mut self, config: SessionConfig, payload: Payload<'_>) -> Result<()> {
        self.send("config", OutboundFrame::Config(config)).await?;
        self.observer.config_sent();

        match payload {
            Payload::Audio {
                pcm,
                sample_rate_hz,
            } => {
                for (i, chunk) in chunks(pcm).enumerate() {
                    let index = i + 1;
                    let duration = chunk_duration(chunk.len(), sample_rate_hz);

                    // Hold each chunk back by its own playback time so the
                    // service receives audio no faster than real time.
                    sleep_until(Instant::now() + duration).await;

                    self.send(
                        format!("payload #{}", index),
                        OutboundFrame::Audio(chunk.to_vec()),
                    )
                    .await?;
                    self.observer.chunk_sent(index, chunk.len(), duration);
                }
            }
            Payload::Text(text) => {
                self.send("payload #1", OutboundFrame::Text(text.to_string()))
                    .await?;
            }
        }

        self.send("end-of-stream", OutboundFrame::EndOfStream)
            .await?;

        self.sender
            .close_send()
            .await
            .map_err(|e| SessionError::send_failed("half-close", e))
    }

    async fn send(&mut self, stage: impl Into<String>, frame: OutboundFrame) -> Result<()> {
        self.sender
            .send(frame)
            .await
            .map_err(|e| SessionError::send_failed(stage, e))
    }
}
