use crate::protocol::{Direction, SampleRate};
use std::time::Duration;

/// Receives structured session events.
///
/// Sessions never log directly; they report here. Every method has a no-op
/// default so implementors only pick the events they care about.
pub trait SessionObserver: Send + Sync {
    fn stream_opened(&self, _direction: Direction) {}

    fn config_sent(&self) {}

    /// `index` counts from 1.
    fn chunk_sent(&self, _index: usize, _len: usize, _duration: Duration) {}

    fn fragment(&self, _text: &str, _is_final: bool, _duration: Duration) {}

    fn audio_fragment(&self, _len: usize) {}

    fn end_of_utterance(&self) {}

    fn remote_error(&self, _domain: &str, _reason: &str) {}

    /// A message that has no meaning on this stream's direction was dropped.
    fn message_ignored(&self, _direction: Direction, _kind: &str) {}

    /// The service ended the stream before all input was sent.
    fn input_truncated(&self) {}

    fn synthesized(&self, _len: usize, _sample_rate: SampleRate) {}

    /// The collector finished after the session had already returned.
    fn result_unclaimed(&self) {}

    fn stream_closed(&self) {}
}

/// Forwards session events to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl SessionObserver for LogObserver {
    fn stream_opened(&self, direction: Direction) {
        log::info!("🔌 Opened {} stream", direction);
    }

    fn config_sent(&self) {
        log::debug!("Config message sent");
    }

    fn chunk_sent(&self, index: usize, len: usize, duration: Duration) {
        log::trace!("Sent chunk #{} ({} bytes, {:?})", index, len, duration);
    }

    fn fragment(&self, text: &str, is_final: bool, duration: Duration) {
        if is_final {
            log::info!("📝 Final: \"{}\" ({:.2}s)", text, duration.as_secs_f32());
        } else {
            log::debug!("Partial: \"{}\"", text);
        }
    }

    fn audio_fragment(&self, len: usize) {
        log::debug!("Received {} bytes of audio", len);
    }

    fn end_of_utterance(&self) {
        log::debug!("End of utterance");
    }

    fn remote_error(&self, domain: &str, reason: &str) {
        log::error!("❌ Service error [{}]: {}", domain, reason);
    }

    fn message_ignored(&self, direction: Direction, kind: &str) {
        log::debug!("Ignoring {} on a {} stream", kind, direction);
    }

    fn input_truncated(&self) {
        log::warn!("Service completed the stream before all input was sent");
    }

    fn synthesized(&self, len: usize, sample_rate: SampleRate) {
        log::info!("🔊 Synthesized {} bytes of audio at {}", len, sample_rate);
    }

    fn result_unclaimed(&self) {
        log::debug!("Session finished before the collector reported");
    }

    fn stream_closed(&self) {
        log::info!("Stream closed");
    }
}
