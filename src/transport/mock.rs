//! Scripted in-process channel for exercising sessions without a network.
//!
//! The mock behaves like the real service by default: it answers only after
//! the client half-closes, then plays back its scripted responses in order
//! and ends the stream.

use super::{
    DuplexStream, FrameSender, MessageReceiver, SpeechChannel, StreamCloser, StreamHandle,
    TransportError,
};
use crate::protocol::{Direction, InboundMessage, OutboundFrame, TranscriptFragment};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone)]
pub enum MockResponse {
    Message(InboundMessage),
    /// Transport-level receive failure
    Fail(String),
}

#[derive(Debug, Clone, Default)]
pub struct MockScript {
    responses: Vec<MockResponse>,
    fail_send_at: Option<usize>,
    respond_immediately: bool,
    stall: bool,
}

impl MockScript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn message(mut self, message: InboundMessage) -> Self {
        self.responses.push(MockResponse::Message(message));
        self
    }

    pub fn transcript(self, text: &str, is_final: bool) -> Self {
        self.message(InboundMessage::Transcript(TranscriptFragment {
            text: text.to_string(),
            is_final,
            duration: Duration::from_millis(500),
        }))
    }

    pub fn audio(self, samples: Vec<u8>) -> Self {
        self.message(InboundMessage::Audio(samples))
    }

    pub fn end_of_utterance(self) -> Self {
        self.message(InboundMessage::EndOfUtterance)
    }

    pub fn remote_error(self, domain: &str, reason: &str) -> Self {
        self.message(InboundMessage::Error {
            domain: domain.to_string(),
            reason: reason.to_string(),
        })
    }

    pub fn receive_error(mut self, message: &str) -> Self {
        self.responses.push(MockResponse::Fail(message.to_string()));
        self
    }

    /// Fail the `index`-th outbound frame (0 is the config message).
    pub fn fail_send_at(mut self, index: usize) -> Self {
        self.fail_send_at = Some(index);
        self
    }

    /// Deliver responses without waiting for the client to half-close.
    pub fn respond_immediately(mut self) -> Self {
        self.respond_immediately = true;
        self
    }

    /// Never end the stream once the scripted responses are exhausted.
    pub fn stall(mut self) -> Self {
        self.stall = true;
        self
    }
}

#[derive(Default)]
struct MockState {
    sent: Mutex<Vec<OutboundFrame>>,
    directions: Mutex<Vec<Direction>>,
    closes: AtomicUsize,
    half_closes: AtomicUsize,
}

pub struct MockChannel {
    script: MockScript,
    open_error: Option<String>,
    state: Arc<MockState>,
}

impl MockChannel {
    pub fn new(script: MockScript) -> Self {
        Self {
            script,
            open_error: None,
            state: Arc::new(MockState::default()),
        }
    }

    /// A channel whose every `open` fails.
    pub fn unreachable(message: &str) -> Self {
        Self {
            open_error: Some(message.to_string()),
            ..Self::new(MockScript::new())
        }
    }

    /// Frames accepted by the mock, in send order.
    pub fn sent_frames(&self) -> Vec<OutboundFrame> {
        self.state
            .sent
            .lock()
            .map(|sent| sent.clone())
            .unwrap_or_default()
    }

    pub fn opened(&self) -> Vec<Direction> {
        self.state
            .directions
            .lock()
            .map(|d| d.clone())
            .unwrap_or_default()
    }

    pub fn close_count(&self) -> usize {
        self.state.closes.load(Ordering::SeqCst)
    }

    pub fn half_close_count(&self) -> usize {
        self.state.half_closes.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl SpeechChannel for MockChannel {
    async fn open(&self, direction: Direction) -> Result<DuplexStream, TransportError> {
        if let Some(message) = &self.open_error {
            return Err(TransportError::Connect(message.clone()));
        }
        if let Ok(mut directions) = self.state.directions.lock() {
            directions.push(direction);
        }

        let half_closed = CancellationToken::new();
        let closed = CancellationToken::new();

        let sender = MockSender {
            state: Arc::clone(&self.state),
            next_index: 0,
            fail_at: self.script.fail_send_at,
            half_closed: half_closed.clone(),
            closed: closed.clone(),
        };
        let receiver = MockReceiver {
            responses: self.script.responses.iter().cloned().collect(),
            await_half_close: !self.script.respond_immediately,
            stall: self.script.stall,
            half_closed,
            closed: closed.clone(),
        };
        let handle = StreamHandle::new(MockCloser {
            state: Arc::clone(&self.state),
            closed,
        });

        Ok(DuplexStream {
            sender: Box::new(sender),
            receiver: Box::new(receiver),
            handle,
        })
    }
}

struct MockSender {
    state: Arc<MockState>,
    next_index: usize,
    fail_at: Option<usize>,
    half_closed: CancellationToken,
    closed: CancellationToken,
}

#[async_trait::async_trait]
impl FrameSender for MockSender {
    async fn send(&mut self, frame: OutboundFrame) -> Result<(), TransportError> {
        if self.half_closed.is_cancelled() || self.closed.is_cancelled() {
            return Err(TransportError::Closed);
        }

        let index = self.next_index;
        self.next_index += 1;
        if self.fail_at == Some(index) {
            return Err(TransportError::Status(tonic::Status::unavailable(format!(
                "injected send failure at frame {}",
                index
            ))));
        }

        if let Ok(mut sent) = self.state.sent.lock() {
            sent.push(frame);
        }
        Ok(())
    }

    async fn close_send(&mut self) -> Result<(), TransportError> {
        self.state.half_closes.fetch_add(1, Ordering::SeqCst);
        self.half_closed.cancel();
        Ok(())
    }
}

struct MockReceiver {
    responses: VecDeque<MockResponse>,
    await_half_close: bool,
    stall: bool,
    half_closed: CancellationToken,
    closed: CancellationToken,
}

#[async_trait::async_trait]
impl MessageReceiver for MockReceiver {
    async fn recv(&mut self) -> Result<Option<InboundMessage>, TransportError> {
        if self.await_half_close {
            tokio::select! {
                _ = self.closed.cancelled() => return Err(TransportError::Closed),
                _ = self.half_closed.cancelled() => {}
            }
            self.await_half_close = false;
        }
        if self.closed.is_cancelled() {
            return Err(TransportError::Closed);
        }

        match self.responses.pop_front() {
            Some(MockResponse::Message(message)) => Ok(Some(message)),
            Some(MockResponse::Fail(message)) => {
                Err(TransportError::Status(tonic::Status::internal(message)))
            }
            None if self.stall => {
                self.closed.cancelled().await;
                Err(TransportError::Closed)
            }
            None => Ok(None),
        }
    }
}

struct MockCloser {
    state: Arc<MockState>,
    closed: CancellationToken,
}

impl StreamCloser for MockCloser {
    fn close(&self) {
        self.state.closes.fetch_add(1, Ordering::SeqCst);
        self.closed.cancel();
    }
}
