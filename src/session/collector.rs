use super::observer::SessionObserver;
use crate::error::{Result, SessionError};
use crate::protocol::{Direction, InboundMessage};
use crate::transport::{MessageReceiver, StreamHandle};
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// The assembled result of one stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Aggregate {
    /// Final fragments joined by single spaces
    Transcript(String),
    /// Audio fragments concatenated in arrival order
    Audio(Vec<u8>),
}

/// Drains the receive half of a stream on its own task.
pub(crate) struct ResponseCollector {
    direction: Direction,
    receiver: Box<dyn MessageReceiver>,
    observer: Arc<dyn SessionObserver>,
    handle: StreamHandle,
}

impl ResponseCollector {
    pub(crate) fn new(
        direction: Direction,
        receiver: Box<dyn MessageReceiver>,
        observer: Arc<dyn SessionObserver>,
        handle: StreamHandle,
    ) -> Self {
        Self {
            direction,
            receiver,
            observer,
            handle,
        }
    }

    /// Start collecting. The returned receiver yields exactly one result.
    pub(crate) fn spawn(self) -> (oneshot::Receiver<Result<Aggregate>>, JoinHandle<()>) {
        let (tx, rx) = oneshot::channel();
        let observer = Arc::clone(&self.observer);
        let task = tokio::spawn(async move {
            let result = self.collect().await;
            if tx.send(result).is_err() {
                observer.result_unclaimed();
            }
        });
        (rx, task)
    }

    async fn collect(mut self) -> Result<Aggregate> {
        let mut finals: Vec<String> = Vec::new();
        let mut audio: Vec<u8> = Vec::new();

        loop {
            let message = match self.receiver.recv().await {
                Ok(Some(message)) => message,
                Ok(None) => break,
                Err(e) => {
                    self.close();
                    return Err(SessionError::ReceiveFailed(e));
                }
            };

            match message {
                InboundMessage::Transcript(fragment) => {
                    self.observer
                        .fragment(&fragment.text, fragment.is_final, fragment.duration);
                    match self.direction {
                        Direction::Recognition if fragment.is_final => finals.push(fragment.text),
                        Direction::Recognition => {}
                        Direction::Synthesis => {
                            self.observer.message_ignored(self.direction, "transcript");
                        }
                    }
                }
                InboundMessage::Audio(samples) => match self.direction {
                    Direction::Synthesis => {
                        self.observer.audio_fragment(samples.len());
                        audio.extend_from_slice(&samples);
                    }
                    Direction::Recognition => {
                        self.observer.message_ignored(self.direction, "audio");
                    }
                },
                InboundMessage::EndOfUtterance => {
                    self.observer.end_of_utterance();
                    if self.direction == Direction::Synthesis {
                        break;
                    }
                }
                InboundMessage::Error { domain, reason } => {
                    self.observer.remote_error(&domain, &reason);
                    self.close();
                    return Err(SessionError::RemoteError { domain, reason });
                }
            }
        }

        match self.direction {
            Direction::Recognition => Ok(Aggregate::Transcript(finals.join(" "))),
            Direction::Synthesis if audio.is_empty() => Err(SessionError::NoAudioProduced),
            Direction::Synthesis => Ok(Aggregate::Audio(audio)),
        }
    }

    fn close(&self) {
        if self.handle.close() {
            self.observer.stream_closed();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::TranscriptFragment;
    use crate::session::observer::LogObserver;
    use crate::transport::{StreamCloser, TransportError};
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct Scripted(VecDeque<std::result::Result<Option<InboundMessage>, TransportError>>);

    #[async_trait::async_trait]
    impl MessageReceiver for Scripted {
        async fn recv(&mut self) -> std::result::Result<Option<InboundMessage>, TransportError> {
            self.0.pop_front().unwrap_or(Ok(None))
        }
    }

    struct Counter(Arc<AtomicUsize>);

    impl StreamCloser for Counter {
        fn close(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn transcript(text: &str, is_final: bool) -> InboundMessage {
        InboundMessage::Transcript(TranscriptFragment {
            text: text.to_string(),
            is_final,
            duration: Duration::from_millis(300),
        })
    }

    async fn run(
        direction: Direction,
        script: Vec<std::result::Result<Option<InboundMessage>, TransportError>>,
    ) -> (Result<Aggregate>, usize) {
        let closes = Arc::new(AtomicUsize::new(0));
        let handle = StreamHandle::new(Counter(Arc::clone(&closes)));
        let collector = ResponseCollector::new(
            direction,
            Box::new(Scripted(script.into())),
            Arc::new(LogObserver),
            handle.clone(),
        );

        let result = collector.collect().await;
        let explicit = closes.load(Ordering::SeqCst);
        drop(handle);
        (result, explicit)
    }

    #[tokio::test]
    async fn test_only_final_fragments_are_joined() {
        let (result, _) = run(
            Direction::Recognition,
            vec![
                Ok(Some(transcript("hel", false))),
                Ok(Some(transcript("hello", true))),
                Ok(Some(InboundMessage::EndOfUtterance)),
                Ok(Some(transcript("world", true))),
            ],
        )
        .await;

        assert_eq!(
            result.unwrap(),
            Aggregate::Transcript("hello world".to_string())
        );
    }

    #[tokio::test]
    async fn test_no_fragments_is_empty_transcript() {
        let (result, _) = run(Direction::Recognition, vec![]).await;
        assert_eq!(result.unwrap(), Aggregate::Transcript(String::new()));
    }

    #[tokio::test]
    async fn test_remote_error_discards_partial_data() {
        let (result, closes) = run(
            Direction::Recognition,
            vec![
                Ok(Some(transcript("hello", true))),
                Ok(Some(InboundMessage::Error {
                    domain: "ASR".to_string(),
                    reason: "bad audio".to_string(),
                })),
            ],
        )
        .await;

        assert!(matches!(result, Err(SessionError::RemoteError { ref reason, .. }) if reason == "bad audio"));
        assert_eq!(closes, 1);
    }

    #[tokio::test]
    async fn test_receive_error_closes_stream() {
        let (result, closes) = run(
            Direction::Synthesis,
            vec![
                Ok(Some(InboundMessage::Audio(vec![1, 2]))),
                Err(TransportError::Closed),
            ],
        )
        .await;

        assert!(matches!(result, Err(SessionError::ReceiveFailed(_))));
        assert_eq!(closes, 1);
    }

    #[tokio::test]
    async fn test_synthesis_stops_at_end_of_utterance() {
        let (result, closes) = run(
            Direction::Synthesis,
            vec![
                Ok(Some(InboundMessage::Audio(vec![1, 2]))),
                Ok(Some(transcript("ignored", true))),
                Ok(Some(InboundMessage::Audio(vec![3, 4]))),
                Ok(Some(InboundMessage::EndOfUtterance)),
                Ok(Some(InboundMessage::Audio(vec![5, 6]))),
            ],
        )
        .await;

        assert_eq!(result.unwrap(), Aggregate::Audio(vec![1, 2, 3, 4]));
        assert_eq!(closes, 0, "success leaves closing to the session");
    }

    #[derive(Default)]
    struct Unclaimed(AtomicUsize);

    impl SessionObserver for Unclaimed {
        fn result_unclaimed(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn test_late_result_is_reported_to_observer() {
        let observer = Arc::new(Unclaimed::default());
        let collector = ResponseCollector::new(
            Direction::Recognition,
            Box::new(Scripted(vec![Ok(Some(transcript("late", true)))].into())),
            observer.clone(),
            StreamHandle::new(Counter(Arc::new(AtomicUsize::new(0)))),
        );

        let (rx, task) = collector.spawn();
        drop(rx);
        task.await.unwrap();

        assert_eq!(observer.0.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_synthesis_without_audio_fails() {
        let (result, _) = run(
            Direction::Synthesis,
            vec![Ok(Some(InboundMessage::EndOfUtterance))],
        )
        .await;

        assert!(matches!(result, Err(SessionError::NoAudioProduced)));
    }
}
