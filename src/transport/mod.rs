//! The duplex stream seam between the session core and the wire.
//!
//! A [`SpeechChannel`] opens one [`DuplexStream`] per session. Its two halves
//! are moved into independent tasks; the [`StreamHandle`] is shared by both
//! and releases the underlying call exactly once.

pub mod grpc;
pub mod mock;

use crate::protocol::{Direction, InboundMessage, OutboundFrame};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("gRPC status: {0}")]
    Status(#[from] tonic::Status),

    #[error("Connection failed: {0}")]
    Connect(String),

    #[error("Stream closed")]
    Closed,

    #[error("Frame not supported on this stream: {0}")]
    UnsupportedFrame(String),

    #[error("Invalid request metadata: {0}")]
    InvalidMetadata(String),
}

/// Write half of a stream.
#[async_trait::async_trait]
pub trait FrameSender: Send {
    async fn send(&mut self, frame: OutboundFrame) -> Result<(), TransportError>;

    /// Half-close: no more frames will be sent on this stream.
    async fn close_send(&mut self) -> Result<(), TransportError>;
}

/// Read half of a stream. `Ok(None)` is end-of-input.
#[async_trait::async_trait]
pub trait MessageReceiver: Send {
    async fn recv(&mut self) -> Result<Option<InboundMessage>, TransportError>;
}

/// Releases whatever the transport holds for one stream.
pub trait StreamCloser: Send + Sync {
    fn close(&self);
}

/// Opens streams against the service. Implementations are expected to be
/// already authenticated.
#[async_trait::async_trait]
pub trait SpeechChannel: Send + Sync {
    async fn open(&self, direction: Direction) -> Result<DuplexStream, TransportError>;
}

pub struct DuplexStream {
    pub sender: Box<dyn FrameSender>,
    pub receiver: Box<dyn MessageReceiver>,
    pub handle: StreamHandle,
}

struct HandleInner {
    closed: AtomicBool,
    closer: Box<dyn StreamCloser>,
}

impl HandleInner {
    fn close(&self) -> bool {
        if self.closed.swap(true, Ordering::AcqRel) {
            return false;
        }
        self.closer.close();
        true
    }
}

impl Drop for HandleInner {
    fn drop(&mut self) {
        if self.close() {
            log::debug!("Stream released on drop");
        }
    }
}

/// Shared, idempotent close guard for one stream.
///
/// Either task may call [`StreamHandle::close`]; only the first call reaches
/// the transport. If nobody closes explicitly, the last clone to be dropped
/// does.
#[derive(Clone)]
pub struct StreamHandle {
    inner: Arc<HandleInner>,
}

impl StreamHandle {
    pub fn new(closer: impl StreamCloser + 'static) -> Self {
        Self {
            inner: Arc::new(HandleInner {
                closed: AtomicBool::new(false),
                closer: Box::new(closer),
            }),
        }
    }

    /// Returns true if this call performed the close.
    pub fn close(&self) -> bool {
        self.inner.close()
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }
}

impl std::fmt::Debug for StreamHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamHandle")
            .field("closed", &self.is_closed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    struct CountingCloser(Arc<AtomicUsize>);

    impl StreamCloser for CountingCloser {
        fn close(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_close_is_idempotent_across_clones() {
        let count = Arc::new(AtomicUsize::new(0));
        let handle = StreamHandle::new(CountingCloser(Arc::clone(&count)));
        let other = handle.clone();

        assert!(handle.close());
        assert!(!other.close());
        assert!(!handle.close());
        drop(handle);
        drop(other);

        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_drop_closes_unclosed_stream() {
        let count = Arc::new(AtomicUsize::new(0));
        let handle = StreamHandle::new(CountingCloser(Arc::clone(&count)));
        let other = handle.clone();

        drop(handle);
        assert_eq!(count.load(Ordering::SeqCst), 0);
        drop(other);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
