use crate::audio::CodecError;
use crate::transport::TransportError;
use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SessionError>;

/// Everything a streaming session can fail with. Only one error is ever
/// reported per call: the first one either side of the stream hit.
#[derive(Error, Debug)]
pub enum SessionError {
    /// Missing or malformed session parameters. Not retryable.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to open stream: {0}")]
    Open(#[source] TransportError),

    #[error("Send failed while sending {stage}: {source}")]
    SendFailed {
        stage: String,
        #[source]
        source: TransportError,
    },

    #[error("Receive failed: {0}")]
    ReceiveFailed(#[source] TransportError),

    /// Authoritative rejection reported by the service.
    #[error("Remote error [{domain}]: {reason}")]
    RemoteError { domain: String, reason: String },

    #[error("Synthesis finished without producing audio")]
    NoAudioProduced,

    #[error("Audio codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("Session timed out after {0:?}")]
    TimedOut(Duration),

    #[error("Session cancelled")]
    Cancelled,

    #[error("Response collector ended without reporting a result")]
    CollectorLost,
}

impl SessionError {
    pub fn send_failed(stage: impl Into<String>, source: TransportError) -> Self {
        SessionError::SendFailed {
            stage: stage.into(),
            source,
        }
    }

    /// True for transport-level failures where re-running the whole session
    /// may succeed.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            SessionError::Open(_) | SessionError::SendFailed { .. } | SessionError::ReceiveFailed(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_carry_context() {
        let err = SessionError::send_failed("payload #2", TransportError::Closed);
        assert_eq!(
            err.to_string(),
            "Send failed while sending payload #2: Stream closed"
        );
        assert!(err.is_transport());

        let err = SessionError::RemoteError {
            domain: "ASR".to_string(),
            reason: "grammar compilation failed".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Remote error [ASR]: grammar compilation failed"
        );
        assert!(!err.is_transport());
    }

    #[test]
    fn test_malformed_pcm_converts() {
        let err: SessionError = CodecError::MalformedPcm { len: 3 }.into();
        assert!(matches!(
            err,
            SessionError::Codec(CodecError::MalformedPcm { len: 3 })
        ));
    }
}
