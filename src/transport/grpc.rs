//! tonic-backed transport for the Speech Center services.
//!
//! Outbound frames are pushed through a bounded mpsc channel that backs the
//! streaming request body. The RPC itself is started lazily by the first
//! `recv`, so the collector task drives the call while the sender fills the
//! request stream; half-close drops the channel sender.

use super::{
    DuplexStream, FrameSender, MessageReceiver, SpeechChannel, StreamCloser, StreamHandle,
    TransportError,
};
use crate::config::ClientConfig;
use crate::protocol::{
    Direction, InboundMessage, OutboundFrame, RecognitionConfig, RecognitionResource, SampleRate,
    SessionConfig, SynthesisConfig, Topic, TranscriptFragment,
};
use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use service_protos::recognizer::{
    recognition_request, recognition_resource, recognition_response, RecognitionInit,
    RecognitionParameters, RecognitionRequest, RecognitionResponse,
};
use service_protos::texttospeech::{
    self as tts, streaming_synthesis_request, streaming_synthesis_response,
    StreamingSynthesisRequest, StreamingSynthesisResponse, VoiceSamplingRate,
};
use service_protos::{SpeechRecognizerClient, TextToSpeechClient};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;
use tonic::metadata::{Ascii, MetadataValue};
use tonic::transport::{Channel, ClientTlsConfig, Endpoint};
use tonic::Streaming;

/// Outbound frames buffered ahead of the HTTP/2 flow-control window.
const OUTBOUND_BUFFER: usize = 32;
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// An authenticated connection able to open either stream direction.
#[derive(Clone)]
pub struct GrpcChannel {
    channel: Channel,
    authorization: MetadataValue<Ascii>,
}

impl GrpcChannel {
    /// Dial the configured endpoint over TLS.
    pub async fn connect(config: &ClientConfig) -> Result<Self, TransportError> {
        let uri = config.endpoint_uri();
        log::info!("Connecting to {}", uri);

        let mut endpoint = Endpoint::from_shared(uri.clone())
            .map_err(|e| TransportError::Connect(format!("invalid endpoint {}: {}", uri, e)))?
            .connect_timeout(CONNECT_TIMEOUT);

        if uri.starts_with("https://") {
            endpoint = endpoint
                .tls_config(ClientTlsConfig::new().with_webpki_roots())
                .map_err(|e| TransportError::Connect(format!("TLS config error: {}", e)))?;
        }

        let channel = endpoint
            .connect()
            .await
            .map_err(|e| TransportError::Connect(e.to_string()))?;

        log::info!("Connected to {}", uri);
        Self::new(channel, config.token())
    }

    /// Wrap an existing channel, attaching `token` as a bearer credential to
    /// every call.
    pub fn new(channel: Channel, token: &str) -> Result<Self, TransportError> {
        let authorization = format!("Bearer {}", token)
            .parse::<MetadataValue<Ascii>>()
            .map_err(|_| {
                TransportError::InvalidMetadata("token is not valid header text".to_string())
            })?;

        Ok(Self {
            channel,
            authorization,
        })
    }

    fn request<T>(&self, rx: mpsc::Receiver<T>) -> tonic::Request<ReceiverStream<T>> {
        let mut request = tonic::Request::new(ReceiverStream::new(rx));
        request
            .metadata_mut()
            .insert("authorization", self.authorization.clone());
        request
    }

    fn open_recognition(&self) -> DuplexStream {
        let (tx, rx) = mpsc::channel(OUTBOUND_BUFFER);
        let request = self.request(rx);
        let mut client = SpeechRecognizerClient::new(self.channel.clone());
        let call = async move {
            client
                .recognize_stream(request)
                .await
                .map(tonic::Response::into_inner)
        }
        .boxed();

        assemble(tx, call, encode_recognition, decode_recognition)
    }

    fn open_synthesis(&self) -> DuplexStream {
        let (tx, rx) = mpsc::channel(OUTBOUND_BUFFER);
        let request = self.request(rx);
        let mut client = TextToSpeechClient::new(self.channel.clone());
        let call = async move {
            client
                .streaming_synthesize_speech(request)
                .await
                .map(tonic::Response::into_inner)
        }
        .boxed();

        assemble(tx, call, encode_synthesis, decode_synthesis)
    }
}

#[async_trait::async_trait]
impl SpeechChannel for GrpcChannel {
    async fn open(&self, direction: Direction) -> Result<DuplexStream, TransportError> {
        Ok(match direction {
            Direction::Recognition => self.open_recognition(),
            Direction::Synthesis => self.open_synthesis(),
        })
    }
}

fn assemble<Req, Resp>(
    tx: mpsc::Sender<Req>,
    call: BoxFuture<'static, Result<Streaming<Resp>, tonic::Status>>,
    encode: fn(OutboundFrame) -> Result<Option<Req>, TransportError>,
    decode: fn(Resp) -> Option<InboundMessage>,
) -> DuplexStream
where
    Req: Send + 'static,
    Resp: Send + 'static,
{
    let cancel = CancellationToken::new();
    DuplexStream {
        sender: Box::new(GrpcSender {
            tx: Some(tx),
            encode,
        }),
        receiver: Box::new(GrpcReceiver {
            state: CallState::Pending(call),
            cancel: cancel.clone(),
            decode,
        }),
        handle: StreamHandle::new(CancelOnClose(cancel)),
    }
}

struct GrpcSender<Req> {
    tx: Option<mpsc::Sender<Req>>,
    encode: fn(OutboundFrame) -> Result<Option<Req>, TransportError>,
}

#[async_trait::async_trait]
impl<Req: Send + 'static> FrameSender for GrpcSender<Req> {
    async fn send(&mut self, frame: OutboundFrame) -> Result<(), TransportError> {
        let tx = self.tx.as_ref().ok_or(TransportError::Closed)?;
        match (self.encode)(frame)? {
            Some(request) => tx.send(request).await.map_err(|_| TransportError::Closed),
            None => Ok(()),
        }
    }

    async fn close_send(&mut self) -> Result<(), TransportError> {
        // Dropping the sender ends the request stream, which tonic turns
        // into END_STREAM on the HTTP/2 request body.
        self.tx.take();
        Ok(())
    }
}

enum CallState<Resp> {
    Pending(BoxFuture<'static, Result<Streaming<Resp>, tonic::Status>>),
    Open(Streaming<Resp>),
    Finished,
}

struct GrpcReceiver<Resp> {
    state: CallState<Resp>,
    cancel: CancellationToken,
    decode: fn(Resp) -> Option<InboundMessage>,
}

#[async_trait::async_trait]
impl<Resp: Send + 'static> MessageReceiver for GrpcReceiver<Resp> {
    async fn recv(&mut self) -> Result<Option<InboundMessage>, TransportError> {
        let Self {
            state,
            cancel,
            decode,
        } = self;

        loop {
            match state {
                CallState::Pending(call) => {
                    let streaming = tokio::select! {
                        _ = cancel.cancelled() => return Err(TransportError::Closed),
                        result = call => result?,
                    };
                    *state = CallState::Open(streaming);
                }
                CallState::Open(streaming) => {
                    let next = tokio::select! {
                        _ = cancel.cancelled() => return Err(TransportError::Closed),
                        result = streaming.message() => result?,
                    };
                    match next {
                        Some(response) => {
                            if let Some(message) = decode(response) {
                                return Ok(Some(message));
                            }
                            log::debug!("Skipping empty response");
                        }
                        None => {
                            *state = CallState::Finished;
                            return Ok(None);
                        }
                    }
                }
                CallState::Finished => return Ok(None),
            }
        }
    }
}

struct CancelOnClose(CancellationToken);

impl StreamCloser for CancelOnClose {
    fn close(&self) {
        self.0.cancel();
    }
}

fn unsupported(frame: &OutboundFrame, direction: Direction) -> TransportError {
    TransportError::UnsupportedFrame(format!("{} frame on a {} stream", frame.kind(), direction))
}

fn encode_recognition(frame: OutboundFrame) -> Result<Option<RecognitionRequest>, TransportError> {
    let union = match frame {
        OutboundFrame::Config(SessionConfig::Recognition(config)) => {
            recognition_request::RequestUnion::Init(recognition_init(config))
        }
        OutboundFrame::Audio(samples) => recognition_request::RequestUnion::Audio(samples),
        // The recognizer takes end of audio from the half-close.
        OutboundFrame::EndOfStream => return Ok(None),
        other => return Err(unsupported(&other, Direction::Recognition)),
    };

    Ok(Some(RecognitionRequest {
        request_union: Some(union),
    }))
}

fn recognition_init(config: RecognitionConfig) -> RecognitionInit {
    let resource = match config.resource {
        RecognitionResource::Grammar(grammar) => {
            recognition_resource::Resource::InlineGrammar(grammar)
        }
        RecognitionResource::Topic(topic) => {
            let model = match topic {
                Topic::Generic => recognition_resource::Model::Generic,
                Topic::Banking => recognition_resource::Model::Banking,
                Topic::Telco => recognition_resource::Model::Telco,
            };
            recognition_resource::Resource::Model(model as i32)
        }
    };

    RecognitionInit {
        parameters: Some(RecognitionParameters {
            language: config.language,
            sample_rate_hz: config.sample_rate_hz,
        }),
        resource: Some(service_protos::recognizer::RecognitionResource {
            resource: Some(resource),
        }),
    }
}

fn decode_recognition(response: RecognitionResponse) -> Option<InboundMessage> {
    match response.response_union? {
        recognition_response::ResponseUnion::Result(result) => {
            Some(InboundMessage::Transcript(TranscriptFragment {
                text: result.text,
                is_final: result.is_final,
                duration: Duration::try_from_secs_f32(result.duration).unwrap_or_default(),
            }))
        }
        recognition_response::ResponseUnion::Error(error) => Some(InboundMessage::Error {
            domain: error.domain,
            reason: error.reason,
        }),
    }
}

fn encode_synthesis(
    frame: OutboundFrame,
) -> Result<Option<StreamingSynthesisRequest>, TransportError> {
    let request = match frame {
        OutboundFrame::Config(SessionConfig::Synthesis(config)) => {
            streaming_synthesis_request::SynthesisRequest::Config(synthesis_config(config))
        }
        OutboundFrame::Text(text) => streaming_synthesis_request::SynthesisRequest::Text(text),
        OutboundFrame::EndOfStream => {
            streaming_synthesis_request::SynthesisRequest::EndOfUtterance(tts::EndOfUtterance {})
        }
        other => return Err(unsupported(&other, Direction::Synthesis)),
    };

    Ok(Some(StreamingSynthesisRequest {
        synthesis_request: Some(request),
    }))
}

fn synthesis_config(config: SynthesisConfig) -> tts::SynthesisConfig {
    let sampling_rate = match config.sample_rate {
        SampleRate::Hz8000 => VoiceSamplingRate::VoiceSamplingRate8khz,
        SampleRate::Hz16000 => VoiceSamplingRate::VoiceSamplingRate16khz,
    };

    tts::SynthesisConfig {
        voice: config.voice,
        sampling_rate: sampling_rate as i32,
    }
}

fn decode_synthesis(response: StreamingSynthesisResponse) -> Option<InboundMessage> {
    match response.synthesis_response? {
        streaming_synthesis_response::SynthesisResponse::StreamingAudio(audio) => {
            Some(InboundMessage::Audio(audio.audio_samples))
        }
        streaming_synthesis_response::SynthesisResponse::EndOfUtterance(_) => {
            Some(InboundMessage::EndOfUtterance)
        }
        streaming_synthesis_response::SynthesisResponse::Error(error) => {
            Some(InboundMessage::Error {
                domain: error.domain,
                reason: error.reason,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use service_protos::recognizer::{RecognitionError, RecognitionResult};

    #[test]
    fn test_topic_maps_to_model() {
        let frame = OutboundFrame::Config(SessionConfig::Recognition(RecognitionConfig {
            resource: RecognitionResource::Topic(Topic::Telco),
            language: "es-ES".to_string(),
            sample_rate_hz: 8000,
        }));

        let request = encode_recognition(frame).unwrap().unwrap();
        let Some(recognition_request::RequestUnion::Init(init)) = request.request_union else {
            panic!("expected init request");
        };
        assert_eq!(init.parameters.unwrap().language, "es-ES");
        assert_eq!(
            init.resource.unwrap().resource,
            Some(recognition_resource::Resource::Model(
                recognition_resource::Model::Telco as i32
            ))
        );
    }

    #[test]
    fn test_recognition_end_of_stream_is_half_close_only() {
        assert!(encode_recognition(OutboundFrame::EndOfStream)
            .unwrap()
            .is_none());
        assert!(matches!(
            encode_recognition(OutboundFrame::Text("hi".to_string())),
            Err(TransportError::UnsupportedFrame(_))
        ));
    }

    #[test]
    fn test_synthesis_frames() {
        let config = encode_synthesis(OutboundFrame::Config(SessionConfig::Synthesis(
            SynthesisConfig {
                voice: "tommy_en_us".to_string(),
                sample_rate: SampleRate::Hz16000,
            },
        )))
        .unwrap()
        .unwrap();
        assert_eq!(
            config.synthesis_request,
            Some(streaming_synthesis_request::SynthesisRequest::Config(
                tts::SynthesisConfig {
                    voice: "tommy_en_us".to_string(),
                    sampling_rate: VoiceSamplingRate::VoiceSamplingRate16khz as i32,
                }
            ))
        );

        let end = encode_synthesis(OutboundFrame::EndOfStream).unwrap().unwrap();
        assert!(matches!(
            end.synthesis_request,
            Some(streaming_synthesis_request::SynthesisRequest::EndOfUtterance(_))
        ));
        assert!(encode_synthesis(OutboundFrame::Audio(vec![0, 0])).is_err());
    }

    #[test]
    fn test_decode_recognition_messages() {
        let fragment = decode_recognition(RecognitionResponse {
            response_union: Some(recognition_response::ResponseUnion::Result(
                RecognitionResult {
                    text: "hello".to_string(),
                    is_final: true,
                    duration: 1.5,
                },
            )),
        });
        assert_eq!(
            fragment,
            Some(InboundMessage::Transcript(TranscriptFragment {
                text: "hello".to_string(),
                is_final: true,
                duration: Duration::from_millis(1500),
            }))
        );

        let error = decode_recognition(RecognitionResponse {
            response_union: Some(recognition_response::ResponseUnion::Error(
                RecognitionError {
                    domain: "ASR".to_string(),
                    reason: "bad grammar".to_string(),
                },
            )),
        });
        assert!(matches!(error, Some(InboundMessage::Error { .. })));

        assert_eq!(
            decode_recognition(RecognitionResponse {
                response_union: None
            }),
            None
        );
    }

    #[test]
    fn test_negative_duration_is_clamped() {
        let fragment = decode_recognition(RecognitionResponse {
            response_union: Some(recognition_response::ResponseUnion::Result(
                RecognitionResult {
                    text: "x".to_string(),
                    is_final: false,
                    duration: -1.0,
                },
            )),
        });
        let Some(InboundMessage::Transcript(fragment)) = fragment else {
            panic!("expected transcript");
        };
        assert_eq!(fragment.duration, Duration::ZERO);
    }

    #[tokio::test]
    async fn test_bearer_metadata_is_attached() {
        let channel = Endpoint::from_static("http://localhost:50051").connect_lazy();
        let grpc = GrpcChannel::new(channel, "secret-token").unwrap();

        let (_tx, rx) = mpsc::channel::<RecognitionRequest>(1);
        let request = grpc.request(rx);
        assert_eq!(
            request
                .metadata()
                .get("authorization")
                .unwrap()
                .to_str()
                .unwrap(),
            "Bearer secret-token"
        );
    }

    #[tokio::test]
    async fn test_token_must_be_header_safe() {
        let channel = Endpoint::from_static("http://localhost:50051").connect_lazy();
        assert!(matches!(
            GrpcChannel::new(channel, "line\nbreak"),
            Err(TransportError::InvalidMetadata(_))
        ));
    }
}
