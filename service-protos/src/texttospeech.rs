//! `speechcenter.tts.v1`
//!
//! Reconstructed definitions, not a copy of the service's `.proto`. Field
//! names follow the generated client identifiers, including the
//! `VoiceSamplingRate_*` constants. Tags are assigned in declaration order.
//!
//! ```protobuf
//! service TextToSpeech {
//!     rpc StreamingSynthesizeSpeech(stream StreamingSynthesisRequest)
//!         returns (stream StreamingSynthesisResponse);
//! }
//!
//! enum VoiceSamplingRate {
//!     VOICE_SAMPLING_RATE_UNSPECIFIED = 0;
//!     VOICE_SAMPLING_RATE_8KHZ = 1;
//!     VOICE_SAMPLING_RATE_16KHZ = 2;
//! }
//!
//! message StreamingSynthesisRequest {
//!     oneof synthesis_request {
//!         SynthesisConfig config = 1;
//!         string text = 2;
//!         EndOfUtterance end_of_utterance = 3;
//!     }
//! }
//!
//! message SynthesisConfig {
//!     string voice = 1;
//!     VoiceSamplingRate sampling_rate = 2;
//! }
//!
//! message StreamingSynthesisResponse {
//!     oneof synthesis_response {
//!         StreamingAudio streaming_audio = 1;
//!         EndOfUtterance end_of_utterance = 2;
//!         SynthesisError error = 3;
//!     }
//! }
//!
//! message StreamingAudio { bytes audio_samples = 1; }
//! message EndOfUtterance {}
//! message SynthesisError { string domain = 1; string reason = 2; }
//! ```

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum VoiceSamplingRate {
    Unspecified = 0,
    VoiceSamplingRate8khz = 1,
    VoiceSamplingRate16khz = 2,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StreamingSynthesisRequest {
    #[prost(oneof = "streaming_synthesis_request::SynthesisRequest", tags = "1, 2, 3")]
    pub synthesis_request:
        ::core::option::Option<streaming_synthesis_request::SynthesisRequest>,
}

pub mod streaming_synthesis_request {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum SynthesisRequest {
        #[prost(message, tag = "1")]
        Config(super::SynthesisConfig),
        #[prost(string, tag = "2")]
        Text(::prost::alloc::string::String),
        #[prost(message, tag = "3")]
        EndOfUtterance(super::EndOfUtterance),
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SynthesisConfig {
    #[prost(string, tag = "1")]
    pub voice: ::prost::alloc::string::String,
    #[prost(enumeration = "VoiceSamplingRate", tag = "2")]
    pub sampling_rate: i32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StreamingSynthesisResponse {
    #[prost(oneof = "streaming_synthesis_response::SynthesisResponse", tags = "1, 2, 3")]
    pub synthesis_response:
        ::core::option::Option<streaming_synthesis_response::SynthesisResponse>,
}

pub mod streaming_synthesis_response {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum SynthesisResponse {
        #[prost(message, tag = "1")]
        StreamingAudio(super::StreamingAudio),
        #[prost(message, tag = "2")]
        EndOfUtterance(super::EndOfUtterance),
        #[prost(message, tag = "3")]
        Error(super::SynthesisError),
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StreamingAudio {
    #[prost(bytes = "vec", tag = "1")]
    pub audio_samples: ::prost::alloc::vec::Vec<u8>,
}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct EndOfUtterance {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SynthesisError {
    #[prost(string, tag = "1")]
    pub domain: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub reason: ::prost::alloc::string::String,
}

pub mod text_to_speech_client {
    #![allow(unused_variables, dead_code, missing_docs, clippy::let_unit_value)]
    use tonic::codegen::http::uri::PathAndQuery;
    use tonic::codegen::*;

    const SERVICE: &str = "speechcenter.tts.v1.TextToSpeech";

    #[derive(Debug, Clone)]
    pub struct TextToSpeechClient<T> {
        inner: tonic::client::Grpc<T>,
    }

    impl<T> TextToSpeechClient<T>
    where
        T: tonic::client::GrpcService<tonic::body::Body>,
        T::Error: Into<StdError>,
        T::ResponseBody: Body<Data = Bytes> + std::marker::Send + 'static,
        <T::ResponseBody as Body>::Error: Into<StdError> + std::marker::Send,
    {
        pub fn new(inner: T) -> Self {
            let inner = tonic::client::Grpc::new(inner);
            Self { inner }
        }

        pub async fn streaming_synthesize_speech(
            &mut self,
            request: impl tonic::IntoStreamingRequest<Message = super::StreamingSynthesisRequest>,
        ) -> std::result::Result<
            tonic::Response<tonic::codec::Streaming<super::StreamingSynthesisResponse>>,
            tonic::Status,
        > {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::unknown(format!("Service was not ready: {}", e.into()))
            })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = PathAndQuery::from_static(
                "/speechcenter.tts.v1.TextToSpeech/StreamingSynthesizeSpeech",
            );
            let mut req = request.into_streaming_request();
            req.extensions_mut()
                .insert(GrpcMethod::new(SERVICE, "StreamingSynthesizeSpeech"));
            self.inner.streaming(req, path, codec).await
        }
    }
}
