//! `speechcenter.recognizer.v1`
//!
//! Reconstructed definitions, not a copy of the service's `.proto`. The
//! request side is aligned with the generated client identifiers
//! `RecognitionRequest_Init`, `RecognitionRequest_Audio`,
//! `RecognitionResource_InlineGrammar` and `RecognitionResource_Model_`.
//! Those clients read `Text` straight off `RecognitionResponse`, so the
//! result/error oneof below is inferred rather than taken from the schema.
//!
//! ```protobuf
//! service SpeechRecognizer {
//!     rpc RecognizeStream(stream RecognitionRequest) returns (stream RecognitionResponse);
//! }
//!
//! message RecognitionRequest {
//!     oneof request_union {
//!         RecognitionInit init = 1;
//!         bytes audio = 2;
//!     }
//! }
//!
//! message RecognitionInit {
//!     RecognitionParameters parameters = 1;
//!     RecognitionResource resource = 2;
//! }
//!
//! message RecognitionParameters {
//!     string language = 1;
//!     uint32 sample_rate_hz = 2;
//! }
//!
//! message RecognitionResource {
//!     enum Model { GENERIC = 0; BANKING = 1; TELCO = 2; }
//!     oneof resource {
//!         string inline_grammar = 1;
//!         Model model = 2;
//!     }
//! }
//!
//! message RecognitionResponse {
//!     oneof response_union {
//!         RecognitionResult result = 1;
//!         RecognitionError error = 2;
//!     }
//! }
//!
//! message RecognitionResult {
//!     string text = 1;
//!     bool is_final = 2;
//!     float duration = 3;
//! }
//!
//! message RecognitionError {
//!     string domain = 1;
//!     string reason = 2;
//! }
//! ```

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RecognitionRequest {
    #[prost(oneof = "recognition_request::RequestUnion", tags = "1, 2")]
    pub request_union: ::core::option::Option<recognition_request::RequestUnion>,
}

pub mod recognition_request {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum RequestUnion {
        #[prost(message, tag = "1")]
        Init(super::RecognitionInit),
        #[prost(bytes = "vec", tag = "2")]
        Audio(::prost::alloc::vec::Vec<u8>),
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RecognitionInit {
    #[prost(message, optional, tag = "1")]
    pub parameters: ::core::option::Option<RecognitionParameters>,
    #[prost(message, optional, tag = "2")]
    pub resource: ::core::option::Option<RecognitionResource>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RecognitionParameters {
    #[prost(string, tag = "1")]
    pub language: ::prost::alloc::string::String,
    #[prost(uint32, tag = "2")]
    pub sample_rate_hz: u32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RecognitionResource {
    #[prost(oneof = "recognition_resource::Resource", tags = "1, 2")]
    pub resource: ::core::option::Option<recognition_resource::Resource>,
}

pub mod recognition_resource {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum Model {
        Generic = 0,
        Banking = 1,
        Telco = 2,
    }

    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Resource {
        #[prost(string, tag = "1")]
        InlineGrammar(::prost::alloc::string::String),
        #[prost(enumeration = "Model", tag = "2")]
        Model(i32),
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RecognitionResponse {
    #[prost(oneof = "recognition_response::ResponseUnion", tags = "1, 2")]
    pub response_union: ::core::option::Option<recognition_response::ResponseUnion>,
}

pub mod recognition_response {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum ResponseUnion {
        #[prost(message, tag = "1")]
        Result(super::RecognitionResult),
        #[prost(message, tag = "2")]
        Error(super::RecognitionError),
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RecognitionResult {
    #[prost(string, tag = "1")]
    pub text: ::prost::alloc::string::String,
    #[prost(bool, tag = "2")]
    pub is_final: bool,
    /// Seconds of audio covered by this fragment.
    #[prost(float, tag = "3")]
    pub duration: f32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RecognitionError {
    #[prost(string, tag = "1")]
    pub domain: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub reason: ::prost::alloc::string::String,
}

pub mod speech_recognizer_client {
    #![allow(unused_variables, dead_code, missing_docs, clippy::let_unit_value)]
    use tonic::codegen::http::uri::PathAndQuery;
    use tonic::codegen::*;

    const SERVICE: &str = "speechcenter.recognizer.v1.SpeechRecognizer";

    #[derive(Debug, Clone)]
    pub struct SpeechRecognizerClient<T> {
        inner: tonic::client::Grpc<T>,
    }

    impl<T> SpeechRecognizerClient<T>
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

        /// Bidirectional recognition stream: one init message followed by
        /// audio, answered by zero or more results or a single error.
        pub async fn recognize_stream(
            &mut self,
            request: impl tonic::IntoStreamingRequest<Message = super::RecognitionRequest>,
        ) -> std::result::Result<
            tonic::Response<tonic::codec::Streaming<super::RecognitionResponse>>,
            tonic::Status,
        > {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::unknown(format!("Service was not ready: {}", e.into()))
            })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = PathAndQuery::from_static(
                "/speechcenter.recognizer.v1.SpeechRecognizer/RecognizeStream",
            );
            let mut req = request.into_streaming_request();
            req.extensions_mut()
                .insert(GrpcMethod::new(SERVICE, "RecognizeStream"));
            self.inner.streaming(req, path, codec).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prost::Message;

    #[test]
    fn test_init_request_survives_the_wire() {
        let request = RecognitionRequest {
            request_union: Some(recognition_request::RequestUnion::Init(RecognitionInit {
                parameters: Some(RecognitionParameters {
                    language: "en-US".to_string(),
                    sample_rate_hz: 8000,
                }),
                resource: Some(RecognitionResource {
                    resource: Some(recognition_resource::Resource::Model(
                        recognition_resource::Model::Banking as i32,
                    )),
                }),
            })),
        };

        let bytes = request.encode_to_vec();
        let decoded = RecognitionRequest::decode(bytes.as_slice()).unwrap();
        assert_eq!(decoded, request);
    }

    #[test]
    fn test_audio_field_tag() {
        let request = RecognitionRequest {
            request_union: Some(recognition_request::RequestUnion::Audio(vec![1, 2, 3])),
        };
        // field 2, wire type 2, length 3
        assert_eq!(request.encode_to_vec(), vec![0x12, 0x03, 1, 2, 3]);
    }
}
