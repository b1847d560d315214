pub mod audio;
pub mod config;
pub mod error;
pub mod protocol;
pub mod session;
pub mod transport;

pub use config::{ClientConfig, ConfigError};
pub use error::{Result, SessionError};
pub use session::{
    RecognitionOptions, SessionObserver, SessionOptions, StreamSession, SynthesisOptions,
};
pub use transport::grpc::GrpcChannel;
