use secrecy::{ExposeSecret, SecretBox};
use std::env;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_URL: &str = "https://us.speechcenter.verbio.com";
pub const URL_ENV: &str = "SPEECH_CENTER_URL";
pub const TOKEN_FILE_ENV: &str = "SPEECH_CENTER_TOKEN_FILE";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Token file is required. Use -t/--token-file or set SPEECH_CENTER_TOKEN_FILE")]
    MissingTokenFile,
    #[error("Failed to read token file {path}: {source}")]
    TokenRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Token file {0} is empty")]
    EmptyToken(PathBuf),
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// Where to connect and how to authenticate.
#[derive(Debug)]
pub struct ClientConfig {
    pub url: String,
    token: SecretBox<String>,
}

impl ClientConfig {
    pub fn new(url: impl Into<String>, token: impl Into<String>) -> Result<Self, ConfigError> {
        let url = url.into();
        validate_url(&url)?;
        Ok(Self {
            url,
            token: SecretBox::new(Box::new(token.into())),
        })
    }

    /// Resolve configuration from CLI flags, then the environment (and a
    /// `.env` file if present), then built-in defaults.
    pub fn load(url: Option<String>, token_file: Option<PathBuf>) -> Result<Self, ConfigError> {
        // A missing .env is fine
        dotenvy::dotenv().ok();
        Self::resolve(url, token_file, |key| env::var(key).ok())
    }

    fn resolve(
        url: Option<String>,
        token_file: Option<PathBuf>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let url = url
            .or_else(|| lookup(URL_ENV))
            .unwrap_or_else(|| DEFAULT_URL.to_string());
        log::info!("Using the URL: [{}]", url);

        let token_file = token_file
            .or_else(|| lookup(TOKEN_FILE_ENV).map(PathBuf::from))
            .ok_or(ConfigError::MissingTokenFile)?;
        let token = load_token(&token_file)?;
        log::info!("Loaded token from file: [{}]", token_file.display());

        validate_url(&url)?;
        Ok(Self { url, token })
    }

    /// The bearer token (use only when building request metadata)
    pub fn token(&self) -> &str {
        self.token.expose_secret()
    }

    /// Full endpoint URI. A bare `host[:port]` is assumed to be TLS.
    pub fn endpoint_uri(&self) -> String {
        if self.url.contains("://") {
            self.url.clone()
        } else {
            format!("https://{}", self.url)
        }
    }
}

/// Check that `url` is `host` or `host:port`, optionally behind an
/// `http://` or `https://` scheme.
pub fn validate_url(url: &str) -> Result<(), ConfigError> {
    if url.is_empty() {
        return Err(ConfigError::InvalidUrl("URL cannot be empty".to_string()));
    }

    let authority = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url);
    let authority = authority.strip_suffix('/').unwrap_or(authority);

    match authority.split(':').collect::<Vec<_>>().as_slice() {
        [host] if host.is_empty() => {
            Err(ConfigError::InvalidUrl("host cannot be empty".to_string()))
        }
        [_] => Ok(()),
        [host, _] if host.is_empty() => {
            Err(ConfigError::InvalidUrl("host cannot be empty".to_string()))
        }
        [_, port] if port.is_empty() => {
            Err(ConfigError::InvalidUrl("port cannot be empty".to_string()))
        }
        [_, port] => port.parse::<u16>().map(|_| ()).map_err(|_| {
            ConfigError::InvalidUrl(format!("port must be a number, got {:?}", port))
        }),
        _ => Err(ConfigError::InvalidUrl(
            "URL must be in format host:port".to_string(),
        )),
    }
}

/// Read a bearer token from `path`, trimming surrounding whitespace.
pub fn load_token(path: &Path) -> Result<SecretBox<String>, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::TokenRead {
        path: path.to_path_buf(),
        source,
    })?;

    let token = contents.trim();
    if token.is_empty() {
        return Err(ConfigError::EmptyToken(path.to_path_buf()));
    }

    Ok(SecretBox::new(Box::new(token.to_string())))
}
