use thiserror::Error;
use url::ParseError;

pub mod config;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP error: {0}")]
    Http(#[from] rquest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Rate limit exceeded")]
    RateLimit,

    #[error("Gateway timeout")]
    GatewayTimeout,

    #[error("Transient upstream failure ({status}): {message}")]
    TransientUpstream { status: u16, message: String },

    #[error("Forbidden - Access denied")]
    Forbidden,

    #[error("Upstream rejected the request ({status}): {message}")]
    FatalUpstream { status: u16, message: String },

    #[error("Upstream still failing after {attempts} attempts: {last}")]
    UpstreamExhausted { attempts: u32, last: Box<Error> },

    #[error("Degenerate input: {0}")]
    DegenerateInput(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),

    #[error("Invalid Uri: {0}")]
    InvalidUri(String),
}

impl Error {
    /// Maps a non-success HTTP status from the upstream into an error kind.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            429 => Error::RateLimit,
            504 => Error::GatewayTimeout,
            500..=599 => Error::TransientUpstream { status, message },
            403 => Error::Forbidden,
            _ => Error::FatalUpstream { status, message },
        }
    }

    /// Whether the failure is worth retrying: network trouble, 5xx or rate limiting.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            Error::RateLimit | Error::GatewayTimeout | Error::TransientUpstream { .. } => true,
            _ => false,
        }
    }
}

impl From<ParseError> for Error {
    fn from(err: ParseError) -> Self {
        Error::InvalidUri(format!("URL parse error: {}", err))
    }
}
