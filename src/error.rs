use thiserror::Error;

#[derive(Error, Debug)]
pub enum StacError {
    #[error("Not found: {id}")]
    NotFound { id: String },

    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    #[error("STAC service unavailable: {message}")]
    ServiceUnavailable {
        message: String,
        #[source]
        source: Option<reqwest::Error>,
    },

    #[error("Service error (HTTP {status}): {message}")]
    Service {
        status: u16,
        message: String,
        request_id: Option<String>,
    },

    #[error("Invalid response from STAC service: {0}")]
    InvalidResponse(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StacError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::ServiceUnavailable {
            message: message.into(),
            source: None,
        }
    }

    /// Request id reported by the service, when the failure carried one.
    pub fn request_id(&self) -> Option<&str> {
        match self {
            Self::Service { request_id, .. } => request_id.as_deref(),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for StacError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return Self::InvalidResponse(err.to_string());
        }
        if err.is_builder() {
            return Self::InvalidArgument(err.to_string());
        }
        Self::ServiceUnavailable {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

pub type Result<T> = std::result::Result<T, StacError>;
