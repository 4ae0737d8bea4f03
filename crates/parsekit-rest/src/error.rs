use parsekit_types::TypeError;
use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RestError {
    #[error("invalid base url {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// Network, TLS, or timeout failure from the HTTP client.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with an unexpected status.
    #[error("{status}: {message}")]
    Server {
        status: StatusCode,
        code: Option<i64>,
        message: String,
    },

    #[error("malformed response body: {0}")]
    Decode(String),

    #[error("failed to encode request body: {0}")]
    Encode(String),

    #[error("cannot delete unsaved {class} object")]
    MissingObjectId { class: String },

    #[error(transparent)]
    Model(#[from] TypeError),
}

impl RestError {
    /// HTTP status for server-reported failures.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Server { status, .. } => Some(*status),
            Self::Transport(e) => e.status(),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_timeout())
    }
}

pub type RestResult<T> = Result<T, RestError>;
