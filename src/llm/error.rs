use thiserror::Error;

/// Failure of a single call to a model API. None of these are retried.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("API key is empty (set {0})")]
    MissingCredential(String),

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("upstream returned HTTP {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("model returned an empty result")]
    EmptyResult,

    #[error("unexpected response payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid endpoint URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("request cancelled")]
    Cancelled,
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        LlmError::Transport(TransportError::Http(err))
    }
}

impl LlmError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, LlmError::Transport(TransportError::Cancelled))
    }

    /// Status code carried by an upstream rejection.
    pub fn status(&self) -> Option<u16> {
        match self {
            LlmError::Upstream { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type LlmResult<T> = std::result::Result<T, LlmError>;
