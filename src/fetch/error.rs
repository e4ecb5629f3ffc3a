use std::fmt;

use reqwest::StatusCode;
use thiserror::Error;

/// Why a transport could not produce a response at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    Timeout,
    Connect,
    Other,
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportErrorKind::Timeout => write!(f, "timeout"),
            TransportErrorKind::Connect => write!(f, "connection failed"),
            TransportErrorKind::Other => write!(f, "transport error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            TransportErrorKind::Timeout
        } else if err.is_connect() {
            TransportErrorKind::Connect
        } else {
            TransportErrorKind::Other
        };
        Self::new(kind, err.to_string())
    }
}

/// A single failed attempt, before it is classified.
///
/// Retriable failures never surface as errors on their own: observers see
/// each one in `on_retry`, and the last is carried by
/// [`FetchError::ExhaustedRetries`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Failure {
    #[error("HTTP {status}")]
    Status { status: StatusCode, body: String },
    #[error(transparent)]
    Transport(TransportError),
}

impl Failure {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Failure::Status { status, .. } => Some(*status),
            Failure::Transport(_) => None,
        }
    }

    pub fn transport(&self) -> Option<&TransportError> {
        match self {
            Failure::Status { .. } => None,
            Failure::Transport(e) => Some(e),
        }
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    /// Non-retriable failure; returned after the first attempt.
    #[error("fatal failure for {url}: {failure}")]
    Fatal { url: String, failure: Failure },

    #[error("gave up on {url} after {attempts} attempts: {last}")]
    ExhaustedRetries {
        url: String,
        attempts: u32,
        last: Failure,
    },

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("cancelled fetching {url} after {attempts} attempts")]
    Cancelled { url: String, attempts: u32 },
}

impl FetchError {
    /// HTTP status of the failure that ended the fetch, if there was one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            FetchError::Fatal { failure, .. }
            | FetchError::ExhaustedRetries { last: failure, .. } => failure.status(),
            FetchError::InvalidRequest(_) | FetchError::Cancelled { .. } => None,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, FetchError::ExhaustedRetries { .. })
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, FetchError::Fatal { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, FetchError::Cancelled { .. })
    }
}
