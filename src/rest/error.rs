use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RestErrorKind {
    MissingIdentifier,
    UnsupportedType,
    StatusMismatch,
    Decode,
    Encode,
    Canceled,
    Transport,
}

#[derive(Debug, Error)]
pub enum RestError {
    #[error("missing identifier: {0}")]
    MissingIdentifier(String),
    #[error("unsupported type: {0}")]
    UnsupportedType(String),
    #[error("unexpected status {status} (expected {expected})")]
    StatusMismatch {
        expected: u16,
        status: u16,
        body: String,
    },
    #[error("failed to decode response body: {source}")]
    Decode {
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode request body: {source}")]
    Encode {
        #[source]
        source: serde_json::Error,
    },
    #[error("request canceled")]
    Canceled,
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl RestError {
    pub fn kind(&self) -> RestErrorKind {
        match self {
            RestError::MissingIdentifier(_) => RestErrorKind::MissingIdentifier,
            RestError::UnsupportedType(_) => RestErrorKind::UnsupportedType,
            RestError::StatusMismatch { .. } => RestErrorKind::StatusMismatch,
            RestError::Decode { .. } => RestErrorKind::Decode,
            RestError::Encode { .. } => RestErrorKind::Encode,
            RestError::Canceled => RestErrorKind::Canceled,
            RestError::Transport(_) => RestErrorKind::Transport,
        }
    }

    /// Observed HTTP status, when the failure came from a status mismatch.
    pub fn status(&self) -> Option<u16> {
        match self {
            RestError::StatusMismatch { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

/// Failure raised by a [`Transport`](crate::rest::transport::Transport)
/// before any HTTP status was observed.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct TransportError {
    pub message: String,
    pub timed_out: bool,
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            timed_out: false,
            source: None,
        }
    }

    pub fn with_timed_out(mut self, timed_out: bool) -> Self {
        self.timed_out = timed_out;
        self
    }

    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }
}

pub fn missing_identifier(message: impl Into<String>) -> RestError {
    RestError::MissingIdentifier(message.into())
}

pub fn unsupported_type(message: impl Into<String>) -> RestError {
    RestError::UnsupportedType(message.into())
}
