use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("not found ({code}): {message}")]
    NotFound { code: String, message: String },

    #[error("unexpected status {status} ({code}): {message}")]
    Status { status: u16, code: String, message: String },

    #[error("long-running operation ended with status {status} ({code}): {message}")]
    OperationFailed { status: String, code: String, message: String },

    #[error("timed out after {0:?} waiting for long-running operation")]
    Timeout(Duration),

    #[error("cancelled while waiting for long-running operation")]
    Cancelled,

    #[error("transport: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    #[error("decoding response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    pub fn is_not_found(&self) -> bool { matches!(self, ApiError::NotFound { .. }) }

    pub fn is_cancelled(&self) -> bool { matches!(self, ApiError::Cancelled) }
}

pub type Result<T> = std::result::Result<T, ApiError>;
