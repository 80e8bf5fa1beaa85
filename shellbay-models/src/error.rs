//! Generator error types.

use shellbay_core::AiProvider;
use shellbay_retries::Retryable;
use shellbay_streaming::StreamError;
use std::time::Duration;
use thiserror::Error;

/// Message used when the provider gives no usable error text.
pub const DEFAULT_FAILURE_MESSAGE: &str = "Failed to generate code";

/// Generator errors.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The generator was built without a credential.
    #[error("Missing API key for {0}")]
    MissingCredential(AiProvider),

    /// No generator exists for the provider.
    #[error("Provider '{0}' is not supported")]
    UnsupportedProvider(AiProvider),

    /// The connection failed or the body could not be read.
    #[error("Network error: {0}")]
    Transport(String),

    /// The request timed out.
    #[error("Request timed out")]
    Timeout,

    /// The provider answered with a non-success status.
    #[error("{message}")]
    Request {
        /// HTTP status code.
        status: u16,
        /// Provider error message.
        message: String,
        /// Server-suggested delay before retrying.
        retry_after: Option<Duration>,
    },

    /// The provider answered with something we could not understand.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// JSON serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The response stream broke mid-way.
    #[error("Stream error: {0}")]
    Stream(String),

    /// Other error.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ModelError {
    /// Create a request error.
    pub fn request(status: u16, message: impl Into<String>) -> Self {
        Self::Request {
            status,
            message: message.into(),
            retry_after: None,
        }
    }

    /// Create a transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    /// Create an invalid response error.
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse(message.into())
    }

    /// Check if this error is transient.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            ModelError::Transport(_) | ModelError::Timeout => true,
            ModelError::Request { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// HTTP status, if the error came from a response.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            ModelError::Request { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Get the retry-after duration if applicable.
    #[must_use]
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            ModelError::Request { retry_after, .. } => *retry_after,
            _ => None,
        }
    }
}

impl Retryable for ModelError {
    fn is_retryable(&self) -> bool {
        ModelError::is_retryable(self)
    }

    fn status(&self) -> Option<u16> {
        ModelError::status(self)
    }

    fn retry_after(&self) -> Option<Duration> {
        ModelError::retry_after(self)
    }
}

impl From<reqwest::Error> for ModelError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ModelError::Timeout
        } else if let Some(status) = err.status() {
            ModelError::request(status.as_u16(), err.to_string())
        } else {
            ModelError::Transport(err.to_string())
        }
    }
}

impl From<StreamError> for ModelError {
    fn from(err: StreamError) -> Self {
        match err {
            StreamError::Transport(msg) => ModelError::Transport(msg),
            StreamError::Json(e) => ModelError::Serialization(e),
            other => ModelError::Stream(other.to_string()),
        }
    }
}

/// Result type for generator operations.
pub type ModelResult<T> = Result<T, ModelError>;
