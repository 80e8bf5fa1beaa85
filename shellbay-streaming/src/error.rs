//! Streaming errors.

use thiserror::Error;

/// Errors that can occur while decoding a byte stream.
#[derive(Debug, Error)]
pub enum StreamError {
    /// The upstream byte stream failed.
    #[error("Transport error: {0}")]
    Transport(String),

    /// A single line grew past the buffering limit.
    #[error("Line exceeded buffer limit of {limit} bytes")]
    BufferOverflow {
        /// The limit in bytes.
        limit: usize,
    },

    /// JSON parse error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Other error.
    #[error("{0}")]
    Other(String),
}

impl StreamError {
    /// Create a transport error from any displayable error.
    pub fn transport<E: std::fmt::Display>(err: E) -> Self {
        Self::Transport(err.to_string())
    }

    /// Check whether the failure came from the connection rather than the data.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

/// Result type for streaming operations.
pub type StreamResult<T> = Result<T, StreamError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StreamError::BufferOverflow { limit: 16 };
        assert_eq!(err.to_string(), "Line exceeded buffer limit of 16 bytes");
    }

    #[test]
    fn test_transport_helper() {
        let err = StreamError::transport("connection reset");
        assert!(err.is_transport());
        assert_eq!(err.to_string(), "Transport error: connection reset");
    }
}
