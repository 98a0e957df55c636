//! Collection API client error types.

use std::sync::Arc;

/// Errors from the collection API client.
#[derive(Debug, Clone, thiserror::Error)]
pub enum MetError {
    /// Upstream answered with a non-success status.
    #[error("HTTP error: {status}")]
    HttpError { status: u16 },

    /// Request timeout.
    #[error("request timeout")]
    Timeout,

    /// Network error.
    #[error("network error: {0}")]
    Network(Arc<reqwest::Error>),

    /// Response parse error.
    #[error("parse error: {0}")]
    Parse(String),
}

impl MetError {
    /// Whether another attempt might succeed. Only network and timeout
    /// failures qualify; statuses and bad bodies are final.
    pub fn is_transient(&self) -> bool {
        matches!(self, MetError::Timeout | MetError::Network(_))
    }
}

impl From<reqwest::Error> for MetError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() { MetError::Timeout } else { MetError::Network(Arc::new(err)) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MetError::HttpError { status: 503 };
        assert!(err.to_string().contains("503"));

        let err = MetError::Parse("expected value".to_string());
        assert!(err.to_string().contains("parse error"));
    }

    #[test]
    fn test_transient_classification() {
        assert!(MetError::Timeout.is_transient());
        assert!(!MetError::HttpError { status: 500 }.is_transient());
        assert!(!MetError::Parse(String::new()).is_transient());
    }
}
