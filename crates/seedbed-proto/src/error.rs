//! Error types shared across Seedbed crates.

use thiserror::Error;

/// A failed API request, classified by the transport backend.
///
/// Only [`RequestError::Api`] failures carry an error-type label; a fixture
/// step's `expected_error_type` can match against that label to swallow the
/// failure. Transport-level failures (connection refused, TLS, timeouts)
/// never match an expectation.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("API error ({error_type}): {message}")]
    Api {
        error_type: String,
        message: String,
        status: Option<u16>,
    },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl RequestError {
    /// The classified error-type label, when the remote service supplied one.
    pub fn error_type(&self) -> Option<&str> {
        match self {
            RequestError::Api { error_type, .. } => Some(error_type),
            _ => None,
        }
    }

    /// Returns true if this failure matches a declared expectation.
    pub fn matches_expected(&self, expected: &str) -> bool {
        self.error_type() == Some(expected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_matches_declared_type() {
        let err = RequestError::Api {
            error_type: "invalid_request_error".to_string(),
            message: "No such customer".to_string(),
            status: Some(404),
        };
        assert!(err.matches_expected("invalid_request_error"));
        assert!(!err.matches_expected("card_error"));
    }

    #[test]
    fn transport_error_never_matches() {
        let err = RequestError::Transport("connection refused".to_string());
        assert_eq!(err.error_type(), None);
        assert!(!err.matches_expected("invalid_request_error"));
    }
}
