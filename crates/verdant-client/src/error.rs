//! Error types for backend service clients.
//!
//! The error taxonomy follows the console's degradation model: transport
//! failures, non-success HTTP statuses, and malformed payloads are caught at
//! the call site and turned into a stale-data or error view state, while
//! validation failures are surfaced to the user before any request is sent.

use thiserror::Error;

/// Errors that can occur when talking to the backend services.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The service is not reachable.
    #[error("Service not reachable at {url}: {source}")]
    NotReachable {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Invalid base URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The service returned a non-success status.
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// The response body did not have the expected shape.
    #[error("Unexpected response shape: {0}")]
    Decode(String),

    /// Client-side validation rejected the input before any request was sent.
    #[error("{0}")]
    Validation(String),

    /// WebSocket error (streaming variant).
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// Failed to parse a wire value.
    #[error(transparent)]
    Parse(#[from] verdant_types::ParseError),
}

impl Error {
    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a decode error.
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }

    /// Whether this error is a client-side validation rejection, i.e. no
    /// request was issued.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }
}

/// Result type alias using the client's [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_display() {
        let err = Error::validation("Location is required.");
        assert_eq!(err.to_string(), "Location is required.");
        assert!(err.is_validation());
    }

    #[test]
    fn test_api_display() {
        let err = Error::Api {
            status: 500,
            message: "boom".to_string(),
        };
        assert!(err.to_string().contains("500"));
        assert!(err.to_string().contains("boom"));
        assert!(!err.is_validation());
    }
}
