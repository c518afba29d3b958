//! Error types for remote API calls.

use reqwest::StatusCode;
use thiserror::Error;

/// Errors surfaced while constructing the client or performing a call.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The configured base URL could not be parsed or cannot carry a path.
    #[error("invalid API base URL '{url}': {reason}")]
    InvalidBaseUrl {
        /// Offending URL text.
        url: String,
        /// Human-readable explanation.
        reason: String,
    },

    /// The credential cannot be encoded as an HTTP header value.
    #[error("API token contains characters that are not valid in a header")]
    InvalidToken,

    /// The HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),

    /// The request body could not be serialised.
    #[error("failed to encode request body: {0}")]
    Encode(#[from] serde_json::Error),

    /// The request failed before a response arrived (connect, timeout, TLS).
    #[error("request to {operation} failed: {source}")]
    Transport {
        /// Remote operation being attempted.
        operation: &'static str,
        /// Underlying transport error.
        #[source]
        source: reqwest::Error,
    },

    /// The API answered with a non-success status.
    #[error("{operation} returned HTTP {status}")]
    Status {
        /// Remote operation being attempted.
        operation: &'static str,
        /// Status code returned by the API.
        status: StatusCode,
        /// Raw response body, retained for diagnostics.
        body: Vec<u8>,
    },
}

impl ClientError {
    /// Creates an invalid base URL error.
    pub fn invalid_base_url(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidBaseUrl {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Creates a transport error for the named operation.
    #[must_use]
    pub fn transport(operation: &'static str, source: reqwest::Error) -> Self {
        Self::Transport { operation, source }
    }

    /// Returns the HTTP status when the API rejected the call.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
