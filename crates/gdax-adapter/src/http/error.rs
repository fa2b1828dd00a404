/*
[INPUT]:  Error sources (HTTP, API, serialization, feed decoding, WebSocket)
[OUTPUT]: Structured error types with transport/decode classification
[POS]:    Error handling layer - unified error types for entire crate
[UPDATE]: When adding new error sources or improving error messages
*/

use reqwest::StatusCode;
use thiserror::Error;

/// Main error type for the GDAX adapter
#[derive(Error, Debug)]
pub enum GdaxError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// URL parsing failed
    #[error("Invalid URL: {0}")]
    UrlParse(#[from] url::ParseError),

    /// WebSocket error
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// A header produced by the request signer could not be attached
    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    /// The injected request signer refused to sign
    #[error("Signing failed: {0}")]
    Signing(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Positional array had the wrong number of elements
    #[error("{record} expects {expected} elements, got {actual}")]
    InvalidArity {
        record: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Numeric field was neither a JSON integer nor a numeric string
    #[error("Invalid number: {value}")]
    InvalidNumber { value: String },

    /// Field required by the message type was absent
    #[error("`{message_type}` message is missing field `{field}`")]
    MissingField {
        message_type: &'static str,
        field: &'static str,
    },

    /// Field was present but could not be interpreted
    #[error("Invalid value for field `{field}`: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

impl GdaxError {
    /// Network or HTTP-level failure while fetching a page or frame
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            GdaxError::Http(_) | GdaxError::Api { .. } | GdaxError::WebSocket(_)
        )
    }

    /// Payload did not match the expected shape
    pub fn is_decode(&self) -> bool {
        matches!(
            self,
            GdaxError::Serialization(_)
                | GdaxError::InvalidArity { .. }
                | GdaxError::InvalidNumber { .. }
                | GdaxError::MissingField { .. }
                | GdaxError::InvalidField { .. }
        )
    }

    /// Check if the error is worth retrying by the caller.
    ///
    /// Nothing in this crate retries on its own.
    pub fn is_retryable(&self) -> bool {
        match self {
            GdaxError::Http(_) | GdaxError::WebSocket(_) => true,
            GdaxError::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// Create an API error from status code and message
    pub fn api_error(status: StatusCode, message: impl Into<String>) -> Self {
        GdaxError::Api {
            status: status.as_u16(),
            message: message.into(),
        }
    }
}

/// Result type alias for GDAX operations
pub type Result<T> = std::result::Result<T, GdaxError>;
