/*
[INPUT]:  Error sources (HTTP, API, serialization, signing, WebSocket)
[OUTPUT]: Structured error types with context and retry hints
[POS]:    Error handling layer - unified error types for entire crate
[UPDATE]: When adding new error sources or improving error messages
*/

use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error;

/// Main error type for the EMX adapter
#[derive(Error, Debug)]
pub enum EmxError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned a non-success status
    #[error("Request failed (status {code}): {message}")]
    Api { code: u16, message: String },

    /// API key rejected or signature not accepted
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// Authenticated route called on a client without credentials
    #[error("API key and secret are required for this request")]
    MissingCredentials,

    /// API secret is not valid base64
    #[error("b64decode failed: {0}")]
    InvalidSecret(#[from] base64::DecodeError),

    /// Order parameters rejected before sending
    #[error("Invalid order: {0}")]
    InvalidOrder(String),

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// URL parsing failed
    #[error("Invalid URL: {0}")]
    UrlParse(#[from] url::ParseError),

    /// WebSocket error
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// WebSocket used before connect or after the stream ended
    #[error("WebSocket not connected")]
    NotConnected,

    /// Invalid response from server
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded, retry after {retry_after}s")]
    RateLimit { retry_after: u64 },

    /// Nothing received within the allotted time
    #[error("No messages received within {duration:?}")]
    Timeout { duration: Duration },
}

impl EmxError {
    /// Check if the error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            EmxError::Http(_)
            | EmxError::RateLimit { .. }
            | EmxError::Timeout { .. }
            | EmxError::WebSocket(_) => true,
            EmxError::Api { code, .. } => *code >= 500,
            _ => false,
        }
    }

    /// Get retry delay in seconds (if retryable)
    pub fn retry_delay(&self) -> Option<u64> {
        match self {
            EmxError::RateLimit { retry_after } => Some(*retry_after),
            EmxError::Timeout { .. } => Some(1),
            _ => None,
        }
    }

    /// Check if error indicates authentication failure
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            EmxError::Authentication { .. }
                | EmxError::MissingCredentials
                | EmxError::InvalidSecret(_)
        )
    }

    /// Create an API error from status code and message
    pub fn api_error(status: StatusCode, message: impl Into<String>) -> Self {
        EmxError::Api {
            code: status.as_u16(),
            message: message.into(),
        }
    }

    /// Classify a non-success response.
    ///
    /// EMX error bodies are JSON objects carrying `message` (sometimes `error`);
    /// anything else is reported verbatim.
    pub fn from_response(status: StatusCode, retry_after: Option<u64>, body: &str) -> Self {
        let message = extract_error_message(body);
        match status {
            StatusCode::TOO_MANY_REQUESTS => EmxError::RateLimit {
                retry_after: retry_after.unwrap_or(1),
            },
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                EmxError::Authentication { message }
            }
            _ => EmxError::api_error(status, message),
        }
    }
}

fn extract_error_message(body: &str) -> String {
    let parsed = serde_json::from_str::<serde_json::Value>(body).ok();
    parsed
        .as_ref()
        .and_then(|value| value.get("message").or_else(|| value.get("error")))
        .and_then(|value| value.as_str())
        .map(str::to_string)
        .unwrap_or_else(|| body.trim().to_string())
}

/// Result type alias for EMX operations
pub type Result<T> = std::result::Result<T, EmxError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_retryable() {
        let timeout_err = EmxError::Timeout {
            duration: Duration::from_secs(3),
        };
        assert!(timeout_err.is_retryable());
        assert_eq!(timeout_err.retry_delay(), Some(1));

        assert!(!EmxError::MissingCredentials.is_retryable());
        assert!(EmxError::api_error(StatusCode::BAD_GATEWAY, "upstream").is_retryable());
        assert!(!EmxError::api_error(StatusCode::BAD_REQUEST, "bad").is_retryable());
    }

    #[test]
    fn test_timeout_message_keeps_sub_second_precision() {
        let err = EmxError::Timeout {
            duration: Duration::from_millis(500),
        };
        assert_eq!(err.to_string(), "No messages received within 500ms");
        let err = EmxError::Timeout {
            duration: Duration::from_secs(3),
        };
        assert_eq!(err.to_string(), "No messages received within 3s");
    }

    #[test]
    fn test_error_is_auth_error() {
        assert!(EmxError::MissingCredentials.is_auth_error());
        assert!(
            EmxError::Authentication {
                message: "bad sig".to_string()
            }
            .is_auth_error()
        );
        assert!(
            !EmxError::Timeout {
                duration: Duration::from_secs(3)
            }
            .is_auth_error()
        );
    }

    #[test]
    fn test_api_error_creation() {
        let err = EmxError::api_error(StatusCode::BAD_REQUEST, "Invalid contract");
        match err {
            EmxError::Api { code, message } => {
                assert_eq!(code, 400);
                assert_eq!(message, "Invalid contract");
            }
            _ => panic!("Expected Api error variant"),
        }
    }

    #[test]
    fn test_from_response_extracts_message() {
        let err = EmxError::from_response(
            StatusCode::BAD_REQUEST,
            None,
            r#"{"message":"Contract not found."}"#,
        );
        assert_eq!(err.to_string(), "Request failed (status 400): Contract not found.");

        let err = EmxError::from_response(StatusCode::INTERNAL_SERVER_ERROR, None, "oops\n");
        assert_eq!(err.to_string(), "Request failed (status 500): oops");
    }

    #[test]
    fn test_from_response_classifies_status() {
        let err = EmxError::from_response(StatusCode::TOO_MANY_REQUESTS, Some(7), "");
        assert_eq!(err.retry_delay(), Some(7));

        let err = EmxError::from_response(StatusCode::TOO_MANY_REQUESTS, None, "");
        assert_eq!(err.retry_delay(), Some(1));

        let err = EmxError::from_response(
            StatusCode::UNAUTHORIZED,
            None,
            r#"{"error":"Invalid signature."}"#,
        );
        match err {
            EmxError::Authentication { message } => assert_eq!(message, "Invalid signature."),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
