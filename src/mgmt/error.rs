//! Management API error classification

use serde::Deserialize;
use thiserror::Error;

/// Structured error body returned by the management API on non-2xx responses
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    #[serde(default)]
    pub status_code: u16,
    #[serde(default)]
    pub error: String,
    #[serde(default)]
    pub message: String,
    /// Machine-readable code, only sent by some endpoints
    #[serde(default)]
    pub error_code: Option<String>,
}

impl ErrorBody {
    /// Decode the error body, falling back to the bare status when the
    /// server did not send the documented shape.
    pub fn parse(status: u16, body: &str) -> Self {
        match serde_json::from_str::<ErrorBody>(body) {
            Ok(mut parsed) => {
                if parsed.status_code == 0 {
                    parsed.status_code = status;
                }
                parsed
            }
            Err(_) => Self {
                status_code: status,
                error: reqwest::StatusCode::from_u16(status)
                    .ok()
                    .and_then(|s| s.canonical_reason())
                    .unwrap_or("Unknown")
                    .to_string(),
                message: body.trim().to_string(),
                error_code: None,
            },
        }
    }
}

/// Failures surfaced by the management client.
///
/// Rate limiting is handled inside the client and never shows up here
/// unless the caller's deadline expires during backoff.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network-level failure (connect, TLS, body read)
    #[error("transport error: {0}")]
    Transport(String),

    /// The caller-supplied deadline expired before the request completed
    #[error("deadline exceeded")]
    DeadlineExceeded,

    /// 404 from the API
    #[error("not found: {message}")]
    NotFound { message: String },

    /// 4xx other than 404
    #[error("{} {}: {}", .0.status_code, .0.error, .0.message)]
    Api(ErrorBody),

    /// 5xx
    #[error("server error {} {}: {}", .0.status_code, .0.error, .0.message)]
    Server(ErrorBody),

    /// 2xx whose body did not match the expected representation
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// Credential exchange failed
    #[error("authentication failed: {0}")]
    Auth(String),
}

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound { .. })
    }

    /// Whether a caller may reasonably retry at a higher level
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ApiError::Transport(_) | ApiError::DeadlineExceeded | ApiError::Server(_)
        )
    }

    /// HTTP status if the failure came from a response
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::NotFound { .. } => Some(404),
            ApiError::Api(body) | ApiError::Server(body) => Some(body.status_code),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Transport(err.to_string())
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_structured_body() {
        let body = ErrorBody::parse(
            400,
            r#"{"statusCode":400,"error":"Bad Request","message":"Payload validation error","errorCode":"invalid_body"}"#,
        );
        assert_eq!(body.status_code, 400);
        assert_eq!(body.error, "Bad Request");
        assert_eq!(body.message, "Payload validation error");
        assert_eq!(body.error_code.as_deref(), Some("invalid_body"));
    }

    #[test]
    fn test_parse_unstructured_body_falls_back_to_status() {
        let body = ErrorBody::parse(502, "<html>bad gateway</html>");
        assert_eq!(body.status_code, 502);
        assert_eq!(body.error, "Bad Gateway");
        assert_eq!(body.message, "<html>bad gateway</html>");
    }

    #[test]
    fn test_retryable_classification() {
        assert!(ApiError::DeadlineExceeded.is_retryable());
        assert!(ApiError::Server(ErrorBody::parse(503, "")).is_retryable());
        assert!(!ApiError::Api(ErrorBody::parse(409, "")).is_retryable());
        assert!(!ApiError::NotFound { message: String::new() }.is_retryable());
        assert!(ApiError::NotFound { message: String::new() }.is_not_found());
    }

    #[test]
    fn test_display_keeps_server_message() {
        let err = ApiError::Api(ErrorBody {
            status_code: 409,
            error: "Conflict".into(),
            message: "The connection already exists.".into(),
            error_code: None,
        });
        assert_eq!(err.to_string(), "409 Conflict: The connection already exists.");
    }
}
