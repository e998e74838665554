//! HTTP error value
//!
//! Request failures travel as a plain status + message pair rather than a
//! cause chain. The message is either a symbolic code such as
//! `E_INSUFFICIENT_QUERY` or the text of a lower-level error.

use hyper::StatusCode;
use std::fmt;

/// Blank or missing `address` query parameter
pub const E_INSUFFICIENT_QUERY: &str = "E_INSUFFICIENT_QUERY";

/// Address that sanitizes down to nothing
pub const E_INVALID_QUERY: &str = "E_INVALID_QUERY";

/// Error returned by request extraction and response writing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpError {
    pub status: StatusCode,
    pub message: String,
}

/// Result type used by every extractor
pub type HttpResult<T> = Result<T, HttpError>;

impl HttpError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// 405 with an empty message
    pub fn method_not_allowed() -> Self {
        Self::new(StatusCode::METHOD_NOT_ALLOWED, "")
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, "404 Not Found")
    }

    pub fn payload_too_large() -> Self {
        Self::new(StatusCode::PAYLOAD_TOO_LARGE, "413 Payload Too Large")
    }

    pub fn code(&self) -> u16 {
        self.status.as_u16()
    }
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for HttpError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_not_allowed_has_empty_message() {
        let err = HttpError::method_not_allowed();
        assert_eq!(err.code(), 405);
        assert!(err.message.is_empty());
        assert_eq!(err.to_string(), "");
    }

    #[test]
    fn test_display_is_message() {
        let err = HttpError::bad_request(E_INSUFFICIENT_QUERY);
        assert_eq!(err.code(), 400);
        assert_eq!(err.to_string(), "E_INSUFFICIENT_QUERY");
    }
}
