//! Error types for owm.
//!
//! Cache lookups never produce errors: a miss is `None`. Everything that
//! can fail (configuration, validation, HTTP calls) reports an [`OwmError`].

use thiserror::Error;

/// Result type alias using `OwmError`.
pub type Result<T> = std::result::Result<T, OwmError>;

/// Main error type for all owm operations.
#[derive(Debug, Error)]
pub enum OwmError {
    // ═══════════════════════════════════════════════════════════════════════════
    // CONFIGURATION & VALIDATION ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Configuration error, rejected at construction time.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Input validation failed (coordinates, place names, parameters).
    #[error("Validation error: {0}")]
    ValidationError(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // API ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// The API rejected the key (HTTP 401).
    #[error("Unauthorized: invalid or missing API key")]
    Unauthorized,

    /// The requested resource does not exist (HTTP 404).
    #[error("Not found: {0}")]
    NotFound(String),

    /// Any other non-success API response.
    #[error("API call failed with status {status}: {body}")]
    ApiCallError { status: u16, body: String },

    // ═══════════════════════════════════════════════════════════════════════════
    // NETWORK ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// HTTP transport failure.
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    /// The request did not complete in time.
    #[error("API call timed out after {seconds}s")]
    Timeout { seconds: u64 },

    // ═══════════════════════════════════════════════════════════════════════════
    // SERIALIZATION ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Malformed request URL.
    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),

    // ═══════════════════════════════════════════════════════════════════════════
    // INTERNAL ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Internal invariant violation (should never happen).
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl OwmError {
    /// Returns true if this error is recoverable (can retry).
    pub fn is_recoverable(&self) -> bool {
        match self {
            OwmError::HttpError(_) | OwmError::Timeout { .. } => true,
            OwmError::ApiCallError { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// Returns true if the remote API answered with an error status.
    pub fn is_api_error(&self) -> bool {
        matches!(
            self,
            OwmError::Unauthorized | OwmError::NotFound(_) | OwmError::ApiCallError { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_error_display() {
        let err = OwmError::ApiCallError {
            status: 502,
            body: "bad gateway".into(),
        };
        assert!(err.to_string().contains("502"));
        assert!(err.to_string().contains("bad gateway"));
    }

    #[test_case(OwmError::HttpError("reset".into()), true ; "transport")]
    #[test_case(OwmError::Timeout { seconds: 30 }, true ; "timeout")]
    #[test_case(OwmError::ApiCallError { status: 503, body: String::new() }, true ; "server error")]
    #[test_case(OwmError::ApiCallError { status: 429, body: String::new() }, true ; "rate limited")]
    #[test_case(OwmError::ApiCallError { status: 400, body: String::new() }, false ; "bad request")]
    #[test_case(OwmError::Unauthorized, false ; "unauthorized")]
    #[test_case(OwmError::ConfigError("x".into()), false ; "config")]
    fn test_error_recoverable(err: OwmError, expected: bool) {
        assert_eq!(err.is_recoverable(), expected);
    }

    #[test]
    fn test_error_classification() {
        assert!(OwmError::Unauthorized.is_api_error());
        assert!(OwmError::NotFound("city".into()).is_api_error());
        assert!(!OwmError::HttpError("test".into()).is_api_error());
        assert!(!OwmError::ValidationError("lat".into()).is_api_error());
    }

    #[test]
    fn test_json_error_conversion() {
        let json_result: std::result::Result<serde_json::Value, _> = serde_json::from_str("invalid");
        let owm_result: Result<serde_json::Value> = json_result.map_err(OwmError::from);
        assert!(matches!(owm_result, Err(OwmError::JsonError(_))));
    }

    #[test]
    fn test_url_error_conversion() {
        let owm_result: Result<url::Url> = url::Url::parse("not a url").map_err(OwmError::from);
        assert!(matches!(owm_result, Err(OwmError::UrlError(_))));
    }
}
