//! Provider error types

use std::time::Duration;
use thiserror::Error;

/// Result type for provider calls
pub type Result<T> = std::result::Result<T, ProviderError>;

/// Failures of the outbound completion call.
///
/// These are surfaced to the caller as-is; nothing in the provider layer retries.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The client deadline fired before the provider answered
    #[error("upstream request timed out after {}s", .0.as_secs_f32())]
    Timeout(Duration),

    /// The provider answered but produced no completion text
    #[error("upstream returned no completion choices")]
    EmptyResponse { raw: String },

    /// Credentials missing, malformed, or rejected by the provider
    #[error("upstream authentication failed: {0}")]
    Auth(String),

    /// Any other non-success HTTP status
    #[error("upstream API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// A 2xx body that is not a chat completion
    #[error("malformed upstream response: {message}")]
    Malformed { message: String, raw: String },

    /// Connection-level failure
    #[error("upstream HTTP error: {0}")]
    Http(#[source] reqwest::Error),
}

impl ProviderError {
    /// Raw upstream payload attached for diagnostics, if any.
    pub fn raw(&self) -> Option<&str> {
        match self {
            Self::EmptyResponse { raw } | Self::Malformed { raw, .. } => Some(raw),
            _ => None,
        }
    }

    /// Stable snake_case identifier for logs and API error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Timeout(_) => "upstream_timeout",
            Self::EmptyResponse { .. } => "upstream_empty_response",
            Self::Auth(_) => "upstream_auth",
            Self::Api { .. } => "upstream_api_error",
            Self::Malformed { .. } => "upstream_malformed",
            Self::Http(_) => "upstream_http",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_is_attached_only_to_payload_errors() {
        let empty = ProviderError::EmptyResponse {
            raw: "{\"choices\":[]}".to_string(),
        };
        assert_eq!(empty.raw(), Some("{\"choices\":[]}"));
        assert_eq!(empty.code(), "upstream_empty_response");

        let auth = ProviderError::Auth("invalid key".to_string());
        assert!(auth.raw().is_none());
        assert_eq!(auth.code(), "upstream_auth");
    }

    #[test]
    fn test_timeout_message() {
        let err = ProviderError::Timeout(Duration::from_secs(30));
        assert_eq!(err.to_string(), "upstream request timed out after 30s");
    }
}
