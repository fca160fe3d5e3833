//! Verdict pipeline errors

use crate::brain::provider::ProviderError;
use serde_json::Value;
use thiserror::Error;

/// Result type for the verdict pipeline
pub type Result<T> = std::result::Result<T, VerdictError>;

/// Everything that can stop a verdict from being produced.
///
/// No variant carries a fallback verdict: any error means "no verdict".
#[derive(Debug, Error)]
pub enum VerdictError {
    /// Bad or missing input, detected before any network call
    #[error("invalid verdict request: {0}")]
    Validation(String),

    /// The model provider failed (timeout, empty response, auth, ...)
    #[error(transparent)]
    Upstream(#[from] ProviderError),

    /// Model output could not be reduced to a complete verdict
    #[error("could not read a verdict from the model response: {message}")]
    Parse {
        message: String,
        /// Raw model text, when no JSON object could be recovered
        raw: Option<String>,
        /// The recovered object, when it was syntactically valid but incomplete
        parsed: Option<Value>,
    },
}

impl VerdictError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Parse failure carrying the raw model text.
    pub fn unparseable(message: impl Into<String>, raw: &str) -> Self {
        Self::Parse {
            message: message.into(),
            raw: Some(raw.to_string()),
            parsed: None,
        }
    }

    /// Parse failure carrying the recovered (but rejected) object.
    pub fn incomplete(message: impl Into<String>, parsed: Value) -> Self {
        Self::Parse {
            message: message.into(),
            raw: None,
            parsed: Some(parsed),
        }
    }

    /// Stable snake_case identifier for logs and API error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::Upstream(e) => e.code(),
            Self::Parse { .. } => "parse_error",
        }
    }

    /// Diagnostic payload: raw upstream text, or the rejected object as JSON.
    pub fn raw(&self) -> Option<String> {
        match self {
            Self::Validation(_) => None,
            Self::Upstream(e) => e.raw().map(str::to_string),
            Self::Parse { raw: Some(raw), .. } => Some(raw.clone()),
            Self::Parse {
                parsed: Some(parsed),
                ..
            } => Some(parsed.to_string()),
            Self::Parse { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_codes() {
        assert_eq!(VerdictError::validation("x").code(), "validation_error");
        assert_eq!(VerdictError::unparseable("x", "raw").code(), "parse_error");
        let upstream: VerdictError = ProviderError::Auth("nope".to_string()).into();
        assert_eq!(upstream.code(), "upstream_auth");
    }

    #[test]
    fn test_raw_payloads() {
        assert_eq!(
            VerdictError::unparseable("bad", "I think A").raw().as_deref(),
            Some("I think A")
        );

        let incomplete = VerdictError::incomplete("missing reason", json!({"wrong": "a"}));
        assert_eq!(incomplete.raw().as_deref(), Some(r#"{"wrong":"a"}"#));

        let empty: VerdictError = ProviderError::EmptyResponse {
            raw: "{\"choices\":[]}".to_string(),
        }
        .into();
        assert_eq!(empty.raw().as_deref(), Some("{\"choices\":[]}"));

        assert!(VerdictError::validation("x").raw().is_none());
    }

    #[test]
    fn test_upstream_display_is_transparent() {
        let err: VerdictError = ProviderError::Auth("invalid key".to_string()).into();
        assert_eq!(err.to_string(), "upstream authentication failed: invalid key");
    }
}
