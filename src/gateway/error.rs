//! API error bodies and status mapping

use crate::brain::provider::ProviderError;
use crate::brain::verdict::VerdictError;
use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

/// JSON error body: `{ "message": ..., "code": ..., "raw": ... }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
}

/// An error on its way to the HTTP client.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorBody,
}

/// HTTP status for a pipeline failure.
pub fn status_for(error: &VerdictError) -> StatusCode {
    match error {
        VerdictError::Validation(_) => StatusCode::BAD_REQUEST,
        VerdictError::Upstream(ProviderError::Timeout(_)) => StatusCode::GATEWAY_TIMEOUT,
        VerdictError::Upstream(_) | VerdictError::Parse { .. } => StatusCode::BAD_GATEWAY,
    }
}

impl From<VerdictError> for ApiError {
    fn from(error: VerdictError) -> Self {
        Self {
            status: status_for(&error),
            body: ErrorBody {
                message: error.to_string(),
                code: error.code().to_string(),
                raw: error.raw(),
            },
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            body: ErrorBody {
                message: format!("invalid verdict request: {}", rejection.body_text()),
                code: "validation_error".to_string(),
                raw: None,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
