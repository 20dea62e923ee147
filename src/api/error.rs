//! Boundary error type: every failure a handler can report, mapped to a JSON body.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use crate::quote::{FieldErrors, SubmitError};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("validation failed: {0}")]
    Validation(FieldErrors),
    #[error("anti-abuse verification failed: {0:?}")]
    AntiAbuseRejected(Vec<String>),
    #[error("backend unavailable: {0}")]
    BackendUnavailable(String),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl From<SubmitError> for ApiError {
    fn from(err: SubmitError) -> Self {
        match err {
            SubmitError::Invalid(details) => Self::Validation(details),
            SubmitError::Rejected(verdict) => Self::AntiAbuseRejected(verdict.error_codes),
            SubmitError::AntiAbuse(err) => Self::BackendUnavailable(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::Validation(details) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "Invalid quote request", "details": details })),
            )
                .into_response(),
            Self::AntiAbuseRejected(codes) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "Anti-abuse verification failed", "codes": codes })),
            )
                .into_response(),
            Self::BackendUnavailable(reason) => {
                warn!("Upstream service unavailable: {reason}");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    Json(json!({ "error": "Verification service unavailable" })),
                )
                    .into_response()
            }
            Self::Unexpected(err) => {
                error!("Unexpected failure: {err:#}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Internal server error" })),
                )
                    .into_response()
            }
        }
    }
}
