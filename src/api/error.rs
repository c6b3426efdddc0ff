//! API Error Types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

/// Errors from the workout/bells/activity handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed request body.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Key-value store error.
    #[error("Store unavailable")]
    Store(#[from] fred::error::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::Validation(message) => (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({
                    "error": "INVALID_INPUT",
                    "message": message,
                })),
            )
                .into_response(),
            Self::Store(e) => {
                tracing::error!(error = %e, "Key-value store error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(serde_json::json!({
                        "error": "INTERNAL_ERROR",
                        "message": "Internal server error",
                    })),
                )
                    .into_response()
            }
        }
    }
}
