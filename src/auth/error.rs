//! Authentication Error Types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Authentication error types.
///
/// The messages are user-safe: they never reveal whether the handle or the
/// password was the wrong half of a failed login, and store errors carry their
/// detail only into the server logs.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Malformed handle or password shape.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Password did not match the shared secret.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Unknown handle while registration is closed.
    #[error("Registration is closed")]
    RegistrationClosed,

    /// The shared secret is not configured. An operator error, logged
    /// distinctly from user-driven failures.
    #[error("Authentication is not configured")]
    NotConfigured,

    /// Request is not authenticated.
    #[error("Unauthorized")]
    Unauthorized,

    /// Key-value store error.
    #[error("Session store unavailable")]
    Store(#[from] fred::error::Error),
}

/// Error response body for JSON responses.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Machine-readable error code.
    pub error: String,
    /// Human-readable error message.
    pub message: String,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            Self::Validation(_) => (StatusCode::BAD_REQUEST, "INVALID_INPUT"),
            Self::InvalidCredentials => (StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS"),
            Self::RegistrationClosed => (StatusCode::FORBIDDEN, "REGISTRATION_CLOSED"),
            Self::NotConfigured => {
                tracing::error!("Login attempted but AUTH_PASSWORD is not configured");
                (StatusCode::INTERNAL_SERVER_ERROR, "AUTH_NOT_CONFIGURED")
            }
            Self::Unauthorized => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            Self::Store(e) => {
                tracing::error!(error = %e, "Key-value store error");
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        };

        let body = Json(ErrorResponse {
            error: code.to_string(),
            message: self.to_string(),
        });

        (status, body).into_response()
    }
}

/// Result type for auth operations.
pub type AuthResult<T> = Result<T, AuthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let cases = [
            (
                AuthError::Validation("handle too short".into()),
                StatusCode::BAD_REQUEST,
            ),
            (AuthError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (AuthError::RegistrationClosed, StatusCode::FORBIDDEN),
            (AuthError::NotConfigured, StatusCode::INTERNAL_SERVER_ERROR),
            (AuthError::Unauthorized, StatusCode::UNAUTHORIZED),
        ];
        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn test_store_error_body_is_generic() {
        let err = AuthError::Store(fred::error::Error::new(
            fred::error::ErrorKind::IO,
            "connection refused to 10.0.0.5:6379",
        ));
        // The user-facing message must not leak infrastructure detail.
        assert_eq!(err.to_string(), "Session store unavailable");
    }
}
