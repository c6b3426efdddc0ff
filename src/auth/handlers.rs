//! Authentication HTTP Handlers

use axum::{extract::State, http::HeaderMap, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use validator::Validate;

use super::compare::constant_time_eq;
use super::error::{AuthError, AuthResult};
use super::middleware::{resolve_request, AuthFailure};
use super::{session, token, users};
use crate::api::AppState;
use crate::config::AUTH_COOKIE_NAME;

/// Handle validation: lowercase, 3-20 chars, hyphens not at the boundaries.
static HANDLE_REGEX: std::sync::LazyLock<regex::Regex> =
    std::sync::LazyLock::new(|| regex::Regex::new(r"^[a-z0-9][a-z0-9-]{1,18}[a-z0-9]$").unwrap());

// ============================================================================
// Request/Response Types
// ============================================================================

/// Login request.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Handle (lowercase, 3-20 chars, interior hyphens allowed).
    #[validate(
        length(min = 3, max = 20, message = "handle must be 3-20 characters"),
        regex(
            path = *HANDLE_REGEX,
            message = "handle must be lowercase letters, digits, and interior hyphens"
        )
    )]
    pub handle: String,
    /// Shared password (1-100 characters).
    #[validate(length(min = 1, max = 100, message = "password must be 1-100 characters"))]
    pub password: String,
}

/// Login response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// Always true on the success path.
    pub success: bool,
    /// Handle the session was issued for.
    pub handle: String,
    /// Whether this login created the user.
    pub is_new_user: bool,
}

/// Logout response.
#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    /// Always true: logout cannot fail from the caller's perspective.
    pub success: bool,
}

/// Authentication status response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckAuthResponse {
    /// Whether the request carried a valid session.
    pub is_authenticated: bool,
    /// Handle of the authenticated user, when there is one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handle: Option<String>,
}

// ============================================================================
// Handlers
// ============================================================================

/// Login with handle and shared password.
///
/// POST /api/login
#[tracing::instrument(skip(state, jar, body), fields(handle = %body.handle))]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<LoginRequest>,
) -> AuthResult<(CookieJar, Json<LoginResponse>)> {
    // Validate input shape before touching any secret or the store.
    body.validate()
        .map_err(|e| AuthError::Validation(e.to_string()))?;

    // An unset secret is an operator error, distinct from a wrong password.
    let secret = state
        .config
        .auth_password
        .as_deref()
        .ok_or(AuthError::NotConfigured)?;

    if !constant_time_eq(body.password.as_bytes(), secret.as_bytes()) {
        debug!("Login rejected: password mismatch");
        return Err(AuthError::InvalidCredentials);
    }

    let (user, is_new_user) =
        users::login_or_register(&state.redis, &body.handle, state.config.registration_open)
            .await?;

    // One session per login; concurrent sessions for the same handle coexist.
    let session_id = session::generate_session_id();
    let record = session::Session::new(&user.handle, state.config.session_ttl_secs);
    session::put_session(
        &state.redis,
        &session_id,
        &record,
        state.config.session_ttl_secs,
    )
    .await?;

    let signature = token::sign(&session_id, secret);
    let cookie = session_cookie(
        token::compose(&session_id, &signature),
        state.config.session_ttl_secs,
    );

    info!(handle = %user.handle, is_new_user, "Login succeeded");

    Ok((
        jar.add(cookie),
        Json(LoginResponse {
            success: true,
            handle: user.handle,
            is_new_user,
        }),
    ))
}

/// Logout by clearing the session cookie.
///
/// Also deletes the server-side session record when the presented token
/// verifies, so a copied token dies with the logout instead of riding out the
/// TTL. Always succeeds: a missing or invalid cookie still gets cleared.
///
/// POST /api/logout
#[tracing::instrument(skip(state, jar))]
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, Json<LogoutResponse>) {
    if let (Some(cookie), Some(secret)) = (
        jar.get(AUTH_COOKIE_NAME),
        state.config.auth_password.as_deref(),
    ) {
        if let Some((session_id, signature)) = token::split(cookie.value()) {
            if token::verify(session_id, signature, secret) {
                // Best effort: logout succeeds even when the store is down,
                // in which case the record survives until its TTL.
                if let Err(e) = session::delete_session(&state.redis, session_id).await {
                    warn!(error = %e, "Failed to delete session record on logout");
                }
            }
        }
    }

    let removal = Cookie::build((AUTH_COOKIE_NAME, "")).path("/").build();
    (jar.remove(removal), Json(LogoutResponse { success: true }))
}

/// Report whether the request carries a valid session.
///
/// GET /api/check-auth
pub async fn check_auth(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AuthResult<Json<CheckAuthResponse>> {
    match resolve_request(&state, &headers).await {
        Ok(user) => Ok(Json(CheckAuthResponse {
            is_authenticated: true,
            handle: Some(user.handle),
        })),
        // Store outage is a 500, not "logged out".
        Err(AuthFailure::Store(e)) => Err(AuthError::Store(e)),
        Err(failure) => {
            debug!(reason = failure.reason(), "check-auth: not authenticated");
            Ok(Json(CheckAuthResponse {
                is_authenticated: false,
                handle: None,
            }))
        }
    }
}

/// Build the session cookie. Max-Age mirrors the store TTL exactly.
fn session_cookie(token: String, ttl_secs: i64) -> Cookie<'static> {
    Cookie::build((AUTH_COOKIE_NAME, token))
        .path("/")
        .max_age(time::Duration::seconds(ttl_secs))
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_request(handle: &str, password: &str) -> LoginRequest {
        LoginRequest {
            handle: handle.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_accepts_valid_handles() {
        for handle in ["frank-99", "abc", "a-b-c", "x0x", "twenty-chars-handle1"] {
            assert!(
                valid_request(handle, "pw").validate().is_ok(),
                "{handle} should validate"
            );
        }
    }

    #[test]
    fn test_rejects_bad_handles() {
        for handle in [
            "ab",                    // too short
            "-frank",                // leading hyphen
            "frank-",                // trailing hyphen
            "Frank",                 // uppercase
            "frank_99",              // underscore
            "frank 99",              // space
            "this-handle-is-way-too-long-for-us",
        ] {
            assert!(
                valid_request(handle, "pw").validate().is_err(),
                "{handle} should be rejected"
            );
        }
    }

    #[test]
    fn test_rejects_bad_password_lengths() {
        assert!(valid_request("frank-99", "").validate().is_err());
        assert!(valid_request("frank-99", &"x".repeat(101)).validate().is_err());
        assert!(valid_request("frank-99", &"x".repeat(100)).validate().is_ok());
    }

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = session_cookie("abc.def".into(), 86400);
        assert_eq!(cookie.name(), AUTH_COOKIE_NAME);
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.max_age(), Some(time::Duration::seconds(86400)));
    }
}
