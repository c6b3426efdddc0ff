//! Authentication Service
//!
//! Shared-password login with per-user handles, HMAC-signed session tokens in
//! an HttpOnly cookie, and Redis-backed session records.

pub mod compare;
mod error;
mod handlers;
mod middleware;
pub mod session;
pub mod token;
pub mod users;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};

use crate::api::AppState;
use crate::ratelimit::{rate_limit_by_ip, with_category, RateLimitCategory};

pub use error::{AuthError, AuthResult};
pub use handlers::{CheckAuthResponse, LoginRequest, LoginResponse};
pub use middleware::{require_auth, resolve_request, AuthFailure, CurrentUser};

/// Create the authentication router.
///
/// - POST /api/login - Login with handle and shared password (rate limited)
/// - POST /api/logout - Clear the session cookie
/// - GET /api/check-auth - Report authentication status
pub fn router(state: AppState) -> Router<AppState> {
    // Login gets its own, much tighter rate limit bucket
    let login_route = Router::new()
        .route("/api/login", post(handlers::login))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            rate_limit_by_ip,
        ))
        .layer(axum_middleware::from_fn(with_category(
            RateLimitCategory::Login,
        )));

    login_route
        .route("/api/logout", post(handlers::logout))
        .route("/api/check-auth", get(handlers::check_auth))
}
