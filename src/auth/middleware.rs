//! Request authentication.
//!
//! Every request re-runs the same resolution pipeline from scratch:
//! cookie → signature check → session fetch → hard-expiry check. The signature
//! is verified before the store is consulted, so a forged token costs no
//! round trip. Outcomes stay tagged ([`AuthFailure`]) so logs can tell a
//! tampered token from an expired session from a store outage, even though the
//! HTTP contract collapses the first two to 401.

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use chrono::Utc;
use tracing::{debug, error};

use crate::api::AppState;
use crate::config::AUTH_COOKIE_NAME;

use super::error::AuthError;
use super::{session, token};

/// Authenticated identity injected into request extensions.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    /// Handle the session resolved to.
    pub handle: String,
}

/// Why a request failed to authenticate.
#[derive(Debug)]
pub enum AuthFailure {
    /// No `auth_token` cookie on the request.
    NoCookie,
    /// Cookie present but not of the `id.signature` form.
    MalformedToken,
    /// Signature did not verify; the token was forged or tampered with.
    BadSignature,
    /// Signature verified but no session record exists (never created, or
    /// evicted by TTL).
    UnknownSession,
    /// Session record exists but is past its hard expiry.
    Expired,
    /// No shared secret is configured, so no token can verify.
    NotConfigured,
    /// The store itself failed. Surfaced as 500, never as "not logged in".
    Store(fred::error::Error),
}

impl AuthFailure {
    /// Short tag for structured logs.
    #[must_use]
    pub fn reason(&self) -> &'static str {
        match self {
            Self::NoCookie => "no_cookie",
            Self::MalformedToken => "malformed_token",
            Self::BadSignature => "bad_signature",
            Self::UnknownSession => "unknown_session",
            Self::Expired => "expired",
            Self::NotConfigured => "not_configured",
            Self::Store(_) => "store_error",
        }
    }
}

/// Resolve the requester's identity from the session cookie.
///
/// Implements the full verification pipeline; callers decide how much of the
/// failure detail to expose (handlers collapse everything but `Store` to an
/// unauthenticated response).
pub async fn resolve_request(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<CurrentUser, AuthFailure> {
    let jar = CookieJar::from_headers(headers);
    let Some(cookie) = jar.get(AUTH_COOKIE_NAME) else {
        return Err(AuthFailure::NoCookie);
    };

    let Some((session_id, signature)) = token::split(cookie.value()) else {
        return Err(AuthFailure::MalformedToken);
    };

    let Some(secret) = state.config.auth_password.as_deref() else {
        // Nothing can verify without the secret; log loudly, reject quietly.
        error!("Session verification attempted but AUTH_PASSWORD is not configured");
        return Err(AuthFailure::NotConfigured);
    };

    // Signature first: a request with an invalid signature must be rejected
    // before any store lookup.
    if !token::verify(session_id, signature, secret) {
        return Err(AuthFailure::BadSignature);
    }

    let record = session::get_session(&state.redis, session_id)
        .await
        .map_err(AuthFailure::Store)?;

    let Some(record) = record else {
        return Err(AuthFailure::UnknownSession);
    };

    if record.is_expired(Utc::now()) {
        return Err(AuthFailure::Expired);
    }

    Ok(CurrentUser {
        handle: record.handle,
    })
}

/// Middleware to require authentication.
///
/// Resolves the session cookie and injects [`CurrentUser`] into request
/// extensions. All authentication failures become 401 regardless of cause;
/// store failures become 500.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    match resolve_request(&state, request.headers()).await {
        Ok(user) => {
            request.extensions_mut().insert(user);
            Ok(next.run(request).await)
        }
        Err(AuthFailure::Store(e)) => Err(AuthError::Store(e)),
        Err(failure) => {
            debug!(reason = failure.reason(), "Rejecting unauthenticated request");
            Err(AuthError::Unauthorized)
        }
    }
}

/// Extractor for the authenticated user in handlers behind [`require_auth`].
impl<S> axum::extract::FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Self>()
            .cloned()
            .ok_or(AuthError::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_reasons_are_distinct() {
        let failures = [
            AuthFailure::NoCookie,
            AuthFailure::MalformedToken,
            AuthFailure::BadSignature,
            AuthFailure::UnknownSession,
            AuthFailure::Expired,
            AuthFailure::NotConfigured,
        ];
        let mut reasons: Vec<_> = failures.iter().map(AuthFailure::reason).collect();
        reasons.sort_unstable();
        reasons.dedup();
        assert_eq!(reasons.len(), failures.len());
    }
}
