//! Axum middleware for rate limiting.
//!
//! Enforces per-client request limits on the routes it wraps. The category is
//! attached to the request by [`with_category`] before [`rate_limit_by_ip`]
//! runs the check.

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use std::net::SocketAddr;
use tracing::{debug, warn};

use crate::api::AppState;
use crate::ratelimit::{client_identifier, RateLimitCategory, RateLimitError};

/// Middleware to rate limit requests by client identity.
///
/// # Behavior
///
/// - If the rate limiter is not configured (`state.rate_limiter` is `None`),
///   requests pass through.
/// - If Redis is unavailable and `fail_open` is true, requests pass through
///   with a warning; otherwise they are rejected with 503.
/// - If the rate limit is exceeded, returns `429 Too Many Requests` with a
///   `Retry-After` hint.
#[tracing::instrument(skip(state, request, next))]
pub async fn rate_limit_by_ip(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, RateLimitError> {
    // Get category from request extensions (set by the layer factory)
    let category = request
        .extensions()
        .get::<RateLimitCategory>()
        .copied()
        .unwrap_or(RateLimitCategory::Api);

    // Connect info is stored as a request extension by the connect-info
    // make-service; absent in contexts without it (e.g. tests).
    let connect_info = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .copied();

    // Skip rate limiting if not configured
    let Some(ref rate_limiter) = state.rate_limiter else {
        return Ok(next.run(request).await);
    };

    let trust_proxy = rate_limiter.config().trust_proxy;
    let client = client_identifier(request.headers(), connect_info.as_ref(), trust_proxy);

    debug!(
        category = %category.as_str(),
        client = %client,
        "Checking rate limit"
    );

    let result = match rate_limiter.check(category, &client).await {
        Ok(result) => result,
        Err(RateLimitError::StoreUnavailable) => {
            if rate_limiter.config().fail_open {
                warn!(
                    category = %category.as_str(),
                    client = %client,
                    "Redis unavailable, allowing request (fail_open=true)"
                );
                return Ok(next.run(request).await);
            }
            return Err(RateLimitError::StoreUnavailable);
        }
        Err(e) => return Err(e),
    };

    if !result.allowed {
        debug!(
            category = %category.as_str(),
            client = %client,
            retry_after = result.retry_after,
            "Rate limit exceeded"
        );
        return Err(RateLimitError::LimitExceeded(result));
    }

    Ok(next.run(request).await)
}

/// Sets the rate limit category for downstream middleware.
///
/// Apply after `rate_limit_by_ip` in layer order so it runs first:
///
/// ```ignore
/// Router::new()
///     .route("/api/login", post(login))
///     .layer(from_fn_with_state(state.clone(), rate_limit_by_ip))
///     .layer(from_fn(with_category(RateLimitCategory::Login)));
/// ```
pub fn with_category(
    category: RateLimitCategory,
) -> impl Fn(Request, Next) -> std::pin::Pin<Box<dyn std::future::Future<Output = Response> + Send>>
       + Clone
       + Send
       + 'static {
    move |mut request: Request, next: Next| {
        request.extensions_mut().insert(category);
        Box::pin(async move { next.run(request).await })
    }
}
