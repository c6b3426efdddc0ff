//! API Router and Application State
//!
//! Central routing configuration and shared state.

mod activity;
mod bells;
mod error;
mod push;
mod workouts;

use axum::{
    extract::State,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    auth,
    config::Config,
    ratelimit::{rate_limit_by_ip, with_category, RateLimitCategory, RateLimiter},
};

pub use activity::ActivityEntry;
pub use error::ApiError;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Redis client
    pub redis: fred::clients::Client,
    /// Server configuration
    pub config: Arc<Config>,
    /// Rate limiter (optional, uses Redis)
    pub rate_limiter: Option<RateLimiter>,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(redis: fred::clients::Client, config: Config, rate_limiter: Option<RateLimiter>) -> Self {
        Self {
            redis,
            config: Arc::new(config),
            rate_limiter,
        }
    }
}

/// Create the main application router.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Workout, bells, activity, and push routes: authenticated, behind the
    // general API rate limit bucket.
    let api_routes = Router::new()
        .route("/api/completions", get(workouts::list_completions))
        .route("/api/mark-complete", post(workouts::mark_complete))
        .route("/api/unmark", post(workouts::unmark))
        .route("/api/bells", get(bells::get_bells).put(bells::put_bells))
        .route("/api/activity", get(activity::recent))
        .route("/api/subscribe", post(push::subscribe))
        .layer(from_fn_with_state(state.clone(), auth::require_auth))
        .layer(from_fn_with_state(state.clone(), rate_limit_by_ip))
        .layer(from_fn(with_category(RateLimitCategory::Api)));

    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Auth routes (pass state for rate limit middleware)
        .merge(auth::router(state.clone()))
        // Protected routes
        .merge(api_routes)
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
        // State
        .with_state(state)
}

/// Health check response.
#[derive(Serialize)]
struct HealthResponse {
    /// Service status
    status: &'static str,
    /// Whether rate limiting is enabled
    rate_limiting: bool,
}

/// Health check endpoint.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        rate_limiting: state.rate_limiter.is_some(),
    })
}
