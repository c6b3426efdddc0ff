//! Reusable test helpers for HTTP integration tests.
//!
//! Provides builders for application state and a small request helper that
//! drives the full axum router through `tower::ServiceExt::oneshot`.
#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use fred::interfaces::ClientLike;
use http_body_util::BodyExt;
use tower::ServiceExt;

use ironbell::api::{create_router, AppState};
use ironbell::config::Config;

/// State whose Redis client was never connected.
///
/// Suitable for request paths that must not reach the store (validation
/// failures, credential mismatches, forged tokens). The client errors fast if
/// anything does try to use it.
#[must_use]
pub fn offline_state(config: Config) -> AppState {
    let redis_config =
        fred::types::config::Config::from_url("redis://127.0.0.1:1").expect("static url parses");
    let redis = fred::clients::Client::new(redis_config, None, None, None);
    // Spawn the connection task (it will fail: nothing listens on port 1) so
    // commands error out instead of waiting for a connection forever.
    redis.connect();
    AppState::new(redis, config, None)
}

/// State backed by a real Redis at `redis://localhost:6379`.
///
/// Requires a running instance:
/// `docker run -d --name ironbell-test-redis -p 6379:6379 redis:7`
pub async fn connected_state(config: Config) -> AppState {
    let redis = ironbell::db::create_redis_client(&config.redis_url)
        .await
        .expect("Failed to connect to test Redis");
    AppState::new(redis, config, None)
}

/// Send one request through a freshly-built router for `state`.
pub async fn send(
    state: AppState,
    method: Method,
    path: &str,
    body: Option<serde_json::Value>,
    cookie: Option<&str>,
) -> (StatusCode, HeaderMap, serde_json::Value) {
    let router = create_router(state);

    let mut builder = Request::builder().method(method).uri(path);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
    };

    (status, headers, json)
}

/// Extract the `auth_token` cookie pair ("auth_token=...") from a login
/// response's `Set-Cookie` header.
#[must_use]
pub fn auth_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with("auth_token="))
        .and_then(|v| v.split(';').next())
        .map(ToString::to_string)
}
