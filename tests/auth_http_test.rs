//! HTTP tests for request paths that never reach Redis.
//!
//! These run against an offline store on purpose: if a path that must reject
//! before the store lookup (validation, credentials, forged signatures) ever
//! does touch Redis, it surfaces as a 500 and the test fails.

mod helpers;

use axum::http::{header, Method, StatusCode};
use serde_json::json;

use helpers::{offline_state, send};
use ironbell::auth::token;
use ironbell::config::Config;

#[tokio::test]
async fn test_health_reports_rate_limiting_off() {
    let (status, _, body) = send(
        offline_state(Config::default_for_test()),
        Method::GET,
        "/health",
        None,
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["rate_limiting"], false);
}

#[tokio::test]
async fn test_login_rejects_bad_handle() {
    for handle in ["ab", "-frank", "frank-", "Frank99", "frank_99"] {
        let (status, _, body) = send(
            offline_state(Config::default_for_test()),
            Method::POST,
            "/api/login",
            Some(json!({ "handle": handle, "password": "test-secret" })),
            None,
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "handle {handle}");
        assert_eq!(body["error"], "INVALID_INPUT");
    }
}

#[tokio::test]
async fn test_login_rejects_empty_password() {
    let (status, _, body) = send(
        offline_state(Config::default_for_test()),
        Method::POST,
        "/api/login",
        Some(json!({ "handle": "frank-99", "password": "" })),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "INVALID_INPUT");
}

#[tokio::test]
async fn test_login_rejects_wrong_password_without_store_lookup() {
    let (status, headers, body) = send(
        offline_state(Config::default_for_test()),
        Method::POST,
        "/api/login",
        Some(json!({ "handle": "frank-99", "password": "wrong" })),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "INVALID_CREDENTIALS");
    // No session cookie on failure
    assert!(!headers.contains_key(header::SET_COOKIE));
}

#[tokio::test]
async fn test_login_with_unconfigured_secret_is_operator_error() {
    let config = Config {
        auth_password: None,
        ..Config::default_for_test()
    };
    let (status, _, body) = send(
        offline_state(config),
        Method::POST,
        "/api/login",
        Some(json!({ "handle": "frank-99", "password": "anything" })),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "AUTH_NOT_CONFIGURED");
}

#[tokio::test]
async fn test_check_auth_without_cookie() {
    let (status, _, body) = send(
        offline_state(Config::default_for_test()),
        Method::GET,
        "/api/check-auth",
        None,
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["isAuthenticated"], false);
    assert!(body.get("handle").is_none());
}

#[tokio::test]
async fn test_check_auth_with_malformed_token() {
    for cookie in [
        "auth_token=no-separator",
        "auth_token=.signature-only",
        "auth_token=id.",
    ] {
        let (status, _, body) = send(
            offline_state(Config::default_for_test()),
            Method::GET,
            "/api/check-auth",
            None,
            Some(cookie),
        )
        .await;

        assert_eq!(status, StatusCode::OK, "cookie {cookie}");
        assert_eq!(body["isAuthenticated"], false);
    }
}

#[tokio::test]
async fn test_forged_token_rejected_before_store_lookup() {
    // Signed under a different secret than the server's. The offline store
    // guarantees the signature check happens first: a store lookup would 500.
    let session_id = "00112233445566778899aabbccddeeff";
    let signature = token::sign(session_id, "the-attackers-secret");
    let cookie = format!("auth_token={}", token::compose(session_id, &signature));

    let (status, _, body) = send(
        offline_state(Config::default_for_test()),
        Method::GET,
        "/api/check-auth",
        None,
        Some(&cookie),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["isAuthenticated"], false);
}

#[tokio::test]
async fn test_valid_signature_with_store_down_is_500_not_logged_out() {
    // Correctly signed token, unreachable store: the failure must surface as
    // an infrastructure error, not be conflated with "not authenticated".
    let session_id = "00112233445566778899aabbccddeeff";
    let signature = token::sign(session_id, "test-secret");
    let cookie = format!("auth_token={}", token::compose(session_id, &signature));

    let (status, _, _) = send(
        offline_state(Config::default_for_test()),
        Method::GET,
        "/api/check-auth",
        None,
        Some(&cookie),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_logout_always_succeeds_and_clears_cookie() {
    // Without any cookie
    let (status, headers, body) = send(
        offline_state(Config::default_for_test()),
        Method::POST,
        "/api/logout",
        None,
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let set_cookie = headers
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .expect("logout must clear the cookie");
    assert!(set_cookie.starts_with("auth_token="));
    assert!(set_cookie.contains("Max-Age=0"));

    // With a garbage cookie: still success
    let (status, headers, body) = send(
        offline_state(Config::default_for_test()),
        Method::POST,
        "/api/logout",
        None,
        Some("auth_token=garbage"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(headers.contains_key(header::SET_COOKIE));
}

#[tokio::test]
async fn test_protected_routes_require_auth() {
    for (method, path) in [
        (Method::GET, "/api/completions"),
        (Method::POST, "/api/mark-complete"),
        (Method::POST, "/api/unmark"),
        (Method::GET, "/api/bells"),
        (Method::GET, "/api/activity"),
        (Method::POST, "/api/subscribe"),
    ] {
        let (status, _, body) = send(
            offline_state(Config::default_for_test()),
            method.clone(),
            path,
            None,
            None,
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED, "{method} {path}");
        assert_eq!(body["error"], "UNAUTHORIZED");
    }
}
