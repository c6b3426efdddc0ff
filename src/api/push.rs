//! Push notification subscriptions.
//!
//! Browsers post their Web Push subscription after login. The endpoint URL is
//! hashed into the key so arbitrary URLs never become raw key material.

use axum::{extract::State, Json};
use fred::prelude::*;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use validator::Validate;

use super::error::ApiError;
use crate::api::AppState;
use crate::auth::CurrentUser;

/// Subscriptions outlive sessions but not indefinitely; browsers re-post.
const SUBSCRIPTION_TTL_SECS: i64 = 60 * 60 * 24 * 30;

/// Web Push subscription as produced by `PushManager.subscribe()`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PushSubscription {
    /// Push service endpoint URL.
    #[validate(length(min = 1, max = 2048), url(message = "endpoint must be a URL"))]
    pub endpoint: String,
    /// Client encryption keys.
    #[validate(nested)]
    pub keys: PushKeys,
}

/// Encryption keys accompanying a subscription.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PushKeys {
    /// Client public key.
    #[validate(length(min = 1, max = 256))]
    pub p256dh: String,
    /// Auth secret.
    #[validate(length(min = 1, max = 256))]
    pub auth: String,
}

/// Redis key for a subscription, derived from the endpoint hash.
fn subscription_key(endpoint: &str) -> String {
    let digest = Sha256::digest(endpoint.as_bytes());
    format!("push-sub:{}", hex::encode(digest))
}

/// Store the caller's push subscription.
///
/// POST /api/subscribe
#[tracing::instrument(skip(state, _user, body), fields(handle = %_user.handle))]
pub async fn subscribe(
    State(state): State<AppState>,
    _user: CurrentUser,
    Json(body): Json<PushSubscription>,
) -> Result<Json<serde_json::Value>, ApiError> {
    body.validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let json = serde_json::to_string(&body)
        .map_err(|e| Error::new(ErrorKind::Parse, format!("serialize subscription: {e}")))?;
    state
        .redis
        .set::<(), _, _>(
            subscription_key(&body.endpoint),
            json,
            Some(Expiration::EX(SUBSCRIPTION_TTL_SECS)),
            None,
            false,
        )
        .await?;

    Ok(Json(serde_json::json!({ "success": true })))
}
