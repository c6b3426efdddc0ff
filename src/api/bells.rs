//! Per-user bell weight preferences.
//!
//! A user's working weights per exercise, stored whole at
//! `user-bells:{handle}`. A GET before any PUT returns an empty map; the UI
//! falls back to the program's published weights.

use std::collections::HashMap;

use axum::{extract::State, Json};
use fred::prelude::*;
use serde::{Deserialize, Serialize};

use super::error::ApiError;
use crate::api::AppState;
use crate::auth::CurrentUser;

/// Upper bound on stored exercises, to keep payloads honest.
const MAX_EXERCISES: usize = 200;

/// Working weights for one exercise.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BellWeights {
    /// Moderate-intensity weight.
    pub moderate: f64,
    /// Heavy weight.
    pub heavy: f64,
    /// Very heavy weight.
    pub very_heavy: f64,
}

impl BellWeights {
    fn is_valid(&self) -> bool {
        [self.moderate, self.heavy, self.very_heavy]
            .iter()
            .all(|w| w.is_finite() && *w >= 0.0)
    }
}

/// Redis key for a user's bell configuration.
fn bells_key(handle: &str) -> String {
    format!("user-bells:{handle}")
}

/// The caller's bell weights, or an empty map if never configured.
///
/// GET /api/bells
pub async fn get_bells(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<HashMap<String, BellWeights>>, ApiError> {
    let raw: Option<String> = state.redis.get(bells_key(&user.handle)).await?;

    let bells = match raw {
        Some(json) => serde_json::from_str(&json).unwrap_or_default(),
        None => HashMap::new(),
    };

    Ok(Json(bells))
}

/// Replace the caller's bell weights.
///
/// PUT /api/bells
#[tracing::instrument(skip(state, user, body), fields(handle = %user.handle))]
pub async fn put_bells(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(body): Json<HashMap<String, BellWeights>>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if body.len() > MAX_EXERCISES {
        return Err(ApiError::Validation(format!(
            "at most {MAX_EXERCISES} exercises may be configured"
        )));
    }
    for (exercise_id, weights) in &body {
        if exercise_id.is_empty() || exercise_id.len() > 64 {
            return Err(ApiError::Validation(
                "exercise ids must be 1-64 characters".into(),
            ));
        }
        if !weights.is_valid() {
            return Err(ApiError::Validation(format!(
                "weights for {exercise_id} must be finite and non-negative"
            )));
        }
    }

    let json = serde_json::to_string(&body)
        .map_err(|e| Error::new(ErrorKind::Parse, format!("serialize bells: {e}")))?;
    state
        .redis
        .set::<(), _, _>(bells_key(&user.handle), json, None, None, false)
        .await?;

    Ok(Json(serde_json::json!({ "success": true })))
}
