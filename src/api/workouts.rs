//! Workout completion handlers.
//!
//! Each user's completions live in a single Redis hash at `workout:{handle}`,
//! one field per program slot (`{week}-{day}`). The hash expires 180 days
//! after the most recent write; a program run never lasts that long.

use std::collections::HashMap;

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use fred::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::warn;
use validator::Validate;

use super::activity::{self, ActivityEntry};
use super::error::ApiError;
use crate::api::AppState;
use crate::auth::CurrentUser;

/// Retention for completion data.
const COMPLETION_TTL_SECS: i64 = 60 * 60 * 24 * 180;

/// A completed workout slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedWorkout {
    /// When the workout was marked complete.
    pub completed_at: DateTime<Utc>,
    /// Optional free-form notes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Request to mark a workout complete.
#[derive(Debug, Deserialize, Validate)]
pub struct MarkCompleteRequest {
    /// Program week.
    #[validate(range(min = 1, max = 16, message = "week must be 1-16"))]
    pub week: u8,
    /// Program day within the week.
    #[validate(range(min = 1, max = 7, message = "day must be 1-7"))]
    pub day: u8,
    /// Optional notes (500 chars max).
    #[validate(length(max = 500, message = "notes must be at most 500 characters"))]
    pub notes: Option<String>,
}

/// Request to remove a completion.
#[derive(Debug, Deserialize, Validate)]
pub struct UnmarkRequest {
    /// Program week.
    #[validate(range(min = 1, max = 16, message = "week must be 1-16"))]
    pub week: u8,
    /// Program day within the week.
    #[validate(range(min = 1, max = 7, message = "day must be 1-7"))]
    pub day: u8,
}

/// Response for a successful mark-complete.
#[derive(Debug, Serialize)]
pub struct MarkCompleteResponse {
    /// Always true on the success path.
    pub success: bool,
    /// The stored completion.
    pub completion: CompletedWorkout,
}

/// Redis key for a user's completion hash.
fn workout_key(handle: &str) -> String {
    format!("workout:{handle}")
}

/// Hash field for a program slot.
fn slot_field(week: u8, day: u8) -> String {
    format!("{week}-{day}")
}

/// List the caller's completed workouts, keyed by `{week}-{day}`.
///
/// GET /api/completions
pub async fn list_completions(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<HashMap<String, CompletedWorkout>>, ApiError> {
    let raw: HashMap<String, String> = state.redis.hgetall(workout_key(&user.handle)).await?;

    let mut completions = HashMap::with_capacity(raw.len());
    for (slot, json) in raw {
        match serde_json::from_str(&json) {
            Ok(completion) => {
                completions.insert(slot, completion);
            }
            Err(e) => {
                warn!(handle = %user.handle, slot, error = %e, "Skipping unparseable completion");
            }
        }
    }

    Ok(Json(completions))
}

/// Mark a workout slot complete and announce it on the activity feed.
///
/// POST /api/mark-complete
#[tracing::instrument(skip(state, user, body), fields(handle = %user.handle))]
pub async fn mark_complete(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(body): Json<MarkCompleteRequest>,
) -> Result<Json<MarkCompleteResponse>, ApiError> {
    body.validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let completion = CompletedWorkout {
        completed_at: Utc::now(),
        notes: body.notes.filter(|n| !n.is_empty()),
    };
    let json = serde_json::to_string(&completion)
        .map_err(|e| Error::new(ErrorKind::Parse, format!("serialize completion: {e}")))?;

    let key = workout_key(&user.handle);
    state
        .redis
        .hset::<(), _, _>(&key, (slot_field(body.week, body.day), json))
        .await?;
    state
        .redis
        .expire::<(), _>(&key, COMPLETION_TTL_SECS, None)
        .await?;

    // Feed write is best effort; a feed hiccup must not undo the completion.
    activity::push_entry(
        &state.redis,
        &ActivityEntry {
            handle: user.handle.clone(),
            week: body.week,
            day: body.day,
            completed_at: completion.completed_at,
        },
    )
    .await;

    Ok(Json(MarkCompleteResponse {
        success: true,
        completion,
    }))
}

/// Remove a completion.
///
/// POST /api/unmark
#[tracing::instrument(skip(state, user, body), fields(handle = %user.handle))]
pub async fn unmark(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(body): Json<UnmarkRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    body.validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    state
        .redis
        .hdel::<(), _, _>(workout_key(&user.handle), slot_field(body.week, body.day))
        .await?;

    Ok(Json(serde_json::json!({ "success": true })))
}
