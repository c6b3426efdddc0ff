//! Shared recent-activity feed.
//!
//! A single capped Redis list at `activity:recent`. LPUSH + LTRIM keeps the
//! newest entries without a read-modify-write cycle, so concurrent completions
//! cannot clobber each other. Writes are best effort.

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use fred::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::error::ApiError;
use crate::api::AppState;
use crate::auth::CurrentUser;

/// Redis key holding the feed.
const ACTIVITY_KEY: &str = "activity:recent";

/// Number of entries retained.
const MAX_ENTRIES: i64 = 50;

/// One entry in the community feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry {
    /// Who completed the workout.
    pub handle: String,
    /// Program week.
    pub week: u8,
    /// Program day.
    pub day: u8,
    /// When it was completed.
    pub completed_at: DateTime<Utc>,
}

/// Append an entry to the feed, keeping only the newest [`MAX_ENTRIES`].
///
/// Failures are logged and swallowed: the feed is decoration, not a ledger.
pub async fn push_entry(redis: &Client, entry: &ActivityEntry) {
    let json = match serde_json::to_string(entry) {
        Ok(json) => json,
        Err(e) => {
            warn!(error = %e, "Failed to serialize activity entry");
            return;
        }
    };

    if let Err(e) = redis.lpush::<(), _, _>(ACTIVITY_KEY, json).await {
        warn!(error = %e, "Failed to push activity entry");
        return;
    }
    if let Err(e) = redis
        .ltrim::<(), _>(ACTIVITY_KEY, 0, MAX_ENTRIES - 1)
        .await
    {
        warn!(error = %e, "Failed to trim activity feed");
    }
}

/// The most recent activity entries, newest first.
///
/// GET /api/activity
pub async fn recent(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> Result<Json<Vec<ActivityEntry>>, ApiError> {
    let raw: Vec<String> = state
        .redis
        .lrange(ACTIVITY_KEY, 0, MAX_ENTRIES - 1)
        .await?;

    // Skip entries that no longer parse rather than failing the whole feed.
    let entries = raw
        .iter()
        .filter_map(|json| match serde_json::from_str(json) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(error = %e, "Skipping unparseable activity entry");
                None
            }
        })
        .collect();

    Ok(Json(entries))
}
