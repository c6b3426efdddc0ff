//! Session records in Redis.
//!
//! One record per successful login at `session:{id}`; concurrent sessions for
//! the same handle are independent. Expiry is enforced twice: Redis evicts the
//! key at the TTL, and readers re-check `expires_at` so a clock or TTL
//! discrepancy can never resurrect a stale session.

use chrono::{DateTime, Duration, Utc};
use fred::prelude::*;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Server-side session record binding a random id to a handle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Handle the session authenticates as.
    pub handle: String,
    /// When the session was created.
    pub created_at: DateTime<Utc>,
    /// Hard expiry, independent of the store TTL.
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Create a session for `handle` lasting `ttl_secs` from now.
    #[must_use]
    pub fn new(handle: &str, ttl_secs: i64) -> Self {
        let now = Utc::now();
        Self {
            handle: handle.to_string(),
            created_at: now,
            expires_at: now + Duration::seconds(ttl_secs),
        }
    }

    /// Whether the session has passed its hard expiry.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

/// Generate a session id with 128 bits of entropy, hex-encoded.
#[must_use]
pub fn generate_session_id() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Redis key for a session record.
fn session_key(session_id: &str) -> String {
    format!("session:{session_id}")
}

/// Write a session record with the store-level TTL.
#[tracing::instrument(skip(redis, session))]
pub async fn put_session(
    redis: &Client,
    session_id: &str,
    session: &Session,
    ttl_secs: i64,
) -> Result<(), Error> {
    let json = serde_json::to_string(session)
        .map_err(|e| Error::new(ErrorKind::Parse, format!("serialize session: {e}")))?;
    redis
        .set::<(), _, _>(
            session_key(session_id),
            json,
            Some(Expiration::EX(ttl_secs)),
            None,
            false,
        )
        .await
}

/// Fetch a session record.
///
/// `Ok(None)` covers both "never created" and "evicted by TTL". Store
/// failures surface as `Err` and must not be treated as a missing session.
#[tracing::instrument(skip(redis))]
pub async fn get_session(redis: &Client, session_id: &str) -> Result<Option<Session>, Error> {
    let value: Option<String> = redis.get(session_key(session_id)).await?;
    let Some(json) = value else {
        return Ok(None);
    };
    match serde_json::from_str(&json) {
        Ok(session) => Ok(Some(session)),
        Err(e) => {
            warn!(error = %e, "Discarding unparseable session record");
            Ok(None)
        }
    }
}

/// Delete a session record. Deleting an absent key is not an error.
#[tracing::instrument(skip(redis))]
pub async fn delete_session(redis: &Client, session_id: &str) -> Result<(), Error> {
    redis.del::<(), _>(session_key(session_id)).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_entropy_and_shape() {
        let id = generate_session_id();
        assert_eq!(id.len(), 32, "16 bytes hex-encode to 32 chars");
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(id, generate_session_id());
    }

    #[test]
    fn test_expiry_check() {
        let session = Session::new("frank-99", 3600);
        assert!(!session.is_expired(Utc::now()));
        assert!(session.is_expired(Utc::now() + Duration::seconds(3601)));
    }

    #[test]
    fn test_session_round_trips_through_json() {
        let session = Session::new("frank-99", 86400);
        let json = serde_json::to_string(&session).unwrap();
        let back: Session = serde_json::from_str(&json).unwrap();
        assert_eq!(back.handle, "frank-99");
        assert_eq!(back.expires_at, session.expires_at);
    }

    #[test]
    fn test_session_key_namespace() {
        assert_eq!(session_key("abc"), "session:abc");
    }
}
