//! User directory.
//!
//! Profiles are keyed by handle at `user:{handle}` with no TTL; the store is
//! the sole owner and nothing caches them in-process. Writes are blind
//! overwrites: the only mutable field is `last_login`, which is informational,
//! so last-writer-wins between concurrent logins is fine.

use chrono::{DateTime, Utc};
use fred::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::error::AuthError;

/// User profile created at first login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Public handle, also the store key.
    pub handle: String,
    /// First login.
    pub created_at: DateTime<Utc>,
    /// Most recent login.
    pub last_login: DateTime<Utc>,
}

/// Redis key for a user profile.
fn user_key(handle: &str) -> String {
    format!("user:{handle}")
}

/// Create the user on first login, or touch `last_login` on a repeat login.
///
/// Returns the profile and whether it was just created. When the handle is
/// unknown and registration is closed, fails with
/// [`AuthError::RegistrationClosed`] before any session is created.
#[tracing::instrument(skip(redis))]
pub async fn login_or_register(
    redis: &Client,
    handle: &str,
    registration_open: bool,
) -> Result<(User, bool), AuthError> {
    let key = user_key(handle);
    let existing: Option<String> = redis.get(&key).await?;

    let now = Utc::now();
    let (user, is_new) = match existing.as_deref().map(serde_json::from_str::<User>) {
        Some(Ok(mut user)) => {
            user.last_login = now;
            (user, false)
        }
        Some(Err(e)) => {
            // An unparseable profile is unrecoverable; recreate it in place
            // rather than locking the handle out forever.
            warn!(handle, error = %e, "Replacing unparseable user record");
            (
                User {
                    handle: handle.to_string(),
                    created_at: now,
                    last_login: now,
                },
                false,
            )
        }
        None => {
            if !registration_open {
                return Err(AuthError::RegistrationClosed);
            }
            info!(handle, "Registering new user");
            (
                User {
                    handle: handle.to_string(),
                    created_at: now,
                    last_login: now,
                },
                true,
            )
        }
    };

    let json = serde_json::to_string(&user)
        .map_err(|e| Error::new(ErrorKind::Parse, format!("serialize user: {e}")))?;
    redis.set::<(), _, _>(&key, json, None, None, false).await?;

    Ok((user, is_new))
}
