//! Server Configuration
//!
//! Loads configuration from environment variables once at startup. Components
//! receive the resulting struct by reference; nothing reads the environment
//! after boot.

use anyhow::Result;
use std::env;

/// Name of the session cookie carried by browsers.
pub const AUTH_COOKIE_NAME: &str = "auth_token";

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address (e.g., "0.0.0.0:8080")
    pub bind_address: String,

    /// Redis connection URL
    pub redis_url: String,

    /// Shared login password. `None` means authentication is unconfigured:
    /// every login fails with an operator-facing error, never a user-facing one.
    pub auth_password: Option<String>,

    /// Whether unknown handles may register themselves at first login.
    /// Parsed from `REGISTRATION_OPEN`; anything but "true" means closed.
    pub registration_open: bool,

    /// Session lifetime in seconds (default: 86400 = 24h). Used for both the
    /// cookie Max-Age and the store TTL so the two cannot drift apart.
    pub session_ttl_secs: i64,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            bind_address: env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8080".into()),
            redis_url: env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".into()),
            auth_password: env::var("AUTH_PASSWORD").ok().filter(|s| !s.is_empty()),
            registration_open: env::var("REGISTRATION_OPEN")
                .map(|v| v == "true")
                .unwrap_or(false),
            session_ttl_secs: env::var("SESSION_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(86400),
        })
    }

    /// Create a default configuration for testing.
    ///
    /// Uses a Docker test container for Redis:
    /// `docker run -d --name ironbell-test-redis -p 6379:6379 redis:7`
    #[must_use]
    pub fn default_for_test() -> Self {
        Self {
            bind_address: "127.0.0.1:8080".into(),
            redis_url: "redis://localhost:6379".into(),
            auth_password: Some("test-secret".into()),
            registration_open: true,
            session_ttl_secs: 86400,
        }
    }
}
