//! Core rate limiter service using Redis.

use std::sync::Arc;

use fred::prelude::*;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::ratelimit::{
    LimitConfig, RateLimitCategory, RateLimitConfig, RateLimitError, RateLimitResult,
    SCRIPT_ALLOWED,
};

/// Embedded Lua script for the atomic fixed-window check.
const FIXED_WINDOW_SCRIPT: &str = include_str!("fixed_window.lua");

/// Fixed-window rate limiter backed by Redis.
///
/// Counters live at `{prefix}:{category}:{client}` and are incremented by a
/// Lua script, so concurrent requests in the same window can never race the
/// read-modify-write: exactly `requests` requests pass per window. The counter
/// keeps counting past the limit; the key's TTL resets the window either way.
#[derive(Clone)]
pub struct RateLimiter {
    redis: Client,
    config: Arc<RateLimitConfig>,
    script_sha: Arc<RwLock<String>>,
}

impl RateLimiter {
    /// Creates a new rate limiter instance.
    ///
    /// Call `init()` after creation to load the Lua script into Redis.
    #[must_use]
    pub fn new(redis: Client, config: RateLimitConfig) -> Self {
        Self {
            redis,
            config: Arc::new(config),
            script_sha: Arc::new(RwLock::new(String::new())),
        }
    }

    /// Initializes the rate limiter by loading the Lua script into Redis.
    ///
    /// Must be called before using `check()`.
    pub async fn init(&mut self) -> Result<(), Error> {
        self.load_script().await
    }

    /// Loads or reloads the Lua script into Redis.
    ///
    /// Called during init and when NOSCRIPT errors are encountered.
    async fn load_script(&self) -> Result<(), Error> {
        let sha: String = self.redis.script_load(FIXED_WINDOW_SCRIPT).await?;
        info!(sha = %sha, "Rate limit Lua script loaded into Redis");
        *self.script_sha.write().await = sha;
        Ok(())
    }

    /// Checks if an error is a NOSCRIPT error (script not found in Redis).
    fn is_noscript_error(error: &Error) -> bool {
        error.to_string().contains("NOSCRIPT")
    }

    /// Checks and increments the rate limit for a given category and client.
    ///
    /// Returns `Ok(RateLimitResult)` with `allowed: true` if the request is
    /// permitted, or `allowed: false` with retry information if the limit is
    /// exceeded.
    ///
    /// # Errors
    /// Returns `RateLimitError::StoreUnavailable` if Redis is unreachable.
    #[tracing::instrument(skip(self), fields(category = %category.as_str()))]
    pub async fn check(
        &self,
        category: RateLimitCategory,
        client: &str,
    ) -> Result<RateLimitResult, RateLimitError> {
        // Skip rate limiting if disabled
        if !self.config.enabled {
            return Ok(RateLimitResult {
                allowed: true,
                limit: 0,
                remaining: 0,
                reset_at: 0,
                retry_after: 0,
            });
        }

        let limit_config = self.limit_for(category);
        let key = self.build_key(category.as_str(), client);

        let result = self.execute_script(&key, limit_config).await?;

        let count = u32::try_from(result[0]).unwrap_or(u32::MAX);
        let allowed = result[1] == SCRIPT_ALLOWED;
        let ttl = u64::try_from(result[2].max(0)).unwrap_or(0);

        if !allowed {
            debug!(client, count, "Rate limit exceeded");
        }

        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();

        Ok(RateLimitResult {
            allowed,
            limit: limit_config.requests,
            remaining: if allowed {
                limit_config.requests.saturating_sub(count)
            } else {
                0
            },
            reset_at: now + ttl,
            retry_after: if allowed { 0 } else { ttl },
        })
    }

    /// Executes the fixed-window Lua script with NOSCRIPT retry.
    async fn execute_script(
        &self,
        key: &str,
        limit_config: &LimitConfig,
    ) -> Result<Vec<i64>, RateLimitError> {
        let sha = self.script_sha.read().await.clone();
        let args = vec![
            limit_config.window_secs.to_string(),
            limit_config.requests.to_string(),
        ];

        let result: Result<Vec<i64>, _> = self
            .redis
            .evalsha(&sha, vec![key.to_string()], args.clone())
            .await;

        match result {
            Ok(r) => Ok(r),
            Err(e) if Self::is_noscript_error(&e) => {
                warn!("NOSCRIPT error, reloading Lua script");
                self.load_script().await.map_err(|e| {
                    warn!(error = %e, "Failed to reload script");
                    RateLimitError::StoreUnavailable
                })?;

                // Retry with new SHA
                let new_sha = self.script_sha.read().await.clone();
                self.redis
                    .evalsha(&new_sha, vec![key.to_string()], args)
                    .await
                    .map_err(|e| {
                        warn!(error = %e, "Rate limit check failed after reload");
                        RateLimitError::StoreUnavailable
                    })
            }
            Err(e) => {
                warn!(error = %e, "Rate limit check failed");
                Err(RateLimitError::StoreUnavailable)
            }
        }
    }

    /// Returns the configuration for this rate limiter.
    #[must_use]
    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Builds a Redis key with the configured prefix.
    fn build_key(&self, category: &str, client: &str) -> String {
        format!("{}:{}:{}", self.config.key_prefix, category, client)
    }

    /// Returns the limit configuration for a given category.
    fn limit_for(&self, category: RateLimitCategory) -> &LimitConfig {
        match category {
            RateLimitCategory::Login => &self.config.limits.login,
            RateLimitCategory::Api => &self.config.limits.api,
        }
    }
}
