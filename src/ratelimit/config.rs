//! Rate limiting configuration.

/// Configuration for the rate limiting system.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Whether rate limiting is enabled
    pub enabled: bool,
    /// Prefix for Redis keys (e.g., "ironbell:rl")
    pub key_prefix: String,
    /// Whether to allow requests when Redis is unavailable. Defaults to
    /// false: an unreachable store rejects rather than waves through.
    pub fail_open: bool,
    /// Whether to trust the edge-provided CF-Connecting-IP header
    pub trust_proxy: bool,
    /// Per-category rate limits
    pub limits: RateLimits,
}

/// Rate limits for each category.
#[derive(Debug, Clone)]
pub struct RateLimits {
    /// Login attempts
    pub login: LimitConfig,
    /// General API calls
    pub api: LimitConfig,
}

/// Configuration for a single rate limit.
#[derive(Debug, Clone)]
pub struct LimitConfig {
    /// Maximum requests allowed in the window
    pub requests: u32,
    /// Window duration in seconds
    pub window_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            key_prefix: "ironbell:rl".to_string(),
            fail_open: false,
            trust_proxy: false,
            limits: RateLimits::default(),
        }
    }
}

impl Default for RateLimits {
    fn default() -> Self {
        Self {
            login: LimitConfig {
                requests: 5,
                window_secs: 60,
            },
            api: LimitConfig {
                requests: 100,
                window_secs: 60,
            },
        }
    }
}

impl RateLimitConfig {
    /// Creates configuration from environment variables.
    ///
    /// Environment variables:
    /// - `RATE_LIMIT_ENABLED`: Enable/disable rate limiting (default: true)
    /// - `RATE_LIMIT_PREFIX`: Redis key prefix (default: "ironbell:rl")
    /// - `RATE_LIMIT_FAIL_OPEN`: Allow requests when Redis unavailable (default: false)
    /// - `RATE_LIMIT_TRUST_PROXY`: Trust the CF-Connecting-IP header (default: false)
    /// - `RATE_LIMIT_LOGIN`: Login limit as "requests,window_secs"
    /// - `RATE_LIMIT_API`: General API limit as "requests,window_secs"
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("RATE_LIMIT_ENABLED") {
            config.enabled = val.parse().unwrap_or(true);
        }
        if let Ok(val) = std::env::var("RATE_LIMIT_PREFIX") {
            config.key_prefix = val;
        }
        if let Ok(val) = std::env::var("RATE_LIMIT_FAIL_OPEN") {
            config.fail_open = val.parse().unwrap_or(false);
        }
        if let Ok(val) = std::env::var("RATE_LIMIT_TRUST_PROXY") {
            config.trust_proxy = val.parse().unwrap_or(false);
        }
        if let Ok(val) = std::env::var("RATE_LIMIT_LOGIN") {
            if let Some(limit) = parse_limit_config(&val) {
                config.limits.login = limit;
            }
        }
        if let Ok(val) = std::env::var("RATE_LIMIT_API") {
            if let Some(limit) = parse_limit_config(&val) {
                config.limits.api = limit;
            }
        }

        config
    }
}

/// Parses a limit config from "requests,window_secs" format.
fn parse_limit_config(val: &str) -> Option<LimitConfig> {
    let parts: Vec<&str> = val.split(',').collect();
    if parts.len() == 2 {
        let requests = parts[0].trim().parse().ok()?;
        let window_secs = parts[1].trim().parse().ok()?;
        Some(LimitConfig {
            requests,
            window_secs,
        })
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RateLimitConfig::default();
        assert!(config.enabled);
        assert_eq!(config.key_prefix, "ironbell:rl");
        assert!(!config.fail_open);
        assert!(!config.trust_proxy);
    }

    #[test]
    fn test_default_limits() {
        let limits = RateLimits::default();
        assert_eq!(limits.login.requests, 5);
        assert_eq!(limits.login.window_secs, 60);
        assert_eq!(limits.api.requests, 100);
        assert_eq!(limits.api.window_secs, 60);
    }

    #[test]
    fn test_parse_limit_config() {
        let limit = parse_limit_config("10,60").unwrap();
        assert_eq!(limit.requests, 10);
        assert_eq!(limit.window_secs, 60);

        // With whitespace
        let limit = parse_limit_config(" 20 , 120 ").unwrap();
        assert_eq!(limit.requests, 20);
        assert_eq!(limit.window_secs, 120);

        // Invalid formats
        assert!(parse_limit_config("10").is_none());
        assert!(parse_limit_config("10,60,extra").is_none());
        assert!(parse_limit_config("abc,60").is_none());
    }
}
