//! Rate limiting configuration.

use std::collections::HashSet;

use super::types::RateLimitCategory;

/// Configuration for the rate limiting system.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Whether rate limiting is enabled
    pub enabled: bool,
    /// Whether to trust X-Forwarded-For headers
    pub trust_proxy: bool,
    /// IP addresses that bypass rate limiting
    pub allowlist: HashSet<String>,
    /// Per-category rate limits
    pub limits: RateLimits,
}

/// Rate limits for each category.
#[derive(Debug, Clone)]
pub struct RateLimits {
    pub auth_login: LimitConfig,
    pub auth_register: LimitConfig,
    pub submit: LimitConfig,
    pub read: LimitConfig,
    pub write: LimitConfig,
    /// Failed authentication tracking
    pub failed_auth: FailedAuthConfig,
}

impl RateLimits {
    /// Limit that applies to `category`.
    #[must_use]
    pub const fn get(&self, category: RateLimitCategory) -> &LimitConfig {
        match category {
            RateLimitCategory::AuthLogin => &self.auth_login,
            RateLimitCategory::AuthRegister => &self.auth_register,
            RateLimitCategory::Submit => &self.submit,
            RateLimitCategory::Read => &self.read,
            RateLimitCategory::Write => &self.write,
        }
    }
}

/// Configuration for a single rate limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimitConfig {
    /// Maximum requests allowed in the window
    pub requests: u32,
    /// Window duration in seconds
    pub window_secs: u64,
}

/// Configuration for failed authentication tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailedAuthConfig {
    /// Maximum failed attempts before blocking
    pub max_failures: u32,
    /// Duration to block in seconds after max failures
    pub block_duration_secs: u64,
    /// Window for counting failures in seconds
    pub window_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            trust_proxy: false,
            allowlist: HashSet::new(),
            limits: RateLimits::default(),
        }
    }
}

impl Default for RateLimits {
    fn default() -> Self {
        Self {
            auth_login: LimitConfig { requests: 5, window_secs: 900 },
            auth_register: LimitConfig { requests: 3, window_secs: 3600 },
            submit: LimitConfig { requests: 10, window_secs: 600 },
            read: LimitConfig { requests: 300, window_secs: 60 },
            write: LimitConfig { requests: 60, window_secs: 60 },
            failed_auth: FailedAuthConfig {
                max_failures: 10,
                block_duration_secs: 900,
                window_secs: 300,
            },
        }
    }
}

impl RateLimitConfig {
    /// Creates configuration from environment variables.
    ///
    /// Environment variables:
    /// - `RATE_LIMIT_ENABLED`: Enable/disable rate limiting (default: true)
    /// - `RATE_LIMIT_TRUST_PROXY`: Trust X-Forwarded-For headers (default: false)
    /// - `RATE_LIMIT_ALLOWLIST`: Comma-separated IP allowlist
    /// - `RATE_LIMIT_AUTH_LOGIN`, `RATE_LIMIT_AUTH_REGISTER`, `RATE_LIMIT_SUBMIT`,
    ///   `RATE_LIMIT_READ`, `RATE_LIMIT_WRITE`: "requests,window_secs"
    /// - `RATE_LIMIT_FAILED_AUTH`: "max_failures,block_duration_secs,window_secs"
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("RATE_LIMIT_ENABLED") {
            config.enabled = val.parse().unwrap_or(true);
        }
        if let Ok(val) = std::env::var("RATE_LIMIT_TRUST_PROXY") {
            config.trust_proxy = val.parse().unwrap_or(false);
        }
        if let Ok(val) = std::env::var("RATE_LIMIT_ALLOWLIST") {
            config.allowlist = val
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
        }

        let limits = &mut config.limits;
        for (var, slot) in [
            ("RATE_LIMIT_AUTH_LOGIN", &mut limits.auth_login),
            ("RATE_LIMIT_AUTH_REGISTER", &mut limits.auth_register),
            ("RATE_LIMIT_SUBMIT", &mut limits.submit),
            ("RATE_LIMIT_READ", &mut limits.read),
            ("RATE_LIMIT_WRITE", &mut limits.write),
        ] {
            if let Some(limit) = std::env::var(var).ok().as_deref().and_then(parse_limit_config) {
                *slot = limit;
            }
        }
        if let Some(failed) = std::env::var("RATE_LIMIT_FAILED_AUTH")
            .ok()
            .as_deref()
            .and_then(parse_failed_auth_config)
        {
            limits.failed_auth = failed;
        }

        config
    }
}

/// Parses a limit config from "requests,window_secs" format.
fn parse_limit_config(val: &str) -> Option<LimitConfig> {
    let (requests, window_secs) = val.split_once(',')?;
    Some(LimitConfig {
        requests: requests.trim().parse().ok()?,
        window_secs: window_secs.trim().parse().ok()?,
    })
}

/// Parses a failed auth config from "max_failures,block_duration_secs,window_secs" format.
fn parse_failed_auth_config(val: &str) -> Option<FailedAuthConfig> {
    let parts: Vec<&str> = val.split(',').map(str::trim).collect();
    let [max_failures, block_duration_secs, window_secs] = parts.as_slice() else {
        return None;
    };
    Some(FailedAuthConfig {
        max_failures: max_failures.parse().ok()?,
        block_duration_secs: block_duration_secs.parse().ok()?,
        window_secs: window_secs.parse().ok()?,
    })
}
