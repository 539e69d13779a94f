//! Core rate limiter service backed by in-process maps.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::ratelimit::{RateLimitCategory, RateLimitConfig, RateLimitResult};

/// Counter for one identifier in one category.
#[derive(Debug, Clone, Copy)]
struct Window {
    count: u32,
    reset_at: Instant,
}

/// Failed-login history for one IP.
#[derive(Debug, Clone, Copy)]
struct FailureEntry {
    count: u32,
    window_reset: Instant,
    blocked_until: Option<Instant>,
}

impl FailureEntry {
    fn is_blocked(&self, now: Instant) -> bool {
        self.blocked_until.is_some_and(|until| until > now)
    }

    fn is_stale(&self, now: Instant) -> bool {
        self.window_reset <= now && !self.is_blocked(now)
    }
}

/// Whole seconds until `deadline`, rounded up.
fn seconds_until(deadline: Instant, now: Instant) -> u64 {
    let remaining = deadline.saturating_duration_since(now);
    remaining.as_secs() + u64::from(remaining.subsec_nanos() > 0)
}

/// Fixed-window rate limiter with failed-login blocking.
///
/// Cloning is cheap; clones share state. Separate instances never do, so
/// tests can build isolated limiters.
#[derive(Clone)]
pub struct RateLimiter {
    config: Arc<RateLimitConfig>,
    windows: Arc<DashMap<String, Window>>,
    failures: Arc<DashMap<String, FailureEntry>>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config: Arc::new(config),
            windows: Arc::new(DashMap::new()),
            failures: Arc::new(DashMap::new()),
        }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    fn build_key(category: RateLimitCategory, identifier: &str) -> String {
        format!("{}:{identifier}", category.as_str())
    }

    fn is_allowed_by_config(&self, identifier: &str) -> bool {
        self.config.allowlist.contains(identifier)
    }

    /// Counts a request from `identifier` and reports whether it may proceed.
    ///
    /// The first request opens a window with a count of 1. Requests beyond
    /// the category's limit are refused until the window expires.
    pub fn check(&self, category: RateLimitCategory, identifier: &str) -> RateLimitResult {
        let limit = *self.config.limits.get(category);

        if !self.config.enabled || self.is_allowed_by_config(identifier) {
            return RateLimitResult {
                allowed: true,
                limit: limit.requests,
                remaining: limit.requests,
                reset_after: 0,
                retry_after: 0,
            };
        }

        let now = Instant::now();
        let window = Duration::from_secs(limit.window_secs);
        let fresh = Window {
            count: 0,
            reset_at: now + window,
        };

        let (count, reset_at) = {
            let mut entry = self
                .windows
                .entry(Self::build_key(category, identifier))
                .or_insert(fresh);
            if entry.reset_at <= now {
                *entry = fresh;
            }
            entry.count = entry.count.saturating_add(1);
            (entry.count, entry.reset_at)
        };

        let allowed = count <= limit.requests;
        let reset_after = seconds_until(reset_at, now);

        RateLimitResult {
            allowed,
            limit: limit.requests,
            remaining: limit.requests.saturating_sub(count),
            reset_after,
            retry_after: if allowed { 0 } else { reset_after },
        }
    }

    /// Forgets every window held by `identifier`.
    pub fn reset(&self, identifier: &str) {
        self.windows
            .retain(|key, _| key.split_once(':').is_none_or(|(_, id)| id != identifier));
    }

    /// Records a failed login from `ip`. Returns `true` once the IP is blocked.
    pub fn record_failed_auth(&self, ip: &str) -> bool {
        let cfg = self.config.limits.failed_auth;
        let now = Instant::now();
        let fresh = FailureEntry {
            count: 0,
            window_reset: now + Duration::from_secs(cfg.window_secs),
            blocked_until: None,
        };

        let mut entry = self.failures.entry(ip.to_string()).or_insert(fresh);
        if entry.is_stale(now) {
            *entry = fresh;
        }
        entry.count = entry.count.saturating_add(1);

        if entry.count >= cfg.max_failures {
            entry.blocked_until = Some(now + Duration::from_secs(cfg.block_duration_secs));
            warn!(ip = %ip, failures = entry.count, "IP blocked after failed authentication");
            return true;
        }

        debug!(ip = %ip, failures = entry.count, "Failed authentication recorded");
        false
    }

    /// Whether `ip` is currently blocked.
    pub fn is_blocked(&self, ip: &str) -> bool {
        if self.is_allowed_by_config(ip) {
            return false;
        }
        let now = Instant::now();
        self.failures.get(ip).is_some_and(|e| e.is_blocked(now))
    }

    /// Seconds left on the block for `ip`, if blocked.
    pub fn block_ttl(&self, ip: &str) -> Option<u64> {
        let now = Instant::now();
        let entry = self.failures.get(ip)?;
        entry
            .blocked_until
            .filter(|until| *until > now)
            .map(|until| seconds_until(until, now))
    }

    /// Clears the failure history of `ip` after a successful login.
    pub fn clear_failed_auth(&self, ip: &str) {
        self.failures.remove(ip);
    }

    /// Drops expired windows and stale failure entries. Returns how many
    /// entries were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.windows.len() + self.failures.len();
        self.windows.retain(|_, w| w.reset_at > now);
        self.failures.retain(|_, f| !f.is_stale(now));
        before.saturating_sub(self.windows.len() + self.failures.len())
    }

    /// Runs [`Self::purge_expired`] every `interval` in the background.
    pub fn spawn_cleanup(&self, interval: Duration) -> JoinHandle<()> {
        let limiter = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // First tick completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let removed = limiter.purge_expired();
                if removed > 0 {
                    debug!(removed, "Purged expired rate limit entries");
                }
            }
        })
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("enabled", &self.config.enabled)
            .field("windows", &self.windows.len())
            .field("failures", &self.failures.len())
            .finish()
    }
}

/// Builds the limiter from the environment, or `None` when disabled.
pub fn rate_limiter_from_env() -> Option<RateLimiter> {
    let config = RateLimitConfig::from_env();
    if !config.enabled {
        info!("Rate limiting disabled");
        return None;
    }
    info!(trust_proxy = config.trust_proxy, "Rate limiting enabled");
    Some(RateLimiter::new(config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ratelimit::{FailedAuthConfig, LimitConfig};

    fn limiter_with(write: LimitConfig) -> RateLimiter {
        let mut config = RateLimitConfig::default();
        config.limits.write = write;
        config.limits.failed_auth = FailedAuthConfig {
            max_failures: 3,
            block_duration_secs: 60,
            window_secs: 60,
        };
        RateLimiter::new(config)
    }

    #[test]
    fn test_fixed_window_counts() {
        let limiter = limiter_with(LimitConfig { requests: 2, window_secs: 60 });

        let first = limiter.check(RateLimitCategory::Write, "1.2.3.4");
        assert!(first.allowed);
        assert_eq!(first.remaining, 1);
        assert_eq!(first.reset_after, 60);

        let second = limiter.check(RateLimitCategory::Write, "1.2.3.4");
        assert!(second.allowed);
        assert_eq!(second.remaining, 0);

        let third = limiter.check(RateLimitCategory::Write, "1.2.3.4");
        assert!(!third.allowed);
        assert_eq!(third.remaining, 0);
        assert!(third.retry_after > 0 && third.retry_after <= 60);
    }

    #[test]
    fn test_identifiers_and_categories_are_independent() {
        let limiter = limiter_with(LimitConfig { requests: 1, window_secs: 60 });

        assert!(limiter.check(RateLimitCategory::Write, "a").allowed);
        assert!(!limiter.check(RateLimitCategory::Write, "a").allowed);
        assert!(limiter.check(RateLimitCategory::Write, "b").allowed);
        assert!(limiter.check(RateLimitCategory::Read, "a").allowed);
    }

    #[test]
    fn test_instances_do_not_share_state() {
        let config = LimitConfig { requests: 1, window_secs: 60 };
        let a = limiter_with(config);
        let b = limiter_with(config);

        assert!(a.check(RateLimitCategory::Write, "ip").allowed);
        assert!(b.check(RateLimitCategory::Write, "ip").allowed);

        let shared = a.clone();
        assert!(!shared.check(RateLimitCategory::Write, "ip").allowed);
    }

    #[test]
    fn test_expired_window_restarts() {
        let limiter = limiter_with(LimitConfig { requests: 1, window_secs: 0 });

        assert!(limiter.check(RateLimitCategory::Write, "ip").allowed);
        // Zero-length windows expire immediately
        assert!(limiter.check(RateLimitCategory::Write, "ip").allowed);
        assert_eq!(limiter.purge_expired(), 1);
    }

    #[test]
    fn test_reset_identifier() {
        let limiter = limiter_with(LimitConfig { requests: 1, window_secs: 60 });

        limiter.check(RateLimitCategory::Write, "2001:db8::/64");
        limiter.check(RateLimitCategory::Write, "other");
        limiter.reset("2001:db8::/64");

        assert!(limiter.check(RateLimitCategory::Write, "2001:db8::/64").allowed);
        assert!(!limiter.check(RateLimitCategory::Write, "other").allowed);
    }

    #[test]
    fn test_allowlist_bypasses_limits() {
        let mut config = RateLimitConfig::default();
        config.limits.write = LimitConfig { requests: 1, window_secs: 60 };
        config.allowlist.insert("10.0.0.1".into());
        let limiter = RateLimiter::new(config);

        for _ in 0..5 {
            assert!(limiter.check(RateLimitCategory::Write, "10.0.0.1").allowed);
        }
    }

    #[test]
    fn test_failed_auth_blocks_and_clears() {
        let limiter = limiter_with(LimitConfig { requests: 10, window_secs: 60 });

        assert!(!limiter.record_failed_auth("5.6.7.8"));
        assert!(!limiter.record_failed_auth("5.6.7.8"));
        assert!(!limiter.is_blocked("5.6.7.8"));
        assert!(limiter.record_failed_auth("5.6.7.8"));
        assert!(limiter.is_blocked("5.6.7.8"));

        let ttl = limiter.block_ttl("5.6.7.8").unwrap();
        assert!(ttl > 0 && ttl <= 60);

        limiter.clear_failed_auth("5.6.7.8");
        assert!(!limiter.is_blocked("5.6.7.8"));
        assert_eq!(limiter.block_ttl("5.6.7.8"), None);
    }

    #[test]
    fn test_seconds_until_rounds_up() {
        let now = Instant::now();
        assert_eq!(seconds_until(now + Duration::from_millis(1500), now), 2);
        assert_eq!(seconds_until(now + Duration::from_secs(3), now), 3);
        assert_eq!(seconds_until(now, now + Duration::from_secs(1)), 0);
    }
}
