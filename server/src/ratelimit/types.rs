//! Rate limiting types.

/// Categories for rate limiting with different thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RateLimitCategory {
    /// Login attempts
    AuthLogin,
    /// Registration attempts
    AuthRegister,
    /// Public form submissions (donations, volunteers, contact)
    Submit,
    /// Public read operations
    Read,
    /// Admin write operations (create/update/delete/upload)
    Write,
}

impl RateLimitCategory {
    /// Returns the string identifier for this category (used in limiter keys).
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::AuthLogin => "auth_login",
            Self::AuthRegister => "auth_register",
            Self::Submit => "submit",
            Self::Read => "read",
            Self::Write => "write",
        }
    }

    pub const fn all() -> &'static [RateLimitCategory] {
        &[
            Self::AuthLogin,
            Self::AuthRegister,
            Self::Submit,
            Self::Read,
            Self::Write,
        ]
    }
}

/// Result of a rate limit check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitResult {
    /// Whether the request is allowed
    pub allowed: bool,
    /// Maximum requests allowed in the window
    pub limit: u32,
    /// Remaining requests in the current window
    pub remaining: u32,
    /// Seconds until the window resets, rounded up
    pub reset_after: u64,
    /// Seconds to wait before retrying (0 if allowed)
    pub retry_after: u64,
}

/// Normalized IP address stored in request extensions.
///
/// IPv4 addresses are stored as-is.
/// IPv6 addresses are normalized to /64 prefix for rate limiting.
#[derive(Debug, Clone)]
pub struct NormalizedIp(pub String);

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_category_keys_are_distinct() {
        let keys: HashSet<_> = RateLimitCategory::all()
            .iter()
            .map(RateLimitCategory::as_str)
            .collect();
        assert_eq!(keys.len(), RateLimitCategory::all().len());
        assert!(keys.iter().all(|k| !k.contains(':')));
    }
}
