//! Rate limiting error types for HTTP responses.

use axum::http::header::{HeaderMap, HeaderValue, RETRY_AFTER};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::ratelimit::RateLimitResult;

/// Errors that can occur during rate limit checks.
#[derive(Debug)]
pub enum RateLimitError {
    /// Request exceeded the rate limit.
    LimitExceeded(RateLimitResult),
    /// IP is temporarily blocked due to repeated failures.
    IpBlocked { retry_after: u64 },
}

/// JSON response body for rate limit errors.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitErrorResponse {
    /// Error code identifier.
    pub error: &'static str,
    /// Human-readable error message.
    pub message: String,
    /// Seconds to wait before retrying.
    pub retry_after: u64,
}

/// Writes the `X-RateLimit-*` headers for `result`.
pub fn insert_rate_limit_headers(headers: &mut HeaderMap, result: &RateLimitResult) {
    headers.insert("X-RateLimit-Limit", HeaderValue::from(result.limit));
    headers.insert("X-RateLimit-Remaining", HeaderValue::from(result.remaining));
    headers.insert("X-RateLimit-Reset", HeaderValue::from(result.reset_after));
}

impl IntoResponse for RateLimitError {
    fn into_response(self) -> Response {
        let (code, message, retry_after, result) = match self {
            Self::LimitExceeded(result) => (
                "RATE_LIMITED",
                format!(
                    "Too many requests. Please try again in {} seconds.",
                    result.retry_after
                ),
                result.retry_after,
                Some(result),
            ),
            Self::IpBlocked { retry_after } => (
                "IP_BLOCKED",
                format!("Too many failed login attempts. Please try again in {retry_after} seconds."),
                retry_after,
                None,
            ),
        };

        let body = RateLimitErrorResponse {
            error: code,
            message,
            retry_after,
        };
        let mut response = (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();
        let headers = response.headers_mut();
        headers.insert(RETRY_AFTER, HeaderValue::from(retry_after));
        if let Some(result) = result {
            insert_rate_limit_headers(headers, &result);
        }
        response
    }
}
