//! Axum middleware for rate limiting.
//!
//! Public endpoints are limited by client IP; admin endpoints by the
//! authenticated admin, falling back to IP.

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::api::AppState;
use crate::auth::AuthAdmin;
use crate::ratelimit::{
    extract_client_ip, insert_rate_limit_headers, normalize_ip, NormalizedIp, RateLimitCategory,
    RateLimitError, RateLimiter,
};

fn category_of(request: &Request) -> RateLimitCategory {
    request
        .extensions()
        .get::<RateLimitCategory>()
        .copied()
        .unwrap_or(RateLimitCategory::Read)
}

/// Normalized client IP, stored in request extensions for downstream use.
///
/// The peer address is read from the `ConnectInfo` extension set by
/// `into_make_service_with_connect_info`; it is absent in router-level tests.
fn client_ip(limiter: &RateLimiter, request: &mut Request) -> String {
    if let Some(existing) = request.extensions().get::<NormalizedIp>() {
        return existing.0.clone();
    }
    let connect_info = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .cloned();
    let ip = normalize_ip(extract_client_ip(
        request.headers(),
        connect_info.as_ref(),
        limiter.config().trust_proxy,
    ));
    request.extensions_mut().insert(NormalizedIp(ip.clone()));
    ip
}

async fn enforce(
    limiter: &RateLimiter,
    category: RateLimitCategory,
    identifier: &str,
    request: Request,
    next: Next,
) -> Result<Response, RateLimitError> {
    let result = limiter.check(category, identifier);

    if !result.allowed {
        debug!(
            category = %category.as_str(),
            identifier = %identifier,
            retry_after = result.retry_after,
            "Rate limit exceeded"
        );
        return Err(RateLimitError::LimitExceeded(result));
    }

    let mut response = next.run(request).await;
    insert_rate_limit_headers(response.headers_mut(), &result);
    Ok(response)
}

/// Middleware to rate limit requests by client IP address.
///
/// The category comes from [`with_category`]. Requests pass through
/// untouched when no limiter is configured.
///
/// ```ignore
/// Router::new()
///     .route("/login", post(login_handler))
///     .layer(from_fn_with_state(state.clone(), rate_limit_by_ip))
///     .layer(from_fn(with_category(RateLimitCategory::AuthLogin)))
/// ```
#[tracing::instrument(skip(state, request, next))]
pub async fn rate_limit_by_ip(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, RateLimitError> {
    let Some(ref limiter) = state.rate_limiter else {
        return Ok(next.run(request).await);
    };

    let category = category_of(&request);
    let ip = client_ip(limiter, &mut request);

    enforce(limiter, category, &ip, request, next).await
}

/// Middleware to rate limit requests by authenticated admin.
///
/// Must run after `require_auth`. Falls back to the client IP when no
/// admin is present.
#[tracing::instrument(skip(state, request, next))]
pub async fn rate_limit_by_admin(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, RateLimitError> {
    let Some(ref limiter) = state.rate_limiter else {
        return Ok(next.run(request).await);
    };

    let category = category_of(&request);
    let identifier = match request.extensions().get::<AuthAdmin>() {
        Some(admin) => format!("admin-{}", admin.id),
        None => client_ip(limiter, &mut request),
    };

    enforce(limiter, category, &identifier, request, next).await
}

/// Middleware to reject IPs blocked after repeated failed logins.
///
/// Apply in front of `rate_limit_by_ip` on the login route.
#[tracing::instrument(skip(state, request, next))]
pub async fn check_ip_not_blocked(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, RateLimitError> {
    let Some(ref limiter) = state.rate_limiter else {
        return Ok(next.run(request).await);
    };

    let ip = client_ip(limiter, &mut request);

    if limiter.is_blocked(&ip) {
        let retry_after = limiter.block_ttl(&ip).unwrap_or(0);
        debug!(ip = %ip, retry_after, "IP is blocked");
        return Err(RateLimitError::IpBlocked { retry_after });
    }

    Ok(next.run(request).await)
}

/// Sets the rate limit category for downstream middleware.
///
/// Layer it outside `rate_limit_by_ip` / `rate_limit_by_admin` so it runs
/// first.
pub fn with_category(
    category: RateLimitCategory,
) -> impl Fn(Request, Next) -> std::pin::Pin<Box<dyn std::future::Future<Output = Response> + Send>>
       + Clone
       + Send
       + 'static {
    move |mut request: Request, next: Next| {
        request.extensions_mut().insert(category);
        Box::pin(async move { next.run(request).await })
    }
}
