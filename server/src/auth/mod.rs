//! Authentication Service
//!
//! Admin login, registration and bearer-token middleware.

mod error;
mod handlers;
pub mod jwt;
mod middleware;
pub mod password;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};

use crate::api::AppState;
use crate::ratelimit::{check_ip_not_blocked, rate_limit_by_ip, with_category, RateLimitCategory};

pub use error::{AuthError, AuthResult, ErrorResponse};
pub use middleware::{bearer_claims, require_auth, AuthAdmin};

/// Create authentication router.
///
/// - POST /login - Login with username/password
/// - POST /register - Register an admin (bootstrap or super admin only)
/// - GET /me - Current admin profile (auth required)
pub fn router(state: AppState) -> Router<AppState> {
    // Login route with IP block check and rate limiting
    let login_route = Router::new()
        .route("/login", post(handlers::login))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            rate_limit_by_ip,
        ))
        .layer(axum_middleware::from_fn(with_category(
            RateLimitCategory::AuthLogin,
        )))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            check_ip_not_blocked,
        ));

    let register_route = Router::new()
        .route("/register", post(handlers::register))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            rate_limit_by_ip,
        ))
        .layer(axum_middleware::from_fn(with_category(
            RateLimitCategory::AuthRegister,
        )));

    let protected_routes = Router::new()
        .route("/me", get(handlers::me))
        .layer(axum_middleware::from_fn_with_state(state, require_auth));

    login_route.merge(register_route).merge(protected_routes)
}
