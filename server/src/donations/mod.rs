//! Donation intake and payment review.

pub mod handlers;
pub mod queries;
pub mod types;

use axum::routing::{get, post, put};
use axum::Router;

use crate::api::AppState;

pub use types::*;

/// Public read routes (mounted at /api/donations).
pub fn public_router() -> Router<AppState> {
    Router::new().route("/recent", get(handlers::recent))
}

/// Public submission route, relative to /api.
pub fn submit_router() -> Router<AppState> {
    Router::new().route("/donations", post(handlers::create))
}

/// Admin routes (mounted at /api/admin/donations).
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list))
        .route("/{id}", get(handlers::get).delete(handlers::delete))
        .route("/{id}/status", put(handlers::update_status))
        .route("/{id}/send-email", post(handlers::send_email))
}
