//! Contact form messages and admin replies.

pub mod handlers;
pub mod queries;
pub mod types;

use axum::routing::{get, post, put};
use axum::Router;

use crate::api::AppState;

pub use types::*;

/// Public submission route, relative to /api.
pub fn submit_router() -> Router<AppState> {
    Router::new().route("/contact", post(handlers::create))
}

/// Admin routes (mounted at /api/admin/contacts).
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list))
        .route("/{id}", get(handlers::get).delete(handlers::delete))
        .route("/{id}/status", put(handlers::update_status))
        .route("/{id}/reply", post(handlers::reply))
}
