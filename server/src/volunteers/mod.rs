//! Volunteer applications.

pub mod handlers;
pub mod queries;
pub mod types;

use axum::routing::{get, post, put};
use axum::Router;

use crate::api::AppState;

pub use types::*;

/// Public submission route, relative to /api.
pub fn submit_router() -> Router<AppState> {
    Router::new().route("/volunteers", post(handlers::create))
}

/// Admin routes (mounted at /api/admin/volunteers).
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list))
        .route("/{id}", get(handlers::get).delete(handlers::delete))
        .route("/{id}/status", put(handlers::update_status))
}
