//! Fundraising programs.
//!
//! Public listing of active programs and admin CRUD. Program images are
//! uploaded separately and referenced by their `/uploads/` path.

pub mod handlers;
pub mod queries;
pub mod types;

use axum::routing::get;
use axum::Router;

use crate::api::AppState;

pub use types::*;

/// Public routes (mounted at /api/programs).
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_active))
        .route("/{slug}", get(handlers::get_by_slug))
}

/// Admin routes (mounted at /api/admin/programs).
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list).post(handlers::create))
        .route(
            "/{id}",
            get(handlers::get)
                .put(handlers::update)
                .delete(handlers::delete),
        )
}
