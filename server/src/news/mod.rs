//! News articles.

pub mod handlers;
pub mod queries;
pub mod types;

use axum::routing::get;
use axum::Router;

use crate::api::AppState;

pub use types::*;

/// Public routes (mounted at /api/news).
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_public))
        .route("/{slug}", get(handlers::get_by_slug))
}

/// Admin routes (mounted at /api/admin/news).
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
