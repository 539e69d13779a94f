//! API Router and Application State
//!
//! Central routing configuration and shared state.

pub mod error;
pub mod response;

use axum::{
    extract::{DefaultBodyLimit, State},
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE, RETRY_AFTER},
        HeaderName, HeaderValue, Method,
    },
    middleware::{from_fn, from_fn_with_state},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, services::ServeDir, trace::TraceLayer,
};
use tracing::warn;

use crate::{
    auth,
    config::Config,
    contacts, donations,
    email::EmailService,
    events, news, programs,
    ratelimit::{
        rate_limit_by_admin, rate_limit_by_ip, with_category, RateLimitCategory, RateLimiter,
    },
    team,
    uploads::{self, UploadStore},
    volunteers,
};

pub use error::{ApiError, ApiResult};
pub use response::{Submitted, Success};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,
    /// Server configuration
    pub config: Arc<Config>,
    /// Upload store rooted at `config.upload_root`
    pub uploads: UploadStore,
    /// Outgoing email (None when SMTP is not configured)
    pub email: Option<EmailService>,
    /// Rate limiter (None disables rate limiting)
    pub rate_limiter: Option<RateLimiter>,
}

/// Everything needed to build an [`AppState`].
pub struct AppStateConfig {
    pub db: PgPool,
    pub config: Config,
    pub email: Option<EmailService>,
    pub rate_limiter: Option<RateLimiter>,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(cfg: AppStateConfig) -> Self {
        let uploads = UploadStore::new(cfg.config.upload_root.clone());
        Self {
            db: cfg.db,
            config: Arc::new(cfg.config),
            uploads,
            email: cfg.email,
            rate_limiter: cfg.rate_limiter,
        }
    }

    /// Check if outgoing email is configured.
    #[must_use]
    pub const fn has_email(&self) -> bool {
        self.email.is_some()
    }
}

/// Headers the browser may read from cross-origin responses.
const EXPOSED_HEADERS: [HeaderName; 4] = [
    HeaderName::from_static("x-ratelimit-limit"),
    HeaderName::from_static("x-ratelimit-remaining"),
    HeaderName::from_static("x-ratelimit-reset"),
    RETRY_AFTER,
];

fn cors_layer(config: &Config) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .expose_headers(EXPOSED_HEADERS)
        .allow_credentials(true);

    match HeaderValue::from_str(&config.frontend_url) {
        Ok(origin) => cors.allow_origin(origin),
        Err(_) => {
            warn!(
                frontend_url = %config.frontend_url,
                "FRONTEND_URL is not a valid origin; cross-origin requests will be refused"
            );
            cors
        }
    }
}

/// Create the main application router.
pub fn create_router(state: AppState) -> Router {
    let max_body_size = state.config.max_body_size;
    let upload_root = state.uploads.root().to_path_buf();
    let cors = cors_layer(&state.config);

    // Public content, rate limited by IP (Read category)
    let public_reads = Router::new()
        .nest("/api/programs", programs::public_router())
        .nest("/api/news", news::public_router())
        .nest("/api/events", events::public_router())
        .nest("/api/team", team::public_router())
        .nest("/api/donations", donations::public_router())
        .layer(from_fn_with_state(state.clone(), rate_limit_by_ip))
        .layer(from_fn(with_category(RateLimitCategory::Read)));

    // Public forms, rate limited by IP (Submit category)
    let public_submissions = Router::new()
        .merge(donations::submit_router())
        .merge(volunteers::submit_router())
        .merge(contacts::submit_router())
        .layer(from_fn_with_state(state.clone(), rate_limit_by_ip))
        .layer(from_fn(with_category(RateLimitCategory::Submit)));

    // Admin routes: auth runs first so the limiter can key by admin
    let admin_routes = Router::new()
        .nest("/programs", programs::admin_router())
        .nest("/news", news::admin_router())
        .nest("/events", events::admin_router())
        .nest("/team", team::admin_router())
        .nest("/donations", donations::admin_router())
        .nest("/volunteers", volunteers::admin_router())
        .nest("/contacts", contacts::admin_router())
        .nest("/upload", uploads::admin_router())
        .layer(from_fn_with_state(state.clone(), rate_limit_by_admin))
        .layer(from_fn(with_category(RateLimitCategory::Write)))
        .layer(from_fn_with_state(state.clone(), auth::require_auth));

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .nest("/api/auth", auth::router(state.clone()))
        .merge(public_reads)
        .nest("/api", public_submissions)
        .nest("/api/admin", admin_routes)
        // Stored uploads
        .nest_service("/uploads", ServeDir::new(upload_root))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
        // Raise the body limit for multipart uploads (default is 2MB)
        .layer(DefaultBodyLimit::max(max_body_size))
        // State
        .with_state(state)
}

#[derive(Serialize)]
struct RootResponse {
    message: String,
    version: &'static str,
}

async fn root(State(state): State<AppState>) -> Json<RootResponse> {
    Json(RootResponse {
        message: format!("{} API", state.config.org_name),
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Health check response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    /// Service status
    status: &'static str,
    /// Whether rate limiting is enabled
    rate_limiting: bool,
    /// Whether outgoing email is configured
    email: bool,
}

/// Health check endpoint.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        rate_limiting: state.rate_limiter.is_some(),
        email: state.has_email(),
    })
}
