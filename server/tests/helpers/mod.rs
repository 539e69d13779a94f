//! Reusable test helpers for HTTP integration tests.
//!
//! Provides `TestApp` for building and sending requests through the full
//! axum router, plus utilities for admin tokens and multipart bodies.
//!
//! ## Database
//!
//! `TestApp::new()` uses a lazily connected pool, so tests that never reach
//! a query run without PostgreSQL. Tests that do need the database call
//! [`TestApp::with_database()`] and are marked `#[ignore]`; run them with
//! `TEST_DATABASE_URL` set and `cargo test -- --ignored`.
#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{self, header, Method, Request, Response};
use axum::Router;
use chrono::Utc;
use http_body_util::BodyExt;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tempfile::TempDir;
use tower::ServiceExt;

use charity_server::api::{create_router, AppState, AppStateConfig};
use charity_server::auth::jwt;
use charity_server::config::Config;
use charity_server::db::{self, Admin, AdminRole};
use charity_server::ratelimit::RateLimiter;

/// Boundary used by [`MultipartBuilder`].
pub const BOUNDARY: &str = "----charity-test-boundary";

/// Smallest body that passes the PNG signature check.
pub const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

// ============================================================================
// Test App
// ============================================================================

/// A test application wrapping the full axum router.
pub struct TestApp {
    pub router: Router,
    pub pool: PgPool,
    pub config: Arc<Config>,
    /// Upload root; removed when the app is dropped.
    pub upload_dir: TempDir,
}

impl TestApp {
    /// App without rate limiting, backed by a lazily connected pool.
    pub fn new() -> Self {
        Self::build(None, None)
    }

    /// App with the given limiter installed.
    pub fn with_rate_limiter(limiter: RateLimiter) -> Self {
        Self::build(Some(limiter), None)
    }

    /// App backed by a migrated database at `TEST_DATABASE_URL`.
    pub async fn with_database() -> Self {
        let config = Config::default_for_test();
        let pool = db::create_pool(&config.database_url)
            .await
            .expect("Failed to connect to test DB");
        db::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        Self::build(None, Some(pool))
    }

    fn build(rate_limiter: Option<RateLimiter>, pool: Option<PgPool>) -> Self {
        let upload_dir = TempDir::new().expect("Failed to create upload dir");
        let mut config = Config::default_for_test();
        config.upload_root = upload_dir.path().to_path_buf();

        let pool = pool.unwrap_or_else(|| {
            PgPoolOptions::new()
                .connect_lazy(&config.database_url)
                .expect("Invalid test database URL")
        });

        let state = AppState::new(AppStateConfig {
            db: pool.clone(),
            config: config.clone(),
            email: None,
            rate_limiter,
        });

        Self {
            router: create_router(state),
            pool,
            config: Arc::new(config),
            upload_dir,
        }
    }

    /// Build an HTTP request with the given method and URI.
    pub fn request(method: Method, uri: &str) -> http::request::Builder {
        Request::builder().method(method).uri(uri)
    }

    /// Send a request through the router via `tower::ServiceExt::oneshot`.
    pub async fn oneshot(&self, request: Request<Body>) -> Response<Body> {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("oneshot request failed")
    }

    /// Bearer token for a (not necessarily persisted) admin.
    pub fn token(&self, admin_id: i32, role: AdminRole) -> String {
        admin_token(&self.config, admin_id, role)
    }

    /// Absolute path of a public `/uploads/...` path inside the upload dir.
    pub fn stored_path(&self, public_path: &str) -> std::path::PathBuf {
        let relative = public_path
            .strip_prefix("/uploads/")
            .expect("not an upload path");
        self.upload_dir.path().join(relative)
    }

    /// Number of regular files below `folder` in the upload dir.
    pub fn file_count(&self, folder: &str) -> usize {
        count_files(&self.upload_dir.path().join(folder))
    }
}

fn count_files(dir: &Path) -> usize {
    std::fs::read_dir(dir)
        .map(|entries| entries.filter_map(Result::ok).count())
        .unwrap_or(0)
}

// ============================================================================
// Auth helpers
// ============================================================================

/// Generate a bearer token for an admin with the given id and role.
pub fn admin_token(config: &Config, admin_id: i32, role: AdminRole) -> String {
    let now = Utc::now();
    let admin = Admin {
        id: admin_id,
        username: format!("admin{admin_id}"),
        email: format!("admin{admin_id}@example.org"),
        password_hash: String::new(),
        full_name: None,
        role,
        is_active: true,
        last_login: None,
        created_at: now,
        updated_at: now,
    };
    jwt::generate_token(&admin, &config.jwt_secret, config.jwt_expiry)
        .expect("Failed to generate token")
}

/// `Authorization` header value for `token`.
pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

// ============================================================================
// Bodies
// ============================================================================

/// Collect a response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to read body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("Response body is not JSON")
}

/// JSON request body.
pub fn json_body(value: &serde_json::Value) -> Body {
    Body::from(serde_json::to_vec(value).expect("Failed to serialize body"))
}

/// Builds `multipart/form-data` bodies by hand.
#[derive(Default)]
pub struct MultipartBuilder {
    body: Vec<u8>,
}

impl MultipartBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, filename: &str, content_type: &str, bytes: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; \
                 filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(bytes);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    /// Finishes the body and applies it to `builder`.
    pub fn into_request(mut self, builder: http::request::Builder) -> Request<Body> {
        self.body
            .extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        builder
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(self.body))
            .expect("Failed to build multipart request")
    }
}
