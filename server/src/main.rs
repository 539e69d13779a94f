//! Charity Server - Main Entry Point

use anyhow::Result;
use std::net::SocketAddr;
use std::time::Duration;
use tracing::{info, warn};

use charity_server::{api, config, db, email::EmailService, ratelimit};

/// How often expired rate limit windows are purged.
const RATE_LIMIT_PURGE_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env before anything reads the environment
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "charity_server=debug,tower_http=debug".into()),
        )
        .json()
        .init();

    let config = config::Config::from_env()?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = ?config.environment,
        "Starting Charity Server"
    );

    // Initialize database
    let db_pool = db::create_pool(&config.database_url).await?;
    db::run_migrations(&db_pool).await?;

    // Initialize email (optional - notifications are skipped if not configured)
    let email = if config.has_smtp() {
        match EmailService::new(&config) {
            Ok(service) => {
                if let Err(e) = service.test_connection().await {
                    warn!(error = %format!("{e:#}"), "SMTP connection test failed");
                }
                info!("Email service initialized");
                Some(service)
            }
            Err(e) => {
                warn!(error = %format!("{e:#}"), "Email service initialization failed. Email disabled.");
                None
            }
        }
    } else {
        info!("SMTP not configured. Email disabled.");
        None
    };

    // Initialize rate limiter (optional)
    let rate_limiter = ratelimit::rate_limiter_from_env();
    if let Some(limiter) = &rate_limiter {
        limiter.spawn_cleanup(RATE_LIMIT_PURGE_INTERVAL);
    }

    let bind_address = config.bind_address.clone();
    info!(upload_root = %config.upload_root.display(), "Serving uploads");

    // Build application state
    let state = api::AppState::new(api::AppStateConfig {
        db: db_pool,
        config,
        email,
        rate_limiter,
    });

    // Build router
    let app = api::create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    info!(address = %bind_address, "Server listening");

    // Graceful shutdown handler
    let shutdown_signal = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install CTRL+C signal handler");
        info!("Received shutdown signal, cleaning up...");
    };

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal)
    .await?;

    info!("Server shutdown complete");

    Ok(())
}
