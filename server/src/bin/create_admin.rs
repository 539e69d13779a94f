//! Seeds the first super admin account.
//!
//! Reads `ADMIN_USERNAME`, `ADMIN_EMAIL`, `ADMIN_PASSWORD` and optionally
//! `ADMIN_FULLNAME`. Does nothing when an admin already exists.

use anyhow::{bail, Context, Result};
use std::env;
use tracing::info;

use charity_server::auth::password::hash_password;
use charity_server::db::{self, AdminRole, NewAdmin};

/// Minimum password length, matching registration.
const MIN_PASSWORD_LENGTH: usize = 8;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "charity_server=info,create_admin=info".into()),
        )
        .init();

    let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let username = env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".into());
    let email = env::var("ADMIN_EMAIL").unwrap_or_else(|_| "admin@example.org".into());
    let password = env::var("ADMIN_PASSWORD").context("ADMIN_PASSWORD must be set")?;
    let full_name = env::var("ADMIN_FULLNAME").ok();

    if password.len() < MIN_PASSWORD_LENGTH {
        bail!("ADMIN_PASSWORD must be at least {MIN_PASSWORD_LENGTH} characters long");
    }

    let pool = db::create_pool(&database_url).await?;
    db::run_migrations(&pool).await?;

    if db::count_admins(&pool).await? > 0 {
        info!("An admin account already exists; nothing to do");
        return Ok(());
    }

    let password_hash =
        hash_password(&password).map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

    let admin = db::create_admin(
        &pool,
        &NewAdmin {
            username: &username,
            email: &email,
            password_hash: &password_hash,
            full_name: full_name.as_deref(),
            role: AdminRole::SuperAdmin,
        },
    )
    .await
    .context("Failed to create admin")?;

    info!(admin_id = admin.id, username = %admin.username, "Super admin created");
    Ok(())
}
