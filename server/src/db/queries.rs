//! Admin account queries.

use sqlx::PgPool;

use super::models::{Admin, NewAdmin};

const ADMIN_COLUMNS: &str = "id, username, email, password_hash, full_name, role, is_active, \
                             last_login, created_at, updated_at";

/// Find admin by ID.
pub async fn find_admin_by_id(pool: &PgPool, id: i32) -> sqlx::Result<Option<Admin>> {
    sqlx::query_as::<_, Admin>(&format!("SELECT {ADMIN_COLUMNS} FROM admins WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Find admin by username.
pub async fn find_admin_by_username(
    pool: &PgPool,
    username: &str,
) -> sqlx::Result<Option<Admin>> {
    sqlx::query_as::<_, Admin>(&format!(
        "SELECT {ADMIN_COLUMNS} FROM admins WHERE username = $1"
    ))
    .bind(username)
    .fetch_optional(pool)
    .await
}

/// Check if username exists.
pub async fn admin_username_exists(pool: &PgPool, username: &str) -> sqlx::Result<bool> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM admins WHERE username = $1)")
        .bind(username)
        .fetch_one(pool)
        .await
}

/// Check if email exists.
pub async fn admin_email_exists(pool: &PgPool, email: &str) -> sqlx::Result<bool> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM admins WHERE email = $1)")
        .bind(email)
        .fetch_one(pool)
        .await
}

/// Count all admin accounts.
pub async fn count_admins(pool: &PgPool) -> sqlx::Result<i64> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM admins")
        .fetch_one(pool)
        .await
}

/// Create a new admin.
pub async fn create_admin(pool: &PgPool, new: &NewAdmin<'_>) -> sqlx::Result<Admin> {
    sqlx::query_as::<_, Admin>(&format!(
        "INSERT INTO admins (username, email, password_hash, full_name, role) \
         VALUES ($1, $2, $3, $4, $5) \
         RETURNING {ADMIN_COLUMNS}"
    ))
    .bind(new.username)
    .bind(new.email)
    .bind(new.password_hash)
    .bind(new.full_name)
    .bind(new.role)
    .fetch_one(pool)
    .await
}

/// Record a successful login.
pub async fn touch_admin_last_login(pool: &PgPool, id: i32) -> sqlx::Result<()> {
    sqlx::query("UPDATE admins SET last_login = NOW() WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}
