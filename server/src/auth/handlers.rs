//! Authentication HTTP Handlers

use axum::extract::State;
use axum::http::HeaderMap;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use validator::Validate;

use super::error::{AuthError, AuthResult};
use super::jwt::generate_token;
use super::middleware::{bearer_claims, AuthAdmin};
use super::password::{hash_password, verify_password};
use crate::api::AppState;
use crate::db::{
    admin_email_exists, admin_username_exists, count_admins, create_admin, find_admin_by_id,
    find_admin_by_username, touch_admin_last_login, Admin, AdminRole, NewAdmin,
};
use crate::ratelimit::NormalizedIp;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Registration request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 100))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    /// Password (8-128 characters).
    #[validate(length(min = 8, max = 128))]
    pub password: String,
    #[validate(length(max = 255))]
    pub full_name: Option<String>,
    /// Role for the new account (default: admin). Ignored during bootstrap.
    pub role: Option<AdminRole>,
}

/// Login request.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Token and profile returned after login or registration.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub admin: Admin,
}

// ============================================================================
// Handlers
// ============================================================================

/// Login with username/password.
///
/// POST /api/auth/login
#[tracing::instrument(skip(state, body, normalized_ip), fields(username = %body.username))]
pub async fn login(
    State(state): State<AppState>,
    normalized_ip: Option<Extension<NormalizedIp>>,
    Json(body): Json<LoginRequest>,
) -> AuthResult<Json<AuthResponse>> {
    macro_rules! record_failed_auth {
        () => {
            if let (Some(rl), Some(Extension(nip))) = (&state.rate_limiter, &normalized_ip) {
                if rl.record_failed_auth(&nip.0) {
                    warn!(ip = %nip.0, username = %body.username, "IP blocked after repeated failed logins");
                }
            }
        };
    }

    let Some(admin) = find_admin_by_username(&state.db, &body.username).await? else {
        record_failed_auth!();
        return Err(AuthError::InvalidCredentials);
    };

    let valid = verify_password(&body.password, &admin.password_hash)
        .map_err(|_| AuthError::PasswordHash)?;
    if !valid {
        record_failed_auth!();
        return Err(AuthError::InvalidCredentials);
    }

    if !admin.is_active {
        return Err(AuthError::AccountDisabled);
    }

    touch_admin_last_login(&state.db, admin.id).await?;

    if let (Some(rl), Some(Extension(nip))) = (&state.rate_limiter, &normalized_ip) {
        rl.clear_failed_auth(&nip.0);
    }

    let token = generate_token(&admin, &state.config.jwt_secret, state.config.jwt_expiry)?;

    info!(admin_id = admin.id, "Admin logged in");

    Ok(Json(AuthResponse { token, admin }))
}

/// Register a new admin.
///
/// POST /api/auth/register
///
/// Open while no admin exists, in which case the account becomes the
/// `super_admin`. Afterwards only a `super_admin` token may register.
#[tracing::instrument(skip(state, headers, body), fields(username = %body.username))]
pub async fn register(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<RegisterRequest>,
) -> AuthResult<Json<AuthResponse>> {
    body.validate()?;

    let role = if count_admins(&state.db).await? == 0 {
        info!("Bootstrapping first administrator");
        AdminRole::SuperAdmin
    } else {
        let caller = AuthAdmin::from(bearer_claims(&headers, &state.config.jwt_secret)?);
        if !caller.is_super_admin() {
            return Err(AuthError::Forbidden(
                "Only a super admin can register administrators".into(),
            ));
        }
        body.role.unwrap_or(AdminRole::Admin)
    };

    if admin_username_exists(&state.db, &body.username).await? {
        return Err(AuthError::AlreadyExists("Username already exists".into()));
    }
    if admin_email_exists(&state.db, &body.email).await? {
        return Err(AuthError::AlreadyExists("Email already exists".into()));
    }

    let password_hash = hash_password(&body.password).map_err(|_| AuthError::PasswordHash)?;

    let admin = create_admin(
        &state.db,
        &NewAdmin {
            username: &body.username,
            email: &body.email,
            password_hash: &password_hash,
            full_name: body.full_name.as_deref(),
            role,
        },
    )
    .await
    .map_err(|e| {
        if crate::db::is_unique_violation(&e) {
            AuthError::AlreadyExists("Username or email already exists".into())
        } else {
            AuthError::Database(e)
        }
    })?;

    let token = generate_token(&admin, &state.config.jwt_secret, state.config.jwt_expiry)?;

    info!(admin_id = admin.id, role = admin.role.as_str(), "Admin registered");

    Ok(Json(AuthResponse { token, admin }))
}

/// Profile of the authenticated admin.
///
/// GET /api/auth/me
pub async fn me(State(state): State<AppState>, auth: AuthAdmin) -> AuthResult<Json<Admin>> {
    let admin = find_admin_by_id(&state.db, auth.id)
        .await?
        .filter(|a| a.is_active)
        .ok_or(AuthError::AdminNotFound)?;

    Ok(Json(admin))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(username: &str, email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.into(),
            email: email.into(),
            password: password.into(),
            full_name: None,
            role: None,
        }
    }

    #[test]
    fn test_register_validation() {
        assert!(request("admin", "admin@example.org", "longenough")
            .validate()
            .is_ok());
        assert!(request("ab", "admin@example.org", "longenough")
            .validate()
            .is_err());
        assert!(request("admin", "not-an-email", "longenough")
            .validate()
            .is_err());
        assert!(request("admin", "admin@example.org", "short")
            .validate()
            .is_err());
    }

    #[test]
    fn test_register_request_accepts_camel_case() {
        let body: RegisterRequest = serde_json::from_value(serde_json::json!({
            "username": "editor",
            "email": "editor@example.org",
            "password": "password123",
            "fullName": "Content Editor",
            "role": "editor"
        }))
        .unwrap();
        assert_eq!(body.full_name.as_deref(), Some("Content Editor"));
        assert_eq!(body.role, Some(AdminRole::Editor));
    }
}
