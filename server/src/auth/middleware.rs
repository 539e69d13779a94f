//! Authentication Middleware

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::api::AppState;
use crate::db::AdminRole;

use super::error::{AuthError, AuthResult};
use super::jwt::{validate_token, Claims};

/// Authenticated admin injected into request extensions.
///
/// Built from token claims alone; role changes take effect when the
/// admin next logs in.
#[derive(Debug, Clone)]
pub struct AuthAdmin {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub role: AdminRole,
}

impl AuthAdmin {
    #[must_use]
    pub fn is_super_admin(&self) -> bool {
        self.role == AdminRole::SuperAdmin
    }
}

impl From<Claims> for AuthAdmin {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            username: claims.username,
            email: claims.email,
            role: claims.role,
        }
    }
}

/// Validate the Bearer token in `headers`.
pub fn bearer_claims(headers: &HeaderMap, secret: &str) -> AuthResult<Claims> {
    let auth_header = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(AuthError::MissingAuthHeader)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(AuthError::InvalidAuthHeader)?;

    validate_token(token, secret)
}

/// Middleware to require an admin token.
///
/// # Usage
///
/// ```ignore
/// Router::new()
///     .route("/protected", get(handler))
///     .layer(axum::middleware::from_fn_with_state(state, require_auth))
/// ```
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let claims = bearer_claims(request.headers(), &state.config.jwt_secret)?;

    request.extensions_mut().insert(AuthAdmin::from(claims));

    Ok(next.run(request).await)
}

/// Extractor for the authenticated admin in handlers behind [`require_auth`].
impl<S> FromRequestParts<S> for AuthAdmin
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Self>()
            .cloned()
            .ok_or(AuthError::MissingAuthHeader)
    }
}
