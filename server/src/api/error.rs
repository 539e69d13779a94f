//! API Error Types
//!
//! Shared error type for content and submission handlers.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::error;

use crate::auth::ErrorResponse;
use crate::db::is_unique_violation;
use crate::uploads::{FormError, UploadError};

/// Errors returned by API handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Entity does not exist, e.g. "Program not found".
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Request failed validation.
    #[error("{0}")]
    Validation(String),

    /// Unique constraint clash.
    #[error("{0}")]
    Conflict(String),

    /// Caller lacks the required role.
    #[error("{0}")]
    Forbidden(String),

    /// Upload pipeline rejected the file.
    #[error(transparent)]
    Upload(#[from] UploadError),

    /// Malformed request body.
    #[error(transparent)]
    Form(#[from] FormError),

    /// Outgoing email could not be delivered.
    #[error("Failed to send email")]
    Email(anyhow::Error),

    /// Email delivery is not configured.
    #[error("Email delivery is not configured")]
    EmailDisabled,

    /// Database error.
    #[error("Database error")]
    Database(#[source] sqlx::Error),

    /// Internal server error.
    #[error("Internal server error")]
    Internal(String),
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        if is_unique_violation(&e) {
            Self::Conflict("A record with the same unique value already exists".into())
        } else {
            Self::Database(e)
        }
    }
}

impl ApiError {
    /// Maps a unique violation to [`ApiError::Conflict`] with `message`.
    ///
    /// ```ignore
    /// queries::create(&state.db, &req).await.map_err(ApiError::on_conflict("Slug already exists"))?;
    /// ```
    pub fn on_conflict(message: &'static str) -> impl FnOnce(sqlx::Error) -> Self {
        move |e| {
            if is_unique_violation(&e) {
                Self::Conflict(message.to_string())
            } else {
                Self::Database(e)
            }
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(e: validator::ValidationErrors) -> Self {
        Self::Validation(format_validation_errors(&e))
    }
}

/// Flattens validator output into "field: message" pairs.
fn format_validation_errors(errors: &validator::ValidationErrors) -> String {
    let mut parts: Vec<String> = errors
        .field_errors()
        .iter()
        .map(|(field, errs)| {
            let reason = errs
                .first()
                .and_then(|e| e.message.as_ref().map(ToString::to_string))
                .unwrap_or_else(|| "is invalid".to_string());
            format!("{field}: {reason}")
        })
        .collect();
    parts.sort();
    parts.join("; ")
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let this = match self {
            Self::Upload(e) => return e.into_response(),
            other => other,
        };

        let (status, code) = match &this {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            Self::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            Self::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            Self::Upload(e) => e.status_and_code(),
            Self::Form(FormError::UnsupportedContentType) => {
                (StatusCode::UNSUPPORTED_MEDIA_TYPE, "UNSUPPORTED_MEDIA_TYPE")
            }
            Self::Form(_) => (StatusCode::BAD_REQUEST, "INVALID_BODY"),
            Self::Email(_) => (StatusCode::INTERNAL_SERVER_ERROR, "EMAIL_FAILED"),
            Self::EmailDisabled => (StatusCode::SERVICE_UNAVAILABLE, "EMAIL_DISABLED"),
            Self::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        match &this {
            Self::Database(e) => error!(error = %e, "Database error"),
            Self::Email(e) => error!(error = %e, "Email delivery failed"),
            Self::Internal(msg) => error!(error = %msg, "Internal error"),
            _ => {}
        }

        let body = Json(ErrorResponse {
            error: code.to_string(),
            message: this.to_string(),
        });

        (status, body).into_response()
    }
}

/// Result type for API handlers.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        assert_eq!(
            ApiError::NotFound("Program").to_string(),
            "Program not found"
        );
    }

    #[test]
    fn test_status_codes() {
        let cases = [
            (ApiError::NotFound("Event"), StatusCode::NOT_FOUND),
            (ApiError::Validation("bad".into()), StatusCode::BAD_REQUEST),
            (ApiError::Conflict("dup".into()), StatusCode::CONFLICT),
            (
                ApiError::Upload(UploadError::ContentMismatch),
                StatusCode::BAD_REQUEST,
            ),
            (
                ApiError::Upload(UploadError::AlreadyExists),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                ApiError::Form(FormError::UnsupportedContentType),
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ),
            (
                ApiError::Email(anyhow::anyhow!("smtp down")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.into_response().status(), expected);
        }
    }

    #[test]
    fn test_upload_message_is_preserved() {
        let err = ApiError::from(UploadError::TooLarge { limit_mb: 5 });
        assert_eq!(err.to_string(), "File size exceeds 5MB limit");
    }
}
