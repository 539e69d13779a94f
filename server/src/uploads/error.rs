//! Upload Error Types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

/// Message returned when stored bytes disagree with the declared type.
pub const CONTENT_MISMATCH_MESSAGE: &str =
    "File content does not match declared type. Possible file type mismatch or malicious file.";

/// Errors raised by the upload pipeline.
#[derive(Debug, Error)]
pub enum UploadError {
    /// Nothing was attached, or the part had no filename.
    #[error("No file provided")]
    NoFile,

    /// Extension not in the category whitelist.
    #[error("Invalid file extension. Allowed: {allowed}")]
    InvalidExtension {
        /// Comma-separated whitelist.
        allowed: String,
    },

    /// MIME type not in the category whitelist.
    #[error("Invalid file type. Allowed: {allowed}")]
    InvalidMimeType {
        /// Comma-separated whitelist.
        allowed: String,
    },

    /// File exceeds the category size limit.
    #[error("File size exceeds {limit_mb}MB limit")]
    TooLarge {
        /// Limit in whole megabytes.
        limit_mb: u64,
    },

    /// Zero-byte file.
    #[error("File is empty")]
    Empty,

    /// Leading bytes do not match the declared MIME type.
    #[error(
        "File content does not match declared type. Possible file type mismatch or malicious file."
    )]
    ContentMismatch,

    /// A file with the generated name is already present.
    #[error("File already exists. Please try again.")]
    AlreadyExists,

    /// Target path resolves outside the upload root.
    #[error("Invalid file path: Path traversal detected")]
    PathTraversal,

    /// Target is a directory, not a stored file.
    #[error("Invalid file path: not a file")]
    NotAFile,

    /// Malformed request body.
    #[error("Invalid upload request: {0}")]
    Malformed(String),

    /// Filesystem failure.
    #[error("Storage error")]
    Io(#[from] std::io::Error),
}

impl UploadError {
    /// Returns the HTTP status and machine-readable code.
    #[must_use]
    pub const fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::NoFile => (StatusCode::BAD_REQUEST, "NO_FILE"),
            Self::InvalidExtension { .. } => (StatusCode::BAD_REQUEST, "INVALID_EXTENSION"),
            Self::InvalidMimeType { .. } => (StatusCode::BAD_REQUEST, "INVALID_MIME_TYPE"),
            Self::TooLarge { .. } => (StatusCode::BAD_REQUEST, "FILE_TOO_LARGE"),
            Self::Empty => (StatusCode::BAD_REQUEST, "EMPTY_FILE"),
            Self::ContentMismatch => (StatusCode::BAD_REQUEST, "CONTENT_MISMATCH"),
            Self::AlreadyExists => (StatusCode::INTERNAL_SERVER_ERROR, "FILE_EXISTS"),
            Self::PathTraversal => (StatusCode::BAD_REQUEST, "PATH_TRAVERSAL"),
            Self::NotAFile => (StatusCode::BAD_REQUEST, "NOT_A_FILE"),
            Self::Malformed(_) => (StatusCode::BAD_REQUEST, "INVALID_UPLOAD"),
            Self::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR"),
        }
    }

    /// True for errors caused by the uploaded file rather than the server.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        self.status_and_code().0.is_client_error()
    }
}

impl IntoResponse for UploadError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match &self {
            Self::Io(e) => {
                tracing::error!(error = %e, "Upload storage failure");
                "Storage operation failed".to_string()
            }
            _ => self.to_string(),
        };

        let body = Json(serde_json::json!({
            "error": code,
            "message": message,
        }));

        (status, body).into_response()
    }
}

pub type UploadResult<T> = Result<T, UploadError>;
