//! Secure File Uploads
//!
//! Pipeline for user-supplied files: sanitize the client filename, check
//! the category policy, verify magic bytes, then write under a generated
//! name that cannot collide with or overwrite an existing file.

pub mod content;
pub mod error;
pub mod form;
pub mod handlers;
pub mod policy;
pub mod sanitize;
pub mod store;
pub mod validate;

pub use content::{detect_mime, verify_content};
pub use error::{UploadError, UploadResult};
pub use form::{read_multipart, FormError, FormFields, IncomingFile, MultipartForm, Submission};
pub use policy::{policy_summary, UploadCategory, UploadFolder, UploadPolicy};
pub use sanitize::{generate_secure_filename, sanitize_filename};
pub use store::UploadStore;
pub use validate::{validate_upload, FileMeta, ValidatedUpload};

use axum::routing::{delete, get, post};
use axum::Router;

use crate::api::AppState;

/// Admin upload routes (mounted at /api/admin/upload).
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/", post(handlers::upload_image))
        .route("/image", delete(handlers::delete_image))
        .route("/policy", get(handlers::policy))
}
