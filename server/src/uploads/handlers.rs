//! Admin endpoints for managing uploaded images directly.

use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::error::UploadError;
use super::form::read_multipart;
use super::policy::{policy_summary, PolicySummary, UploadCategory, UploadFolder};
use crate::api::{ApiError, ApiResult, AppState, Success};
use crate::auth::AuthAdmin;

/// Multipart part carrying the image.
const IMAGE_FIELD: &str = "image";

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub filename: String,
    pub url: String,
    pub message: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct DeleteImageRequest {
    pub path: String,
}

/// POST /api/admin/upload
///
/// Multipart with an `image` part and an optional `folder` field
/// (default `general`).
#[tracing::instrument(skip(state, multipart), fields(admin_id = admin.id))]
pub async fn upload_image(
    State(state): State<AppState>,
    admin: AuthAdmin,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<UploadResponse>> {
    let multipart = multipart.map_err(|e| UploadError::Malformed(e.body_text()))?;
    let (fields, file) = read_multipart(multipart, IMAGE_FIELD).await?;

    let folder = match fields.text("folder") {
        Some(name) => name
            .parse::<UploadFolder>()
            .map_err(|e| UploadError::Malformed(e.to_string()))?,
        None => UploadFolder::General,
    };
    let file = file.ok_or(UploadError::NoFile)?;

    let url = state
        .uploads
        .store(&file, folder, UploadCategory::Image, None)
        .await?;
    let filename = url.rsplit('/').next().unwrap_or_default().to_string();

    info!(url = %url, "Image uploaded");
    Ok(Json(UploadResponse {
        success: true,
        filename,
        url,
        message: "Image uploaded successfully",
    }))
}

/// DELETE /api/admin/upload/image
#[tracing::instrument(skip(state, req), fields(admin_id = admin.id, path = %req.path))]
pub async fn delete_image(
    State(state): State<AppState>,
    admin: AuthAdmin,
    Json(req): Json<DeleteImageRequest>,
) -> ApiResult<Json<Success>> {
    if req.path.trim().is_empty() {
        return Err(ApiError::Validation("path: No image path provided".into()));
    }

    state.uploads.delete(req.path.trim()).await?;

    Ok(Json(Success::ok().with_message("Image deleted successfully")))
}

/// GET /api/admin/upload/policy
pub async fn policy() -> Json<PolicySummary> {
    Json(policy_summary())
}
