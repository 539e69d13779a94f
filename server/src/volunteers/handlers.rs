//! API handlers for volunteer applications.

use axum::extract::{Path, State};
use axum::Json;
use tracing::info;
use validator::Validate;

use super::queries;
use super::types::{
    CreateVolunteerRequest, UpdateVolunteerStatusRequest, Volunteer, VolunteerStatus,
};
use crate::api::{ApiError, ApiResult, AppState, Submitted, Success};
use crate::auth::AuthAdmin;
use crate::email::templates;
use crate::uploads::{Submission, UploadCategory, UploadFolder};

/// POST /api/volunteers
///
/// JSON or multipart with an optional `photo`. A rejected photo fails the
/// whole submission so the applicant can fix it and retry.
#[tracing::instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    submission: Submission<CreateVolunteerRequest>,
) -> ApiResult<Json<Submitted>> {
    let (req, file) = submission.into_parts();
    req.validate()?;

    let photo = match file {
        Some(file) => Some(
            state
                .uploads
                .store(&file, UploadFolder::Volunteers, UploadCategory::Image, None)
                .await?,
        ),
        None => None,
    };

    let id = match queries::create_volunteer(&state.db, &req, photo.as_deref()).await {
        Ok(id) => id,
        Err(e) => {
            state.uploads.discard(photo.as_deref()).await;
            return Err(e.into());
        }
    };

    info!(volunteer_id = id, has_photo = photo.is_some(), "Volunteer application received");

    if let Some(email) = &state.email {
        email.send_in_background(
            req.email.clone(),
            templates::volunteer_status(email.org_name(), &req.name, VolunteerStatus::Pending),
        );
    }

    Ok(Json(Submitted {
        id,
        message: "Thank you for registering as a volunteer",
    }))
}

/// GET /api/admin/volunteers
pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<Volunteer>>> {
    Ok(Json(queries::list_volunteers(&state.db).await?))
}

/// GET /api/admin/volunteers/{id}
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<Json<Volunteer>> {
    queries::get_volunteer(&state.db, id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("Volunteer"))
}

/// PUT /api/admin/volunteers/{id}/status
///
/// Notifies the applicant in the background.
#[tracing::instrument(skip(state, req), fields(admin_id = admin.id, status = ?req.status))]
pub async fn update_status(
    State(state): State<AppState>,
    admin: AuthAdmin,
    Path(id): Path<i32>,
    Json(req): Json<UpdateVolunteerStatusRequest>,
) -> ApiResult<Json<Success>> {
    let volunteer = queries::set_volunteer_status(&state.db, id, req.status)
        .await?
        .ok_or(ApiError::NotFound("Volunteer"))?;

    if let Some(email) = &state.email {
        email.send_in_background(
            volunteer.email.clone(),
            templates::volunteer_status(email.org_name(), &volunteer.name, req.status),
        );
    }

    info!(volunteer_id = id, "Volunteer status updated");
    Ok(Json(Success::ok()))
}

/// DELETE /api/admin/volunteers/{id}
#[tracing::instrument(skip(state), fields(admin_id = admin.id))]
pub async fn delete(
    State(state): State<AppState>,
    admin: AuthAdmin,
    Path(id): Path<i32>,
) -> ApiResult<Json<Success>> {
    let removed = queries::delete_volunteer(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("Volunteer"))?;

    state.uploads.discard(removed.photo.as_deref()).await;

    info!(volunteer_id = id, "Volunteer deleted");
    Ok(Json(Success::ok()))
}
