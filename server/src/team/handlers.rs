//! API handlers for the team page.

use axum::extract::{Path, State};
use axum::Json;
use tracing::info;
use validator::Validate;

use super::queries;
use super::types::{CreateTeamMemberRequest, TeamMember, UpdateTeamMemberRequest};
use crate::api::{ApiError, ApiResult, AppState, Success};

const NOT_FOUND: ApiError = ApiError::NotFound("Team member");

/// GET /api/team
pub async fn list_active(State(state): State<AppState>) -> ApiResult<Json<Vec<TeamMember>>> {
    Ok(Json(queries::list_active_members(&state.db).await?))
}

/// GET /api/admin/team
pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<TeamMember>>> {
    Ok(Json(queries::list_members(&state.db).await?))
}

/// GET /api/admin/team/{id}
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<Json<TeamMember>> {
    queries::get_member(&state.db, id)
        .await?
        .map(Json)
        .ok_or(NOT_FOUND)
}

/// POST /api/admin/team
#[tracing::instrument(skip(state, req))]
pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<CreateTeamMemberRequest>,
) -> ApiResult<Json<Success>> {
    req.validate()?;
    let id = queries::create_member(&state.db, &req).await?;
    info!(member_id = id, "Team member created");
    Ok(Json(Success::created(id)))
}

/// PUT /api/admin/team/{id}
#[tracing::instrument(skip(state, req))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(req): Json<UpdateTeamMemberRequest>,
) -> ApiResult<Json<Success>> {
    req.validate()?;

    let existing = queries::get_member(&state.db, id).await?.ok_or(NOT_FOUND)?;
    if !queries::update_member(&state.db, id, &req).await? {
        return Err(NOT_FOUND);
    }

    state
        .uploads
        .discard_replaced(existing.photo.as_deref(), req.photo.as_deref())
        .await;

    Ok(Json(Success::ok()))
}

/// DELETE /api/admin/team/{id}
#[tracing::instrument(skip(state))]
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<Json<Success>> {
    let removed = queries::delete_member(&state.db, id)
        .await?
        .ok_or(NOT_FOUND)?;

    state.uploads.discard(removed.photo.as_deref()).await;

    info!(member_id = id, "Team member deleted");
    Ok(Json(Success::ok()))
}
