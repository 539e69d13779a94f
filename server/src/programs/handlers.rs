//! API handlers for programs.

use axum::extract::{Path, State};
use axum::Json;
use tracing::info;
use validator::Validate;

use super::queries;
use super::types::{CreateProgramRequest, Program, UpdateProgramRequest};
use crate::api::{ApiError, ApiResult, AppState, Success};
use crate::auth::AuthAdmin;
use crate::util::{normalize_slug, slug_or_title};

const SLUG_TAKEN: &str = "A program with this slug already exists";

fn invalid_slug() -> ApiError {
    ApiError::Validation("slug: must contain letters or digits".into())
}

// ============================================================================
// Public
// ============================================================================

/// GET /api/programs
pub async fn list_active(State(state): State<AppState>) -> ApiResult<Json<Vec<Program>>> {
    Ok(Json(queries::list_active_programs(&state.db).await?))
}

/// GET /api/programs/{slug}
pub async fn get_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<Json<Program>> {
    queries::get_program_by_slug(&state.db, &slug)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("Program"))
}

// ============================================================================
// Admin
// ============================================================================

/// GET /api/admin/programs
pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<Program>>> {
    Ok(Json(queries::list_programs(&state.db).await?))
}

/// GET /api/admin/programs/{id}
pub async fn get(State(state): State<AppState>, Path(id): Path<i32>) -> ApiResult<Json<Program>> {
    queries::get_program_by_id(&state.db, id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("Program"))
}

/// POST /api/admin/programs
#[tracing::instrument(skip(state, req), fields(admin_id = admin.id))]
pub async fn create(
    State(state): State<AppState>,
    admin: AuthAdmin,
    Json(req): Json<CreateProgramRequest>,
) -> ApiResult<Json<Success>> {
    req.validate()?;
    let slug = slug_or_title(req.slug.as_deref(), &req.title).ok_or_else(invalid_slug)?;

    let id = queries::create_program(&state.db, &slug, &req)
        .await
        .map_err(ApiError::on_conflict(SLUG_TAKEN))?;

    info!(program_id = id, slug = %slug, "Program created");
    Ok(Json(Success::created(id)))
}

/// PUT /api/admin/programs/{id}
#[tracing::instrument(skip(state, req))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(req): Json<UpdateProgramRequest>,
) -> ApiResult<Json<Success>> {
    req.validate()?;
    let slug = req
        .slug
        .as_deref()
        .map(|raw| normalize_slug(raw).ok_or_else(invalid_slug))
        .transpose()?;

    let existing = queries::get_program_by_id(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("Program"))?;

    let updated = queries::update_program(&state.db, id, slug.as_deref(), &req)
        .await
        .map_err(ApiError::on_conflict(SLUG_TAKEN))?;
    if !updated {
        return Err(ApiError::NotFound("Program"));
    }

    state
        .uploads
        .discard_replaced(existing.image.as_deref(), req.image.as_deref())
        .await;
    state
        .uploads
        .discard_replaced(existing.hero_image.as_deref(), req.hero_image.as_deref())
        .await;

    Ok(Json(Success::ok()))
}

/// DELETE /api/admin/programs/{id}
#[tracing::instrument(skip(state), fields(admin_id = admin.id))]
pub async fn delete(
    State(state): State<AppState>,
    admin: AuthAdmin,
    Path(id): Path<i32>,
) -> ApiResult<Json<Success>> {
    let removed = queries::delete_program(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("Program"))?;

    state.uploads.discard(removed.image.as_deref()).await;
    state.uploads.discard(removed.hero_image.as_deref()).await;

    info!(program_id = id, "Program deleted");
    Ok(Json(Success::ok()))
}
