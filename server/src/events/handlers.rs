//! API handlers for events.

use axum::extract::{Path, State};
use axum::Json;
use chrono::{DateTime, Utc};
use tracing::info;
use validator::Validate;

use super::queries::{self, EventWrite};
use super::types::{
    is_clock_time, parse_event_date, CreateEventRequest, Event, UpdateEventRequest,
};
use crate::api::{ApiError, ApiResult, AppState, Success};
use crate::auth::AuthAdmin;
use crate::uploads::{IncomingFile, Submission, UploadCategory, UploadFolder};
use crate::util::{normalize_slug, slug_or_title};

/// Number of events returned by the upcoming/completed widgets.
const WIDGET_LIMIT: i64 = 10;

const SLUG_TAKEN: &str = "An event with this slug already exists";

fn invalid_slug() -> ApiError {
    ApiError::Validation("slug: must contain letters or digits".into())
}

fn parse_date(field: &str, raw: &str) -> ApiResult<DateTime<Utc>> {
    parse_event_date(raw).ok_or_else(|| {
        ApiError::Validation(format!("{field}: must be a date (YYYY-MM-DD or RFC 3339)"))
    })
}

fn check_time(field: &str, raw: &str) -> ApiResult<()> {
    if is_clock_time(raw.trim()) {
        Ok(())
    } else {
        Err(ApiError::Validation(format!("{field}: must be HH:MM")))
    }
}

fn check_order(start: DateTime<Utc>, end: DateTime<Utc>) -> ApiResult<()> {
    if end < start {
        return Err(ApiError::Validation(
            "endDate: must not be before startDate".into(),
        ));
    }
    Ok(())
}

/// Stores the attached image, if any.
async fn store_image(state: &AppState, file: Option<IncomingFile>) -> ApiResult<Option<String>> {
    match file {
        Some(file) => Ok(Some(
            state
                .uploads
                .store(&file, UploadFolder::Events, UploadCategory::Image, None)
                .await?,
        )),
        None => Ok(None),
    }
}

// ============================================================================
// Public
// ============================================================================

/// GET /api/events
pub async fn list_public(State(state): State<AppState>) -> ApiResult<Json<Vec<Event>>> {
    Ok(Json(queries::list_upcoming_events(&state.db, None).await?))
}

/// GET /api/events/upcoming
pub async fn upcoming(State(state): State<AppState>) -> ApiResult<Json<Vec<Event>>> {
    Ok(Json(
        queries::list_upcoming_events(&state.db, Some(WIDGET_LIMIT)).await?,
    ))
}

/// GET /api/events/completed
pub async fn completed(State(state): State<AppState>) -> ApiResult<Json<Vec<Event>>> {
    Ok(Json(
        queries::list_completed_events(&state.db, WIDGET_LIMIT).await?,
    ))
}

/// GET /api/events/{slug}
pub async fn get_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<Json<Event>> {
    queries::get_event_by_slug(&state.db, &slug)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("Event"))
}

// ============================================================================
// Admin
// ============================================================================

/// GET /api/admin/events
pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<Event>>> {
    Ok(Json(queries::list_events(&state.db).await?))
}

/// GET /api/admin/events/{id}
pub async fn get(State(state): State<AppState>, Path(id): Path<i32>) -> ApiResult<Json<Event>> {
    queries::get_event_by_id(&state.db, id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("Event"))
}

/// POST /api/admin/events
///
/// Accepts JSON (`imageUrl`) or multipart with an `image` file.
#[tracing::instrument(skip(state, submission), fields(admin_id = admin.id))]
pub async fn create(
    State(state): State<AppState>,
    admin: AuthAdmin,
    submission: Submission<CreateEventRequest>,
) -> ApiResult<Json<Success>> {
    let (req, file) = submission.into_parts();
    req.validate()?;

    let start_date = parse_date("startDate", &req.start_date)?;
    let end_date = parse_date("endDate", &req.end_date)?;
    check_order(start_date, end_date)?;
    check_time("startTime", &req.start_time)?;
    check_time("endTime", &req.end_time)?;
    let slug = slug_or_title(req.slug.as_deref(), &req.name).ok_or_else(invalid_slug)?;

    let stored = store_image(&state, file).await?;
    let resolved = EventWrite {
        slug: Some(&slug),
        start_date: Some(start_date),
        end_date: Some(end_date),
        image: stored.as_deref().or(req.image_url.as_deref()),
    };

    let id = match queries::create_event(&state.db, &req, &resolved).await {
        Ok(id) => id,
        Err(e) => {
            state.uploads.discard(stored.as_deref()).await;
            return Err(ApiError::on_conflict(SLUG_TAKEN)(e));
        }
    };

    info!(event_id = id, slug = %slug, "Event created");
    Ok(Json(Success::created(id)))
}

/// PUT /api/admin/events/{id}
#[tracing::instrument(skip(state, submission), fields(admin_id = admin.id))]
pub async fn update(
    State(state): State<AppState>,
    admin: AuthAdmin,
    Path(id): Path<i32>,
    submission: Submission<UpdateEventRequest>,
) -> ApiResult<Json<Success>> {
    let (req, file) = submission.into_parts();
    req.validate()?;

    let existing = queries::get_event_by_id(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("Event"))?;

    let start_date = req
        .start_date
        .as_deref()
        .map(|raw| parse_date("startDate", raw))
        .transpose()?;
    let end_date = req
        .end_date
        .as_deref()
        .map(|raw| parse_date("endDate", raw))
        .transpose()?;
    check_order(
        start_date.unwrap_or(existing.start_date),
        end_date.unwrap_or(existing.end_date),
    )?;
    if let Some(raw) = &req.start_time {
        check_time("startTime", raw)?;
    }
    if let Some(raw) = &req.end_time {
        check_time("endTime", raw)?;
    }
    let slug = req
        .slug
        .as_deref()
        .map(|raw| normalize_slug(raw).ok_or_else(invalid_slug))
        .transpose()?;

    let stored = store_image(&state, file).await?;
    let image = stored.as_deref().or(req.image_url.as_deref());
    let resolved = EventWrite {
        slug: slug.as_deref(),
        start_date,
        end_date,
        image,
    };

    let updated = match queries::update_event(&state.db, id, &req, &resolved).await {
        Ok(updated) => updated,
        Err(e) => {
            state.uploads.discard(stored.as_deref()).await;
            return Err(ApiError::on_conflict(SLUG_TAKEN)(e));
        }
    };
    if !updated {
        state.uploads.discard(stored.as_deref()).await;
        return Err(ApiError::NotFound("Event"));
    }

    state
        .uploads
        .discard_replaced(existing.image.as_deref(), image)
        .await;

    info!(event_id = id, "Event updated");
    Ok(Json(Success::ok()))
}

/// DELETE /api/admin/events/{id}
#[tracing::instrument(skip(state), fields(admin_id = admin.id))]
pub async fn delete(
    State(state): State<AppState>,
    admin: AuthAdmin,
    Path(id): Path<i32>,
) -> ApiResult<Json<Success>> {
    let removed = queries::delete_event(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("Event"))?;

    state.uploads.discard(removed.image.as_deref()).await;

    info!(event_id = id, "Event deleted");
    Ok(Json(Success::ok()))
}
