//! API handlers for news.

use axum::extract::{Path, Query, State};
use axum::Json;
use tracing::info;
use validator::Validate;

use super::queries;
use super::types::{CreateNewsRequest, NewsArticle, NewsFilter, UpdateNewsRequest};
use crate::api::{ApiError, ApiResult, AppState, Success};
use crate::util::{normalize_slug, slug_or_title};

const SLUG_TAKEN: &str = "An article with this slug already exists";

fn invalid_slug() -> ApiError {
    ApiError::Validation("slug: must contain letters or digits".into())
}

/// GET /api/news?category=
pub async fn list_public(
    State(state): State<AppState>,
    Query(filter): Query<NewsFilter>,
) -> ApiResult<Json<Vec<NewsArticle>>> {
    let category = filter.category.as_deref().filter(|c| !c.is_empty());
    Ok(Json(queries::list_news(&state.db, category).await?))
}

/// GET /api/news/{slug}
pub async fn get_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<Json<NewsArticle>> {
    queries::get_news_by_slug(&state.db, &slug)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("News"))
}

/// GET /api/admin/news
pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<NewsArticle>>> {
    Ok(Json(queries::list_news(&state.db, None).await?))
}

/// GET /api/admin/news/{id}
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<Json<NewsArticle>> {
    queries::get_news_by_id(&state.db, id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("News"))
}

/// POST /api/admin/news
#[tracing::instrument(skip(state, req))]
pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<CreateNewsRequest>,
) -> ApiResult<Json<Success>> {
    req.validate()?;
    let slug = slug_or_title(req.slug.as_deref(), &req.title).ok_or_else(invalid_slug)?;

    let id = queries::create_news(&state.db, &slug, &req)
        .await
        .map_err(ApiError::on_conflict(SLUG_TAKEN))?;

    info!(news_id = id, slug = %slug, "News article created");
    Ok(Json(Success::created(id)))
}

/// PUT /api/admin/news/{id}
#[tracing::instrument(skip(state, req))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(req): Json<UpdateNewsRequest>,
) -> ApiResult<Json<Success>> {
    req.validate()?;
    let slug = req
        .slug
        .as_deref()
        .map(|raw| normalize_slug(raw).ok_or_else(invalid_slug))
        .transpose()?;

    let existing = queries::get_news_by_id(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("News"))?;

    if !queries::update_news(&state.db, id, slug.as_deref(), &req)
        .await
        .map_err(ApiError::on_conflict(SLUG_TAKEN))?
    {
        return Err(ApiError::NotFound("News"));
    }

    state
        .uploads
        .discard_replaced(existing.image.as_deref(), req.image.as_deref())
        .await;

    Ok(Json(Success::ok()))
}

/// DELETE /api/admin/news/{id}
#[tracing::instrument(skip(state))]
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<Json<Success>> {
    let removed = queries::delete_news(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("News"))?;

    state.uploads.discard(removed.image.as_deref()).await;

    info!(news_id = id, "News article deleted");
    Ok(Json(Success::ok()))
}
