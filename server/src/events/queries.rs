//! Database queries for events.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::types::{CreateEventRequest, Event, UpdateEventRequest};

/// Upcoming events, soonest first. `limit = None` returns all of them.
pub async fn list_upcoming_events(pool: &PgPool, limit: Option<i64>) -> sqlx::Result<Vec<Event>> {
    sqlx::query_as::<_, Event>(
        "SELECT * FROM events WHERE status = 'upcoming' ORDER BY start_date LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await
}

/// Completed events, most recently finished first.
pub async fn list_completed_events(pool: &PgPool, limit: i64) -> sqlx::Result<Vec<Event>> {
    sqlx::query_as::<_, Event>(
        "SELECT * FROM events WHERE status = 'completed' ORDER BY end_date DESC LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await
}

pub async fn list_events(pool: &PgPool) -> sqlx::Result<Vec<Event>> {
    sqlx::query_as::<_, Event>("SELECT * FROM events ORDER BY start_date DESC")
        .fetch_all(pool)
        .await
}

pub async fn get_event_by_slug(pool: &PgPool, slug: &str) -> sqlx::Result<Option<Event>> {
    sqlx::query_as::<_, Event>("SELECT * FROM events WHERE slug = $1")
        .bind(slug)
        .fetch_optional(pool)
        .await
}

pub async fn get_event_by_id(pool: &PgPool, id: i32) -> sqlx::Result<Option<Event>> {
    sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Columns resolved by the handler rather than copied from the request.
pub struct EventWrite<'a> {
    pub slug: Option<&'a str>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub image: Option<&'a str>,
}

pub async fn create_event(
    pool: &PgPool,
    req: &CreateEventRequest,
    resolved: &EventWrite<'_>,
) -> sqlx::Result<i32> {
    sqlx::query_scalar::<_, i32>(
        r"INSERT INTO events (
            slug, name, description, venue, event_type, objectives, target_audience,
            start_date, end_date, start_time, end_time, image, status
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, COALESCE($13, 'upcoming'))
        RETURNING id",
    )
    .bind(resolved.slug)
    .bind(&req.name)
    .bind(&req.description)
    .bind(&req.venue)
    .bind(req.event_type)
    .bind(&req.objectives)
    .bind(&req.target_audience)
    .bind(resolved.start_date)
    .bind(resolved.end_date)
    .bind(req.start_time.trim())
    .bind(req.end_time.trim())
    .bind(resolved.image)
    .bind(req.status)
    .fetch_one(pool)
    .await
}

/// Returns `false` if no row matched.
pub async fn update_event(
    pool: &PgPool,
    id: i32,
    req: &UpdateEventRequest,
    resolved: &EventWrite<'_>,
) -> sqlx::Result<bool> {
    let result = sqlx::query(
        r"UPDATE events SET
            slug = COALESCE($2, slug),
            name = COALESCE($3, name),
            description = COALESCE($4, description),
            venue = COALESCE($5, venue),
            event_type = COALESCE($6, event_type),
            objectives = COALESCE($7, objectives),
            target_audience = COALESCE($8, target_audience),
            start_date = COALESCE($9, start_date),
            end_date = COALESCE($10, end_date),
            start_time = COALESCE($11, start_time),
            end_time = COALESCE($12, end_time),
            image = COALESCE($13, image),
            status = COALESCE($14, status),
            updated_at = NOW()
        WHERE id = $1",
    )
    .bind(id)
    .bind(resolved.slug)
    .bind(&req.name)
    .bind(&req.description)
    .bind(&req.venue)
    .bind(req.event_type)
    .bind(&req.objectives)
    .bind(&req.target_audience)
    .bind(resolved.start_date)
    .bind(resolved.end_date)
    .bind(req.start_time.as_deref().map(str::trim))
    .bind(req.end_time.as_deref().map(str::trim))
    .bind(resolved.image)
    .bind(req.status)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn delete_event(pool: &PgPool, id: i32) -> sqlx::Result<Option<Event>> {
    sqlx::query_as::<_, Event>("DELETE FROM events WHERE id = $1 RETURNING *")
        .bind(id)
        .fetch_optional(pool)
        .await
}
