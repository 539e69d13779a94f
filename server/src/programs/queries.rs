//! Database queries for programs.

use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};

use super::types::{CreateProgramRequest, Program, UpdateProgramRequest};

/// Active programs, newest first.
pub async fn list_active_programs(pool: &PgPool) -> sqlx::Result<Vec<Program>> {
    sqlx::query_as::<_, Program>(
        "SELECT * FROM programs WHERE status = 'active' ORDER BY created_at DESC",
    )
    .fetch_all(pool)
    .await
}

/// All programs, newest first.
pub async fn list_programs(pool: &PgPool) -> sqlx::Result<Vec<Program>> {
    sqlx::query_as::<_, Program>("SELECT * FROM programs ORDER BY created_at DESC")
        .fetch_all(pool)
        .await
}

pub async fn get_program_by_slug(pool: &PgPool, slug: &str) -> sqlx::Result<Option<Program>> {
    sqlx::query_as::<_, Program>("SELECT * FROM programs WHERE slug = $1")
        .bind(slug)
        .fetch_optional(pool)
        .await
}

pub async fn get_program_by_id(pool: &PgPool, id: i32) -> sqlx::Result<Option<Program>> {
    sqlx::query_as::<_, Program>("SELECT * FROM programs WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Title of a program, for donation receipts.
pub async fn get_program_title(pool: &PgPool, id: i32) -> sqlx::Result<Option<String>> {
    sqlx::query_scalar::<_, String>("SELECT title FROM programs WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Insert a program under `slug`. Returns the new id.
pub async fn create_program(
    pool: &PgPool,
    slug: &str,
    req: &CreateProgramRequest,
) -> sqlx::Result<i32> {
    sqlx::query_scalar::<_, i32>(
        r"INSERT INTO programs (
            slug, title, description, full_description, category, category_color, icon,
            image, hero_image, target_amount, current_amount, location, locations,
            target_audience, schedule_frequency, schedule_duration, objectives, activities,
            testimonials, impact, status
        ) VALUES (
            $1, $2, $3, $4, $5, COALESCE($6, 'blue'), COALESCE($7, 'menu_book'),
            $8, $9, $10, COALESCE($11, 0), $12, $13,
            $14, $15, $16, $17, $18,
            $19, $20, COALESCE($21, 'active'::program_status)
        ) RETURNING id",
    )
    .bind(slug)
    .bind(&req.title)
    .bind(&req.description)
    .bind(&req.full_description)
    .bind(&req.category)
    .bind(&req.category_color)
    .bind(&req.icon)
    .bind(&req.image)
    .bind(&req.hero_image)
    .bind(req.target_amount)
    .bind(req.current_amount)
    .bind(&req.location)
    .bind(&req.locations)
    .bind(&req.target_audience)
    .bind(&req.schedule_frequency)
    .bind(&req.schedule_duration)
    .bind(&req.objectives)
    .bind(&req.activities)
    .bind(&req.testimonials)
    .bind(&req.impact)
    .bind(req.status)
    .fetch_one(pool)
    .await
}

/// Apply the fields present in `req`. Returns `false` if no row matched.
pub async fn update_program(
    pool: &PgPool,
    id: i32,
    slug: Option<&str>,
    req: &UpdateProgramRequest,
) -> sqlx::Result<bool> {
    let result = sqlx::query(
        r"UPDATE programs SET
            slug = COALESCE($2, slug),
            title = COALESCE($3, title),
            description = COALESCE($4, description),
            full_description = COALESCE($5, full_description),
            category = COALESCE($6, category),
            category_color = COALESCE($7, category_color),
            icon = COALESCE($8, icon),
            image = COALESCE($9, image),
            hero_image = COALESCE($10, hero_image),
            target_amount = COALESCE($11, target_amount),
            current_amount = COALESCE($12, current_amount),
            location = COALESCE($13, location),
            locations = COALESCE($14, locations),
            target_audience = COALESCE($15, target_audience),
            schedule_frequency = COALESCE($16, schedule_frequency),
            schedule_duration = COALESCE($17, schedule_duration),
            objectives = COALESCE($18, objectives),
            activities = COALESCE($19, activities),
            testimonials = COALESCE($20, testimonials),
            impact = COALESCE($21, impact),
            status = COALESCE($22, status),
            updated_at = NOW()
        WHERE id = $1",
    )
    .bind(id)
    .bind(slug)
    .bind(&req.title)
    .bind(&req.description)
    .bind(&req.full_description)
    .bind(&req.category)
    .bind(&req.category_color)
    .bind(&req.icon)
    .bind(&req.image)
    .bind(&req.hero_image)
    .bind(req.target_amount)
    .bind(req.current_amount)
    .bind(&req.location)
    .bind(&req.locations)
    .bind(&req.target_audience)
    .bind(&req.schedule_frequency)
    .bind(&req.schedule_duration)
    .bind(&req.objectives)
    .bind(&req.activities)
    .bind(&req.testimonials)
    .bind(&req.impact)
    .bind(req.status)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Delete a program, returning the removed row.
pub async fn delete_program(pool: &PgPool, id: i32) -> sqlx::Result<Option<Program>> {
    sqlx::query_as::<_, Program>("DELETE FROM programs WHERE id = $1 RETURNING *")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Add `delta` (possibly negative) to a program's raised amount, never
/// going below zero.
pub async fn adjust_current_amount(
    tx: &mut Transaction<'_, Postgres>,
    id: i32,
    delta: Decimal,
) -> sqlx::Result<()> {
    sqlx::query(
        "UPDATE programs SET current_amount = GREATEST(current_amount + $2, 0), \
         updated_at = NOW() WHERE id = $1",
    )
    .bind(id)
    .bind(delta)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

