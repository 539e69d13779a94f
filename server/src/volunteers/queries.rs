//! Database queries for volunteer applications.

use sqlx::PgPool;

use super::types::{CreateVolunteerRequest, Volunteer, VolunteerStatus};

pub async fn create_volunteer(
    pool: &PgPool,
    req: &CreateVolunteerRequest,
    photo: Option<&str>,
) -> sqlx::Result<i32> {
    sqlx::query_scalar::<_, i32>(
        r"INSERT INTO volunteers (name, email, phone, address, skills, motivation, availability, photo)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING id",
    )
    .bind(&req.name)
    .bind(&req.email)
    .bind(&req.phone)
    .bind(&req.address)
    .bind(&req.skills)
    .bind(&req.motivation)
    .bind(&req.availability)
    .bind(photo)
    .fetch_one(pool)
    .await
}

pub async fn list_volunteers(pool: &PgPool) -> sqlx::Result<Vec<Volunteer>> {
    sqlx::query_as::<_, Volunteer>("SELECT * FROM volunteers ORDER BY created_at DESC")
        .fetch_all(pool)
        .await
}

pub async fn get_volunteer(pool: &PgPool, id: i32) -> sqlx::Result<Option<Volunteer>> {
    sqlx::query_as::<_, Volunteer>("SELECT * FROM volunteers WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Updates the status and returns the updated row.
pub async fn set_volunteer_status(
    pool: &PgPool,
    id: i32,
    status: VolunteerStatus,
) -> sqlx::Result<Option<Volunteer>> {
    sqlx::query_as::<_, Volunteer>("UPDATE volunteers SET status = $2 WHERE id = $1 RETURNING *")
        .bind(id)
        .bind(status)
        .fetch_optional(pool)
        .await
}

pub async fn delete_volunteer(pool: &PgPool, id: i32) -> sqlx::Result<Option<Volunteer>> {
    sqlx::query_as::<_, Volunteer>("DELETE FROM volunteers WHERE id = $1 RETURNING *")
        .bind(id)
        .fetch_optional(pool)
        .await
}
