//! Database queries for team members.

use sqlx::PgPool;

use super::types::{CreateTeamMemberRequest, TeamMember, UpdateTeamMemberRequest};

pub async fn list_active_members(pool: &PgPool) -> sqlx::Result<Vec<TeamMember>> {
    sqlx::query_as::<_, TeamMember>(
        "SELECT * FROM team_members WHERE is_active ORDER BY display_order, id",
    )
    .fetch_all(pool)
    .await
}

pub async fn list_members(pool: &PgPool) -> sqlx::Result<Vec<TeamMember>> {
    sqlx::query_as::<_, TeamMember>("SELECT * FROM team_members ORDER BY display_order, id")
        .fetch_all(pool)
        .await
}

pub async fn get_member(pool: &PgPool, id: i32) -> sqlx::Result<Option<TeamMember>> {
    sqlx::query_as::<_, TeamMember>("SELECT * FROM team_members WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn create_member(pool: &PgPool, req: &CreateTeamMemberRequest) -> sqlx::Result<i32> {
    sqlx::query_scalar::<_, i32>(
        r"INSERT INTO team_members (name, role, bio, photo, team_type, display_order, is_active)
        VALUES ($1, $2, $3, $4, COALESCE($5, 'coordinators'), COALESCE($6, 0), COALESCE($7, TRUE))
        RETURNING id",
    )
    .bind(&req.name)
    .bind(&req.role)
    .bind(&req.bio)
    .bind(&req.photo)
    .bind(req.team_type)
    .bind(req.display_order)
    .bind(req.is_active)
    .fetch_one(pool)
    .await
}

/// Returns `false` if no row matched.
pub async fn update_member(
    pool: &PgPool,
    id: i32,
    req: &UpdateTeamMemberRequest,
) -> sqlx::Result<bool> {
    let result = sqlx::query(
        r"UPDATE team_members SET
            name = COALESCE($2, name),
            role = COALESCE($3, role),
            bio = COALESCE($4, bio),
            photo = COALESCE($5, photo),
            team_type = COALESCE($6, team_type),
            display_order = COALESCE($7, display_order),
            is_active = COALESCE($8, is_active)
        WHERE id = $1",
    )
    .bind(id)
    .bind(&req.name)
    .bind(&req.role)
    .bind(&req.bio)
    .bind(&req.photo)
    .bind(req.team_type)
    .bind(req.display_order)
    .bind(req.is_active)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn delete_member(pool: &PgPool, id: i32) -> sqlx::Result<Option<TeamMember>> {
    sqlx::query_as::<_, TeamMember>("DELETE FROM team_members WHERE id = $1 RETURNING *")
        .bind(id)
        .fetch_optional(pool)
        .await
}
