//! Database queries for contact messages.

use sqlx::PgPool;

use super::types::{ContactMessage, ContactStatus, CreateContactRequest};

pub async fn create_message(pool: &PgPool, req: &CreateContactRequest) -> sqlx::Result<i32> {
    sqlx::query_scalar::<_, i32>(
        "INSERT INTO contact_messages (name, email, subject, message) \
         VALUES ($1, $2, $3, $4) RETURNING id",
    )
    .bind(&req.name)
    .bind(&req.email)
    .bind(&req.subject)
    .bind(&req.message)
    .fetch_one(pool)
    .await
}

pub async fn list_messages(pool: &PgPool) -> sqlx::Result<Vec<ContactMessage>> {
    sqlx::query_as::<_, ContactMessage>("SELECT * FROM contact_messages ORDER BY created_at DESC")
        .fetch_all(pool)
        .await
}

pub async fn get_message(pool: &PgPool, id: i32) -> sqlx::Result<Option<ContactMessage>> {
    sqlx::query_as::<_, ContactMessage>("SELECT * FROM contact_messages WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Returns `false` if no row matched.
pub async fn set_message_status(
    pool: &PgPool,
    id: i32,
    status: ContactStatus,
) -> sqlx::Result<bool> {
    let result = sqlx::query("UPDATE contact_messages SET status = $2 WHERE id = $1")
        .bind(id)
        .bind(status)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Stores an admin reply and marks the message replied.
pub async fn record_reply(
    pool: &PgPool,
    id: i32,
    reply: &str,
    admin_id: i32,
) -> sqlx::Result<bool> {
    let result = sqlx::query(
        "UPDATE contact_messages SET reply = $2, replied_at = NOW(), replied_by = $3, \
         status = 'replied' WHERE id = $1",
    )
    .bind(id)
    .bind(reply)
    .bind(admin_id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn delete_message(pool: &PgPool, id: i32) -> sqlx::Result<bool> {
    let result = sqlx::query("DELETE FROM contact_messages WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
