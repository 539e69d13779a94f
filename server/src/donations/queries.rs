//! Database queries for donations.

use sqlx::{PgPool, Postgres, Transaction};

use super::types::{CreateDonationRequest, Donation, PaymentStatus, RecentDonation};

pub async fn create_donation(
    pool: &PgPool,
    req: &CreateDonationRequest,
    payment_proof: Option<&str>,
) -> sqlx::Result<i32> {
    sqlx::query_scalar::<_, i32>(
        r"INSERT INTO donations (
            program_id, donor_name, donor_email, donor_phone, amount,
            is_anonymous, payment_method, payment_proof, message
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING id",
    )
    .bind(req.program_id)
    .bind(&req.donor_name)
    .bind(&req.donor_email)
    .bind(&req.donor_phone)
    .bind(req.amount)
    .bind(req.is_anonymous)
    .bind(&req.payment_method)
    .bind(payment_proof)
    .bind(&req.message)
    .fetch_one(pool)
    .await
}

/// Latest completed donations with anonymous donor names masked.
pub async fn list_recent_donations(
    pool: &PgPool,
    limit: i64,
) -> sqlx::Result<Vec<RecentDonation>> {
    sqlx::query_as::<_, RecentDonation>(
        r"SELECT d.id,
            CASE WHEN d.is_anonymous THEN NULL ELSE d.donor_name END AS donor_name,
            d.amount, d.program_id, p.title AS program_title, d.message, d.created_at
        FROM donations d
        LEFT JOIN programs p ON p.id = d.program_id
        WHERE d.payment_status = 'completed'
        ORDER BY d.created_at DESC
        LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await
}

pub async fn list_donations(
    pool: &PgPool,
    status: Option<PaymentStatus>,
) -> sqlx::Result<Vec<Donation>> {
    sqlx::query_as::<_, Donation>(
        "SELECT * FROM donations WHERE ($1::payment_status IS NULL OR payment_status = $1) \
         ORDER BY created_at DESC",
    )
    .bind(status)
    .fetch_all(pool)
    .await
}

pub async fn get_donation(pool: &PgPool, id: i32) -> sqlx::Result<Option<Donation>> {
    sqlx::query_as::<_, Donation>("SELECT * FROM donations WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Reads a donation and locks its row until the transaction ends.
pub async fn lock_donation(
    tx: &mut Transaction<'_, Postgres>,
    id: i32,
) -> sqlx::Result<Option<Donation>> {
    sqlx::query_as::<_, Donation>("SELECT * FROM donations WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(&mut **tx)
        .await
}

pub async fn set_payment_status(
    tx: &mut Transaction<'_, Postgres>,
    id: i32,
    status: PaymentStatus,
) -> sqlx::Result<()> {
    sqlx::query("UPDATE donations SET payment_status = $2 WHERE id = $1")
        .bind(id)
        .bind(status)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

pub async fn delete_donation(
    tx: &mut Transaction<'_, Postgres>,
    id: i32,
) -> sqlx::Result<Option<Donation>> {
    sqlx::query_as::<_, Donation>("DELETE FROM donations WHERE id = $1 RETURNING *")
        .bind(id)
        .fetch_optional(&mut **tx)
        .await
}
