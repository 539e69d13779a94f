//! API handlers for donations.

use axum::extract::{Path, Query, State};
use axum::Json;
use tracing::{info, warn};
use validator::Validate;

use super::queries;
use super::types::{
    program_total_delta, CreateDonationRequest, Donation, DonationFilter, RecentDonation,
    RecentQuery, UpdatePaymentStatusRequest,
};
use crate::api::{ApiError, ApiResult, AppState, Submitted, Success};
use crate::auth::AuthAdmin;
use crate::email::templates;
use crate::programs::queries::{adjust_current_amount, get_program_title};
use crate::uploads::{Submission, UploadCategory, UploadFolder};

const DEFAULT_RECENT: i64 = 10;
const MAX_RECENT: i64 = 50;

// ============================================================================
// Public
// ============================================================================

/// POST /api/donations
///
/// JSON or multipart; the payment proof travels as the `paymentProof` part.
#[tracing::instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    submission: Submission<CreateDonationRequest>,
) -> ApiResult<Json<Submitted>> {
    let (req, file) = submission.into_parts();
    req.validate()?;
    req.check_amount().map_err(ApiError::Validation)?;

    let program_title = match req.program_id {
        Some(program_id) => Some(
            get_program_title(&state.db, program_id)
                .await?
                .ok_or_else(|| ApiError::Validation("programId: program does not exist".into()))?,
        ),
        None => None,
    };

    let proof = match file {
        Some(file) => Some(
            state
                .uploads
                .store(&file, UploadFolder::PaymentProofs, UploadCategory::Image, None)
                .await?,
        ),
        None => None,
    };

    let id = match queries::create_donation(&state.db, &req, proof.as_deref()).await {
        Ok(id) => id,
        Err(e) => {
            state.uploads.discard(proof.as_deref()).await;
            return Err(e.into());
        }
    };

    info!(
        donation_id = id,
        program_id = ?req.program_id,
        has_proof = proof.is_some(),
        "Donation received"
    );

    if let Some(email) = &state.email {
        email.send_in_background(
            req.donor_email.clone(),
            templates::donation_thank_you(
                email.org_name(),
                &req.donor_name,
                &req.amount,
                program_title.as_deref(),
            ),
        );
    }

    Ok(Json(Submitted {
        id,
        message: "Thank you for your donation",
    }))
}

/// GET /api/donations/recent?limit=
pub async fn recent(
    State(state): State<AppState>,
    Query(query): Query<RecentQuery>,
) -> ApiResult<Json<Vec<RecentDonation>>> {
    let limit = query.limit.unwrap_or(DEFAULT_RECENT).clamp(1, MAX_RECENT);
    Ok(Json(queries::list_recent_donations(&state.db, limit).await?))
}

// ============================================================================
// Admin
// ============================================================================

/// GET /api/admin/donations?status=
pub async fn list(
    State(state): State<AppState>,
    Query(filter): Query<DonationFilter>,
) -> ApiResult<Json<Vec<Donation>>> {
    Ok(Json(queries::list_donations(&state.db, filter.status).await?))
}

/// GET /api/admin/donations/{id}
pub async fn get(State(state): State<AppState>, Path(id): Path<i32>) -> ApiResult<Json<Donation>> {
    queries::get_donation(&state.db, id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("Donation"))
}

/// PUT /api/admin/donations/{id}/status
///
/// The status change and the program total adjustment commit together.
#[tracing::instrument(skip(state, req), fields(admin_id = admin.id, status = ?req.status))]
pub async fn update_status(
    State(state): State<AppState>,
    admin: AuthAdmin,
    Path(id): Path<i32>,
    Json(req): Json<UpdatePaymentStatusRequest>,
) -> ApiResult<Json<Success>> {
    let mut tx = state.db.begin().await?;

    let donation = queries::lock_donation(&mut tx, id)
        .await?
        .ok_or(ApiError::NotFound("Donation"))?;

    if donation.payment_status != req.status {
        queries::set_payment_status(&mut tx, id, req.status).await?;

        let delta = program_total_delta(donation.payment_status, req.status, donation.amount);
        if let (Some(program_id), Some(delta)) = (donation.program_id, delta) {
            adjust_current_amount(&mut tx, program_id, delta).await?;
        }
    }

    tx.commit().await?;

    info!(
        donation_id = id,
        from = ?donation.payment_status,
        "Donation status updated"
    );
    Ok(Json(Success::ok()))
}

/// DELETE /api/admin/donations/{id}
///
/// Removing a completed donation takes its amount off the program total.
#[tracing::instrument(skip(state), fields(admin_id = admin.id))]
pub async fn delete(
    State(state): State<AppState>,
    admin: AuthAdmin,
    Path(id): Path<i32>,
) -> ApiResult<Json<Success>> {
    let mut tx = state.db.begin().await?;

    let removed = queries::delete_donation(&mut tx, id)
        .await?
        .ok_or(ApiError::NotFound("Donation"))?;

    let delta = program_total_delta(
        removed.payment_status,
        super::PaymentStatus::Pending,
        removed.amount,
    );
    if let (Some(program_id), Some(delta)) = (removed.program_id, delta) {
        adjust_current_amount(&mut tx, program_id, delta).await?;
    }

    tx.commit().await?;

    state.uploads.discard(removed.payment_proof.as_deref()).await;

    info!(donation_id = id, "Donation deleted");
    Ok(Json(Success::ok()))
}

/// POST /api/admin/donations/{id}/send-email
///
/// Resends the thank-you note and reports delivery failures.
#[tracing::instrument(skip(state), fields(admin_id = admin.id))]
pub async fn send_email(
    State(state): State<AppState>,
    admin: AuthAdmin,
    Path(id): Path<i32>,
) -> ApiResult<Json<Success>> {
    let donation = queries::get_donation(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("Donation"))?;

    let Some(email) = &state.email else {
        warn!(donation_id = id, "Email requested but SMTP is not configured");
        return Err(ApiError::EmailDisabled);
    };

    let program_title = match donation.program_id {
        Some(program_id) => get_program_title(&state.db, program_id).await?,
        None => None,
    };

    email
        .send(
            &donation.donor_email,
            templates::donation_thank_you(
                email.org_name(),
                &donation.donor_name,
                &donation.amount,
                program_title.as_deref(),
            ),
        )
        .await
        .map_err(ApiError::Email)?;

    Ok(Json(Success::ok().with_message("Email sent successfully")))
}
