//! API handlers for the contact form.

use axum::extract::{Path, State};
use axum::Json;
use tracing::{info, warn};
use validator::Validate;

use super::queries;
use super::types::{
    ContactMessage, CreateContactRequest, ReplyRequest, UpdateContactStatusRequest,
};
use crate::api::{ApiError, ApiResult, AppState, Submitted, Success};
use crate::auth::AuthAdmin;
use crate::email::templates;

const NOT_FOUND: ApiError = ApiError::NotFound("Message");

/// POST /api/contact
#[tracing::instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<CreateContactRequest>,
) -> ApiResult<Json<Submitted>> {
    req.validate()?;

    let id = queries::create_message(&state.db, &req).await?;
    info!(message_id = id, "Contact message received");

    if let Some(email) = &state.email {
        email.send_in_background(
            req.email.clone(),
            templates::contact_acknowledgement(email.org_name(), &req.name, req.subject.as_deref()),
        );
    }

    Ok(Json(Submitted {
        id,
        message: "Your message has been sent",
    }))
}

/// GET /api/admin/contacts
pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<ContactMessage>>> {
    Ok(Json(queries::list_messages(&state.db).await?))
}

/// GET /api/admin/contacts/{id}
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<Json<ContactMessage>> {
    queries::get_message(&state.db, id)
        .await?
        .map(Json)
        .ok_or(NOT_FOUND)
}

/// PUT /api/admin/contacts/{id}/status
#[tracing::instrument(skip(state, req), fields(status = ?req.status))]
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(req): Json<UpdateContactStatusRequest>,
) -> ApiResult<Json<Success>> {
    if !queries::set_message_status(&state.db, id, req.status).await? {
        return Err(NOT_FOUND);
    }
    Ok(Json(Success::ok()))
}

/// POST /api/admin/contacts/{id}/reply
///
/// The reply is recorded only after the SMTP server accepted the email.
#[tracing::instrument(skip(state, req), fields(admin_id = admin.id))]
pub async fn reply(
    State(state): State<AppState>,
    admin: AuthAdmin,
    Path(id): Path<i32>,
    Json(req): Json<ReplyRequest>,
) -> ApiResult<Json<Success>> {
    req.validate()?;

    let message = queries::get_message(&state.db, id).await?.ok_or(NOT_FOUND)?;

    let Some(email) = &state.email else {
        warn!(message_id = id, "Reply requested but SMTP is not configured");
        return Err(ApiError::EmailDisabled);
    };

    email
        .send(
            &message.email,
            templates::manual_reply(
                email.org_name(),
                &message.name,
                message.subject_or_default(),
                &message.message,
                &req.reply,
            ),
        )
        .await
        .map_err(ApiError::Email)?;

    if !queries::record_reply(&state.db, id, &req.reply, admin.id).await? {
        return Err(NOT_FOUND);
    }

    info!(message_id = id, "Contact message replied");
    Ok(Json(Success::ok().with_message("Reply sent successfully")))
}

/// DELETE /api/admin/contacts/{id}
#[tracing::instrument(skip(state))]
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<Json<Success>> {
    if !queries::delete_message(&state.db, id).await? {
        return Err(NOT_FOUND);
    }
    info!(message_id = id, "Contact message deleted");
    Ok(Json(Success::ok()))
}
