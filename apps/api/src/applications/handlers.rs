//! Axum route handlers for job applications.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::applications::intake::{resume_key, ApplicationForm};
use crate::errors::{message, AppError};
use crate::identity_client::VerifiedUser;
use crate::models::record::Record;
use crate::notifications::templates::EmailStatus;
use crate::notifications::{send_status_email, Recipient};
use crate::records::{Collection, RecordPatch};
use crate::routes::payload::{json_object, parse_id};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Public
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/apply
///
/// Multipart (or urlencoded) application form. Validates before touching
/// storage, so a rejected submission uploads and persists nothing.
pub async fn handle_apply(
    State(state): State<AppState>,
    mut form: ApplicationForm,
) -> Result<(StatusCode, Json<Value>), AppError> {
    if form.missing_required() {
        return Err(AppError::missing_fields());
    }

    if let Some(resume) = form.resume.take() {
        let key = resume_key(
            form.field("lastName"),
            form.field("firstName"),
            &resume.file_name,
            Utc::now(),
        );
        let url = state
            .blobs
            .put_public(&key, resume.bytes, resume.content_type.as_deref())
            .await?;
        form.fields
            .insert("uploadedResumeUrl".to_string(), Value::String(url));
    }

    let record = state
        .records
        .insert(Collection::Applications, form.fields)
        .await?;
    info!("Application {} submitted", record.id);

    let mut reply = "Application submitted successfully.".to_string();
    if let Err(e) = notify(&state, &record, &EmailStatus::Received).await {
        warn!("Confirmation email for application {} failed: {e}", record.id);
        reply.push_str(&format!(" Confirmation email could not be sent: {e}"));
    }

    Ok((StatusCode::CREATED, message(reply)))
}

/// POST /submit-application
///
/// Bare resume upload. Returns the public URL for the stored file.
pub async fn handle_upload_resume(
    State(state): State<AppState>,
    form: ApplicationForm,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let resume = form
        .resume
        .as_ref()
        .ok_or_else(|| AppError::Validation("No file provided.".to_string()))?;

    let key = resume_key(
        form.field("lastName"),
        form.field("firstName"),
        &resume.file_name,
        Utc::now(),
    );
    let url = state
        .blobs
        .put_public(&key, resume.bytes.clone(), resume.content_type.as_deref())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "File uploaded successfully.", "url": url })),
    ))
}

// ────────────────────────────────────────────────────────────────────────────
// Admin
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/applications
pub async fn handle_list_applications(
    State(state): State<AppState>,
) -> Result<Json<Vec<Record>>, AppError> {
    Ok(Json(state.records.list(Collection::Applications).await?))
}

/// PUT /api/application/:id
///
/// Arbitrary partial update. Setting `status` to a known label also emails
/// the applicant; the outcome of that send is reported in the message.
pub async fn handle_update_application(
    State(state): State<AppState>,
    Extension(user): Extension<Arc<VerifiedUser>>,
    Path(raw_id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let id = parse_id(&raw_id, "Application")?;
    let patch = RecordPatch::from_document(json_object(payload)?);
    let status_label = patch
        .fields
        .get("status")
        .and_then(Value::as_str)
        .map(str::to_string);

    if !state
        .records
        .update(Collection::Applications, id, patch)
        .await?
    {
        return Err(AppError::NotFound(format!("Application {id} not found")));
    }
    info!("Admin {} updated application {id}", user.uid);

    let Some(label) = status_label else {
        return Ok(message("Application updated."));
    };
    let Some(record) = state.records.get(Collection::Applications, id).await? else {
        return Ok(message("Application updated."));
    };
    let Some(status) = EmailStatus::from_label(
        &label,
        record.field_str("interviewStartTime").map(String::from),
        record.field_str("interviewEndTime").map(String::from),
    ) else {
        return Ok(message("Application updated."));
    };

    match notify(&state, &record, &status).await {
        Ok(()) => Ok(message(format!(
            "Status updated to '{label}' and email sent."
        ))),
        Err(e) => {
            warn!("Status email for application {id} failed: {e}");
            Ok(message(format!("Status updated, but email failed. {e}")))
        }
    }
}

/// DELETE /api/application/:id
pub async fn handle_delete_application(
    State(state): State<AppState>,
    Extension(user): Extension<Arc<VerifiedUser>>,
    Path(raw_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let id = parse_id(&raw_id, "Application")?;
    let removed = state.records.delete(Collection::Applications, id).await?;
    info!(
        "Admin {} deleted application {id} (existed: {removed})",
        user.uid
    );
    Ok(message("Application deleted."))
}

/// POST /api/applications/mark-as-read
pub async fn handle_mark_applications_read(
    State(state): State<AppState>,
    Extension(user): Extension<Arc<VerifiedUser>>,
) -> Result<Json<Value>, AppError> {
    let updated = state
        .records
        .mark_all_viewed(Collection::Applications)
        .await?;
    info!("Admin {} marked {updated} applications as read", user.uid);
    Ok(Json(json!({
        "message": "All new applications marked as read.",
        "updated": updated
    })))
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
enum NotifyError {
    #[error("Applicant has no email address on file.")]
    NoAddress,
    #[error(transparent)]
    Email(#[from] crate::email_client::EmailError),
}

async fn notify(state: &AppState, record: &Record, status: &EmailStatus) -> Result<(), NotifyError> {
    let email = record
        .field_str("email")
        .filter(|e| !e.trim().is_empty())
        .ok_or(NotifyError::NoAddress)?;
    let recipient = Recipient {
        email,
        name: record
            .field_str("firstName")
            .or_else(|| record.field_str("name"))
            .unwrap_or("Applicant"),
        position: record.field_str("position").unwrap_or("open"),
    };
    send_status_email(state.mailer.as_ref(), &state.brand, &recipient, status).await?;
    Ok(())
}

