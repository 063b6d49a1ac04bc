//! Admin-triggered notification emails.

use std::sync::Arc;

use axum::{extract::rejection::JsonRejection, extract::State, Extension, Json};
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use crate::errors::{message, AppError};
use crate::identity_client::VerifiedUser;
use crate::notifications::templates::EmailStatus;
use crate::notifications::{send_status_email, Recipient};
use crate::routes::payload::non_empty;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusEmailRequest {
    pub email: Option<String>,
    pub name: Option<String>,
    pub position: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

/// POST /send-registration-email
pub async fn handle_send_registration_email(
    State(state): State<AppState>,
    Extension(user): Extension<Arc<VerifiedUser>>,
    payload: Result<Json<StatusEmailRequest>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    send_for(&state, &user, payload, |_| EmailStatus::Received).await
}

/// POST /send-interview-email
pub async fn handle_send_interview_email(
    State(state): State<AppState>,
    Extension(user): Extension<Arc<VerifiedUser>>,
    payload: Result<Json<StatusEmailRequest>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    send_for(&state, &user, payload, |req| EmailStatus::Interview {
        start: req.start_time.clone(),
        end: req.end_time.clone(),
    })
    .await
}

/// POST /send-rejection-email
pub async fn handle_send_rejection_email(
    State(state): State<AppState>,
    Extension(user): Extension<Arc<VerifiedUser>>,
    payload: Result<Json<StatusEmailRequest>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    send_for(&state, &user, payload, |_| EmailStatus::Rejected).await
}

async fn send_for(
    state: &AppState,
    user: &VerifiedUser,
    payload: Result<Json<StatusEmailRequest>, JsonRejection>,
    status: impl FnOnce(&StatusEmailRequest) -> EmailStatus,
) -> Result<Json<Value>, AppError> {
    let Json(request) = payload.map_err(|e| AppError::Validation(e.body_text()))?;

    let (Some(email), Some(name), Some(position)) = (
        non_empty(request.email.as_deref()),
        non_empty(request.name.as_deref()),
        non_empty(request.position.as_deref()),
    ) else {
        return Err(AppError::missing_fields());
    };

    let status = status(&request);
    let recipient = Recipient {
        email,
        name,
        position,
    };
    send_status_email(state.mailer.as_ref(), &state.brand, &recipient, &status).await?;

    info!("Admin {} sent {:?} email to {}", user.uid, status, email);
    Ok(message("Email sent."))
}
