use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde_json::{json, Value};
use tracing::info;

use crate::errors::{message, AppError};
use crate::identity_client::VerifiedUser;
use crate::models::record::Record;
use crate::records::Collection;
use crate::routes::payload::{json_object, missing_any, parse_id};
use crate::state::AppState;

pub const REQUIRED_FIELDS: [&str; 3] = ["name", "email", "message"];

/// POST /api/inquiries
pub async fn handle_submit_inquiry(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let document = json_object(payload)?;
    if missing_any(&document, &REQUIRED_FIELDS) {
        return Err(AppError::missing_fields());
    }

    let record = state.records.insert(Collection::Inquiries, document).await?;
    info!("Inquiry {} submitted", record.id);

    Ok((
        StatusCode::CREATED,
        message("Inquiry submitted successfully!"),
    ))
}

/// GET /api/inquiries
pub async fn handle_list_inquiries(
    State(state): State<AppState>,
) -> Result<Json<Vec<Record>>, AppError> {
    Ok(Json(state.records.list(Collection::Inquiries).await?))
}

/// POST /api/inquiries/mark-as-read
pub async fn handle_mark_inquiries_read(
    State(state): State<AppState>,
    Extension(user): Extension<Arc<VerifiedUser>>,
) -> Result<Json<Value>, AppError> {
    let updated = state.records.mark_all_viewed(Collection::Inquiries).await?;
    info!("Admin {} marked {updated} inquiries as read", user.uid);
    Ok(Json(json!({
        "message": "All new inquiries marked as read.",
        "updated": updated
    })))
}

/// DELETE /api/inquiries/:id
pub async fn handle_delete_inquiry(
    State(state): State<AppState>,
    Extension(user): Extension<Arc<VerifiedUser>>,
    Path(raw_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let id = parse_id(&raw_id, "Inquiry")?;
    let removed = state.records.delete(Collection::Inquiries, id).await?;
    info!("Admin {} deleted inquiry {id} (existed: {removed})", user.uid);
    Ok(message("Inquiry deleted."))
}
