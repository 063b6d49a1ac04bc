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

/// GET /api/positions
///
/// Public listing, ordered by title.
pub async fn handle_list_positions(
    State(state): State<AppState>,
) -> Result<Json<Vec<Record>>, AppError> {
    Ok(Json(state.records.list(Collection::Positions).await?))
}

/// POST /api/positions
pub async fn handle_create_position(
    State(state): State<AppState>,
    Extension(user): Extension<Arc<VerifiedUser>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let document = json_object(payload)?;
    if missing_any(&document, &["title"]) {
        return Err(AppError::missing_fields());
    }

    let record = state.records.insert(Collection::Positions, document).await?;
    info!("Admin {} created position {}", user.uid, record.id);

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Position created.", "id": record.id })),
    ))
}

/// DELETE /api/positions/:id
pub async fn handle_delete_position(
    State(state): State<AppState>,
    Extension(user): Extension<Arc<VerifiedUser>>,
    Path(raw_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let id = parse_id(&raw_id, "Position")?;
    let removed = state.records.delete(Collection::Positions, id).await?;
    info!("Admin {} deleted position {id} (existed: {removed})", user.uid);
    Ok(message("Position deleted."))
}
