//! Request-body helpers shared by the route handlers.

use axum::{extract::rejection::JsonRejection, Json};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::errors::AppError;

/// Unwraps a JSON body that must be an object. Malformed JSON and non-object
/// bodies are client errors.
pub fn json_object(
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Map<String, Value>, AppError> {
    match payload {
        Ok(Json(Value::Object(map))) => Ok(map),
        Ok(Json(_)) => Err(AppError::Validation(
            "Request body must be a JSON object.".to_string(),
        )),
        Err(rejection) => Err(AppError::Validation(rejection.body_text())),
    }
}

/// True when any of `keys` is absent, null, or a blank string.
pub fn missing_any(doc: &Map<String, Value>, keys: &[&str]) -> bool {
    keys.iter().any(|key| match doc.get(*key) {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    })
}

pub fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Parses a record id from the path. Anything that is not a UUID cannot name a record.
pub fn parse_id(raw: &str, kind: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound(format!("{kind} {raw} not found")))
}
