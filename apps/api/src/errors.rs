use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::email_client::EmailError;
use crate::identity_client::IdentityError;

pub const MISSING_FIELDS: &str = "Missing required fields.";
pub const MISSING_TOKEN: &str = "Authentication Token is missing or malformed!";
pub const INVALID_TOKEN: &str = "Invalid or expired token!";

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("Authentication Token is missing or malformed!")]
    Unauthorized,

    #[error("Invalid or expired token: {0}")]
    Forbidden(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Email error: {0}")]
    Email(#[from] EmailError),

    #[error("Identity provider error: {0}")]
    Identity(#[from] IdentityError),
}

impl AppError {
    pub fn missing_fields() -> Self {
        AppError::Validation(MISSING_FIELDS.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, detail) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone(), None),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone(), None),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, MISSING_TOKEN.to_string(), None),
            AppError::Forbidden(reason) => (
                StatusCode::FORBIDDEN,
                INVALID_TOKEN.to_string(),
                Some(reason.clone()),
            ),
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                server_error(e)
            }
            AppError::Storage(msg) => {
                tracing::error!("Storage error: {msg}");
                server_error(msg)
            }
            AppError::Email(e) => {
                tracing::error!("Email error: {e}");
                server_error(e)
            }
            AppError::Identity(e) => {
                tracing::error!("Identity provider error: {e}");
                server_error(e)
            }
        };

        let mut body = Map::new();
        body.insert("message".to_string(), Value::String(message));
        if let Some(detail) = detail {
            body.insert("error".to_string(), Value::String(detail));
        }

        (status, Json(Value::Object(body))).into_response()
    }
}

fn server_error(e: impl std::fmt::Display) -> (StatusCode, String, Option<String>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("Server error: {e}"),
        None,
    )
}

/// Plain `{"message": ...}` body used by every successful response.
pub fn message(text: impl Into<String>) -> Json<Value> {
    Json(json!({ "message": text.into() }))
}
