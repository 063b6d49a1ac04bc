use async_trait::async_trait;
use axum::{
    extract::{FromRequest, Multipart, Request},
    http::header::CONTENT_TYPE,
    Form,
};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::errors::AppError;
use crate::storage::RESUME_PREFIX;

/// Form fields every application must carry, non-empty.
pub const REQUIRED_FIELDS: [&str; 6] = ["firstName", "lastName", "email", "position", "age", "degree"];

/// Accepted names for the resume file part. The first is canonical.
pub const RESUME_FIELDS: [&str; 2] = ["resumeFile", "resume"];

/// Fields the server fills in after storing the resume. Client values are dropped.
pub const SERVER_FIELDS: [&str; 1] = ["uploadedResumeUrl"];

#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

/// A decoded multipart application: text fields plus the optional resume.
#[derive(Debug, Default)]
pub struct ApplicationForm {
    pub fields: Map<String, Value>,
    pub resume: Option<UploadedFile>,
}

impl ApplicationForm {
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    /// Records a submitted text field unless the server owns that key.
    pub fn insert_text(&mut self, name: String, value: String) {
        if !SERVER_FIELDS.contains(&name.as_str()) {
            self.fields.insert(name, Value::String(value));
        }
    }

    pub fn missing_required(&self) -> bool {
        REQUIRED_FIELDS
            .iter()
            .any(|key| self.field(key).map_or(true, |v| v.trim().is_empty()))
    }
}

/// Drains a multipart body. Text parts become string fields; the first resume
/// part with a non-empty filename is kept, other file parts are ignored.
pub async fn read_form(mut multipart: Multipart) -> Result<ApplicationForm, AppError> {
    let mut form = ApplicationForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(e.body_text()))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if let Some(file_name) = field.file_name().map(str::to_string) {
            let wanted = RESUME_FIELDS.contains(&name.as_str())
                && form.resume.is_none()
                && !file_name.trim().is_empty();
            let content_type = field.content_type().map(str::to_string);
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(e.body_text()))?;
            if wanted {
                form.resume = Some(UploadedFile {
                    file_name,
                    content_type,
                    bytes,
                });
            }
            continue;
        }

        let text = field
            .text()
            .await
            .map_err(|e| AppError::Validation(e.body_text()))?;
        form.insert_text(name, text);
    }

    Ok(form)
}

/// Accepts `multipart/form-data` (with an optional resume) or a plain
/// `application/x-www-form-urlencoded` form. Malformed bodies are 400s.
#[async_trait]
impl<S> FromRequest<S> for ApplicationForm
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let urlencoded = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("application/x-www-form-urlencoded"));

        if urlencoded {
            let Form(pairs) = Form::<Vec<(String, String)>>::from_request(req, state)
                .await
                .map_err(|e| AppError::Validation(e.body_text()))?;
            let mut form = ApplicationForm::default();
            for (name, value) in pairs {
                form.insert_text(name, value);
            }
            return Ok(form);
        }

        let multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| AppError::Validation(e.body_text()))?;
        read_form(multipart).await
    }
}

/// `resumes/{lastName}_{firstName}_{seconds.micros}_{filename}`, or
/// `resumes/{seconds.micros}_{filename}` when no applicant name is known.
pub fn resume_key(
    last_name: Option<&str>,
    first_name: Option<&str>,
    file_name: &str,
    now: DateTime<Utc>,
) -> String {
    let stamp = format!("{}.{:06}", now.timestamp(), now.timestamp_subsec_micros());
    let file_name = path_safe(base_name(file_name));
    match (last_name, first_name) {
        (Some(last), Some(first)) => format!(
            "{RESUME_PREFIX}{}_{}_{stamp}_{file_name}",
            path_safe(last.trim()),
            path_safe(first.trim())
        ),
        _ => format!("{RESUME_PREFIX}{stamp}_{file_name}"),
    }
}

/// Final path segment of a client-supplied filename.
fn base_name(file_name: &str) -> &str {
    file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(file_name)
}

fn path_safe(segment: &str) -> String {
    segment
        .chars()
        .map(|c| if c == '/' || c == '\\' || c.is_control() { '_' } else { c })
        .collect()
}
