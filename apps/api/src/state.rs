use std::sync::Arc;

use crate::email_client::EmailSender;
use crate::identity_client::TokenVerifier;
use crate::notifications::templates::Brand;
use crate::records::RecordStore;
use crate::storage::BlobStore;

/// Shared application state injected into all route handlers via Axum extractors.
/// Every external collaborator is built once in `main` and shared behind a trait object.
#[derive(Clone)]
pub struct AppState {
    pub records: Arc<dyn RecordStore>,
    pub blobs: Arc<dyn BlobStore>,
    pub verifier: Arc<dyn TokenVerifier>,
    pub mailer: Arc<dyn EmailSender>,
    /// Branding for notification emails.
    pub brand: Arc<Brand>,
}
