pub mod health;
pub mod payload;


use axum::{
    middleware::from_fn_with_state,
    routing::{delete, get, post, put},
    Router,
};

use crate::applications::handlers as applications;
use crate::auth::require_bearer;
use crate::inquiries::handlers as inquiries;
use crate::notifications::handlers as notifications;
use crate::positions::handlers as positions;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let public = Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/apply", post(applications::handle_apply))
        .route(
            "/submit-application",
            post(applications::handle_upload_resume),
        )
        .route("/api/positions", get(positions::handle_list_positions))
        .route("/api/inquiries", post(inquiries::handle_submit_inquiry));

    // Every route below requires a verified bearer token.
    let admin = Router::new()
        .route(
            "/api/applications",
            get(applications::handle_list_applications),
        )
        .route(
            "/api/application/:id",
            put(applications::handle_update_application)
                .delete(applications::handle_delete_application),
        )
        .route(
            "/api/applications/mark-as-read",
            post(applications::handle_mark_applications_read),
        )
        .route("/api/inquiries", get(inquiries::handle_list_inquiries))
        .route(
            "/api/inquiries/mark-as-read",
            post(inquiries::handle_mark_inquiries_read),
        )
        .route("/api/inquiries/:id", delete(inquiries::handle_delete_inquiry))
        .route("/api/positions", post(positions::handle_create_position))
        .route("/api/positions/:id", delete(positions::handle_delete_position))
        .route(
            "/send-registration-email",
            post(notifications::handle_send_registration_email),
        )
        .route(
            "/send-interview-email",
            post(notifications::handle_send_interview_email),
        )
        .route(
            "/send-rejection-email",
            post(notifications::handle_send_rejection_email),
        )
        .route_layer(from_fn_with_state(state.clone(), require_bearer));

    public.merge(admin).with_state(state)
}
