//! Bearer-token guard for the admin surface.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::{debug, warn};

use crate::errors::AppError;
use crate::identity_client::IdentityError;
use crate::state::AppState;

/// Pulls the token out of `Authorization: Bearer <token>`.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Rejects the request unless it carries a token the identity provider accepts.
/// The verified account is inserted into the request extensions as `Arc<VerifiedUser>`.
pub async fn require_bearer(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(request.headers()).ok_or(AppError::Unauthorized)?;

    let user = state.verifier.verify(token).await.map_err(verification_error)?;

    debug!(
        "Admin request by {} ({})",
        user.uid,
        user.email.as_deref().unwrap_or("no email")
    );
    request.extensions_mut().insert(Arc::new(user));
    Ok(next.run(request).await)
}

/// Rejected tokens are 403; provider failures surface as 500.
fn verification_error(e: IdentityError) -> AppError {
    match e {
        IdentityError::Rejected(reason) => {
            warn!("Bearer token rejected: {reason}");
            AppError::Forbidden(reason)
        }
        other => AppError::Identity(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use axum::response::IntoResponse;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_rejected_token_is_forbidden() {
        let err = verification_error(IdentityError::Rejected("TOKEN_EXPIRED".to_string()));
        assert!(matches!(err, AppError::Forbidden(ref reason) if reason == "TOKEN_EXPIRED"));
    }

    #[test]
    fn test_provider_failure_is_server_error() {
        let err = verification_error(IdentityError::Api {
            status: 503,
            message: "backend unavailable".to_string(),
        });
        assert!(matches!(err, AppError::Identity(_)));
        assert_eq!(
            err.into_response().status(),
            axum::http::StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_bearer_token_extracted() {
        assert_eq!(bearer_token(&headers("Bearer abc.def")), Some("abc.def"));
    }

    #[test]
    fn test_missing_header_yields_none() {
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }

    #[test]
    fn test_non_bearer_scheme_yields_none() {
        assert_eq!(bearer_token(&headers("Basic dXNlcjpwYXNz")), None);
        assert_eq!(bearer_token(&headers("bearer abc")), None);
    }

    #[test]
    fn test_empty_bearer_yields_none() {
        assert_eq!(bearer_token(&headers("Bearer ")), None);
        assert_eq!(bearer_token(&headers("Bearer    ")), None);
    }
}
