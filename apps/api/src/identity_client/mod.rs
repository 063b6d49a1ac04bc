//! Identity client: verifies admin bearer tokens against the identity provider.
//!
//! Production uses the Identity Toolkit `accounts:lookup` endpoint, which
//! accepts a Firebase ID token and answers with the owning account or
//! `INVALID_ID_TOKEN` / `TOKEN_EXPIRED`.
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum IdentityError {
    /// The provider looked at the token and refused it.
    #[error("{0}")]
    Rejected(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Identity API error (status {status}): {message}")]
    Api { status: u16, message: String },
}

/// The account a verified token belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedUser {
    pub uid: String,
    pub email: Option<String>,
}

#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<VerifiedUser, IdentityError>;
}

#[derive(Debug, Serialize)]
struct LookupRequest<'a> {
    #[serde(rename = "idToken")]
    id_token: &'a str,
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<LookupUser>,
}

#[derive(Debug, Deserialize)]
struct LookupUser {
    #[serde(rename = "localId")]
    local_id: String,
    email: Option<String>,
    #[serde(default)]
    disabled: bool,
}

#[derive(Debug, Deserialize)]
struct GoogleError {
    error: GoogleErrorBody,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorBody {
    message: String,
}

#[derive(Clone)]
pub struct IdentityToolkitClient {
    client: Client,
    api_key: String,
    lookup_url: String,
}

impl IdentityToolkitClient {
    pub fn new(client: Client, api_key: String, lookup_url: String) -> Self {
        Self {
            client,
            api_key,
            lookup_url,
        }
    }
}

#[async_trait]
impl TokenVerifier for IdentityToolkitClient {
    async fn verify(&self, token: &str) -> Result<VerifiedUser, IdentityError> {
        let response = self
            .client
            .post(&self.lookup_url)
            .query(&[("key", self.api_key.as_str())])
            .json(&LookupRequest { id_token: token })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<GoogleError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            // 4xx means the token itself was refused; anything else is the provider failing.
            if status.is_client_error() {
                return Err(IdentityError::Rejected(message));
            }
            return Err(IdentityError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let lookup: LookupResponse = response.json().await?;
        let user = account_from_lookup(lookup)?;
        debug!("Verified bearer token for uid {}", user.uid);
        Ok(user)
    }
}

fn account_from_lookup(lookup: LookupResponse) -> Result<VerifiedUser, IdentityError> {
    let user = lookup
        .users
        .into_iter()
        .next()
        .ok_or_else(|| IdentityError::Rejected("USER_NOT_FOUND".to_string()))?;
    if user.disabled {
        return Err(IdentityError::Rejected("USER_DISABLED".to_string()));
    }
    Ok(VerifiedUser {
        uid: user.local_id,
        email: user.email,
    })
}

#[cfg(test)]
pub mod memory {
    use super::*;

    pub const VALID_TOKEN: &str = "valid-admin-token";

    /// Test double accepting exactly `VALID_TOKEN`.
    #[derive(Default)]
    pub struct StaticTokenVerifier;

    #[async_trait]
    impl TokenVerifier for StaticTokenVerifier {
        async fn verify(&self, token: &str) -> Result<VerifiedUser, IdentityError> {
            if token == VALID_TOKEN {
                Ok(VerifiedUser {
                    uid: "admin-uid".to_string(),
                    email: Some("admin@example.com".to_string()),
                })
            } else {
                Err(IdentityError::Rejected("INVALID_ID_TOKEN".to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(json: &str) -> LookupResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_lookup_returns_first_account() {
        let user = account_from_lookup(lookup(
            r#"{"kind":"identitytoolkit#GetAccountInfoResponse",
                "users":[{"localId":"abc123","email":"hr@example.com"}]}"#,
        ))
        .unwrap();
        assert_eq!(user.uid, "abc123");
        assert_eq!(user.email.as_deref(), Some("hr@example.com"));
    }

    #[test]
    fn test_lookup_without_users_is_rejected() {
        let err = account_from_lookup(lookup(r#"{"kind":"x"}"#)).unwrap_err();
        assert_eq!(err.to_string(), "USER_NOT_FOUND");
    }

    #[test]
    fn test_disabled_account_is_rejected() {
        let err = account_from_lookup(lookup(
            r#"{"users":[{"localId":"abc","disabled":true}]}"#,
        ))
        .unwrap_err();
        assert!(matches!(err, IdentityError::Rejected(ref m) if m == "USER_DISABLED"));
    }

    #[test]
    fn test_request_uses_id_token_field() {
        let value = serde_json::to_value(LookupRequest { id_token: "t" }).unwrap();
        assert_eq!(value["idToken"], "t");
    }
}
