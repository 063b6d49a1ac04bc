//! Email client: the single point of entry for transactional email.
//!
//! Wraps the Brevo `POST /v3/smtp/email` API. No other module talks to the
//! email provider directly; handlers go through `Arc<dyn EmailSender>`.
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::EmailConfig;

const BREVO_API_URL: &str = "https://api.brevo.com/v3/smtp/email";

#[derive(Debug, Error)]
pub enum EmailError {
    #[error("Server is not configured for email. Missing environment variables.")]
    NotConfigured,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Brevo error (status {status}): {message}")]
    Api { status: u16, message: String },
}

/// A fully rendered message ready to hand to the provider.
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingEmail {
    pub to_email: String,
    pub to_name: String,
    pub subject: String,
    pub html: String,
}

#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), EmailError>;
}

#[derive(Debug, Serialize)]
struct BrevoRequest<'a> {
    sender: BrevoContact<'a>,
    to: Vec<BrevoContact<'a>>,
    subject: &'a str,
    #[serde(rename = "htmlContent")]
    html_content: &'a str,
}

#[derive(Debug, Serialize)]
struct BrevoContact<'a> {
    email: &'a str,
    name: &'a str,
}

#[derive(Debug, Deserialize)]
struct BrevoSendResponse {
    #[serde(rename = "messageId")]
    message_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BrevoError {
    message: String,
}

/// Brevo transactional email client. Holds no config when email is disabled,
/// in which case every send returns `EmailError::NotConfigured`.
#[derive(Clone)]
pub struct BrevoClient {
    client: Client,
    config: Option<EmailConfig>,
    endpoint: String,
}

impl BrevoClient {
    pub fn new(client: Client, config: Option<EmailConfig>) -> Self {
        Self {
            client,
            config,
            endpoint: BREVO_API_URL.to_string(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.config.is_some()
    }
}

#[async_trait]
impl EmailSender for BrevoClient {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), EmailError> {
        let config = self.config.as_ref().ok_or(EmailError::NotConfigured)?;

        let request_body = BrevoRequest {
            sender: BrevoContact {
                email: &config.sender_email,
                name: &config.sender_name,
            },
            to: vec![BrevoContact {
                email: &email.to_email,
                name: &email.to_name,
            }],
            subject: &email.subject,
            html_content: &email.html,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header("api-key", &config.api_key)
            .header("accept", "application/json")
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = parse_error_message(&body);
            return Err(EmailError::Api {
                status: status.as_u16(),
                message,
            });
        }

        // Brevo answers 201 with a message id; an unparseable body still means accepted.
        let body = response.text().await.unwrap_or_default();
        let message_id = serde_json::from_str::<BrevoSendResponse>(&body)
            .ok()
            .and_then(|r| r.message_id);
        debug!(
            "Email '{}' accepted for {} (message id: {})",
            email.subject,
            email.to_email,
            message_id.as_deref().unwrap_or("unknown")
        );
        Ok(())
    }
}

/// Extracts Brevo's `message` field from an error body, falling back to the raw body.
fn parse_error_message(body: &str) -> String {
    serde_json::from_str::<BrevoError>(body)
        .map(|e| e.message)
        .unwrap_or_else(|_| body.to_string())
}


#[cfg(test)]
mod tests {
    use super::*;

    fn sample_email() -> OutgoingEmail {
        OutgoingEmail {
            to_email: "jane@example.com".to_string(),
            to_name: "Jane".to_string(),
            subject: "Hello".to_string(),
            html: "<p>Hi</p>".to_string(),
        }
    }

    #[test]
    fn test_request_body_uses_brevo_field_names() {
        let email = sample_email();
        let body = BrevoRequest {
            sender: BrevoContact {
                email: "hr@example.com",
                name: "The Team",
            },
            to: vec![BrevoContact {
                email: &email.to_email,
                name: &email.to_name,
            }],
            subject: &email.subject,
            html_content: &email.html,
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["htmlContent"], "<p>Hi</p>");
        assert_eq!(value["to"][0]["email"], "jane@example.com");
        assert_eq!(value["sender"]["name"], "The Team");
    }

    #[test]
    fn test_parse_error_message_prefers_json_message() {
        let body = r#"{"code":"unauthorized","message":"Key not found"}"#;
        assert_eq!(parse_error_message(body), "Key not found");
    }

    #[test]
    fn test_parse_error_message_falls_back_to_raw_body() {
        assert_eq!(parse_error_message("Bad Gateway"), "Bad Gateway");
    }

    #[tokio::test]
    async fn test_unconfigured_client_refuses_to_send() {
        let client = BrevoClient::new(Client::new(), None);
        assert!(!client.is_configured());
        let err = client.send(&sample_email()).await.unwrap_err();
        assert!(matches!(err, EmailError::NotConfigured));
        assert_eq!(
            err.to_string(),
            "Server is not configured for email. Missing environment variables."
        );
    }
}
