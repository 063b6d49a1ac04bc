use anyhow::{Context, Result};

use crate::notifications::templates::Brand;

const DEFAULT_IDENTITY_VERIFY_URL: &str =
    "https://identitytoolkit.googleapis.com/v1/accounts:lookup";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Application configuration loaded from environment variables.
/// Startup aborts if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub s3_bucket: String,
    pub s3_endpoint: Option<String>,
    pub s3_region: String,
    pub s3_public_base_url: Option<String>,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    pub identity_api_key: String,
    pub identity_verify_url: String,
    pub email: Option<EmailConfig>,
    pub brand: Brand,
    pub max_upload_bytes: usize,
    pub port: u16,
    pub rust_log: String,
}

/// Transactional email settings. Absent when either the API key or the
/// sender address is unset, in which case every send fails softly.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub api_key: String,
    pub sender_email: String,
    pub sender_name: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let company_name = optional_env("COMPANY_NAME").unwrap_or_else(|| "Lifewood".to_string());
        let website_url = optional_env("COMPANY_WEBSITE_URL")
            .unwrap_or_else(|| "https://lifewood-ony.vercel.app/".to_string());
        let careers_url = optional_env("COMPANY_CAREERS_URL")
            .unwrap_or_else(|| format!("{}services.html", with_trailing_slash(&website_url)));

        let email = match (optional_env("BREVO_API_KEY"), optional_env("EMAIL_SENDER")) {
            (Some(api_key), Some(sender_email)) => Some(EmailConfig {
                api_key,
                sender_email,
                sender_name: optional_env("EMAIL_SENDER_NAME")
                    .unwrap_or_else(|| format!("The {company_name} Team")),
            }),
            _ => None,
        };

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            database_max_connections: parse_env("DATABASE_MAX_CONNECTIONS", 10)?,
            s3_bucket: require_env("S3_BUCKET")?,
            s3_endpoint: optional_env("S3_ENDPOINT"),
            s3_region: optional_env("S3_REGION").unwrap_or_else(|| "us-east-1".to_string()),
            s3_public_base_url: optional_env("S3_PUBLIC_BASE_URL"),
            aws_access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
            aws_secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
            identity_api_key: require_env("IDENTITY_API_KEY")?,
            identity_verify_url: optional_env("IDENTITY_VERIFY_URL")
                .unwrap_or_else(|| DEFAULT_IDENTITY_VERIFY_URL.to_string()),
            email,
            brand: Brand {
                company_name,
                website_url,
                careers_url,
            },
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Base URL under which uploaded objects are publicly reachable.
    pub fn public_base_url(&self) -> String {
        if let Some(url) = &self.s3_public_base_url {
            return url.trim_end_matches('/').to_string();
        }
        match &self.s3_endpoint {
            Some(endpoint) => format!("{}/{}", endpoint.trim_end_matches('/'), self.s3_bucket),
            None => format!(
                "https://{}.s3.{}.amazonaws.com",
                self.s3_bucket, self.s3_region
            ),
        }
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value: '{raw}'")),
        None => Ok(default),
    }
}

fn with_trailing_slash(url: &str) -> String {
    if url.ends_with('/') {
        url.to_string()
    } else {
        format!("{url}/")
    }
}
