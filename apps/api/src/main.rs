mod applications;
mod auth;
mod config;
mod db;
mod email_client;
mod errors;
mod identity_client;
mod inquiries;
mod models;
mod notifications;
mod positions;
mod records;
mod routes;
mod state;
mod storage;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use axum::extract::DefaultBodyLimit;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::email_client::BrevoClient;
use crate::identity_client::IdentityToolkitClient;
use crate::records::postgres::PgRecordStore;
use crate::routes::build_router;
use crate::state::AppState;
use crate::storage::S3BlobStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={},tower_http={}",
                env!("CARGO_CRATE_NAME"),
                &config.rust_log,
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting recruit API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url, config.database_max_connections).await?;

    // Initialize S3-compatible storage
    let s3 = build_s3_client(&config).await;
    let blobs = S3BlobStore::new(s3, config.s3_bucket.clone(), config.public_base_url());
    info!("S3 client initialized (bucket: {})", config.s3_bucket);

    // One HTTP client shared by the identity and email integrations
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()?;

    let verifier = IdentityToolkitClient::new(
        http.clone(),
        config.identity_api_key.clone(),
        config.identity_verify_url.clone(),
    );

    let mailer = BrevoClient::new(http, config.email.clone());
    if !mailer.is_configured() {
        warn!("BREVO_API_KEY or EMAIL_SENDER not set; notification emails are disabled");
    }

    // Build app state
    let state = AppState {
        records: Arc::new(PgRecordStore::new(db)),
        blobs: Arc::new(blobs),
        verifier: Arc::new(verifier),
        mailer: Arc::new(mailer),
        brand: Arc::new(config.brand.clone()),
    };

    // Build router
    let app = build_router(state)
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Constructs an S3 client for AWS or any S3-compatible endpoint (MinIO, R2, GCS interop).
async fn build_s3_client(config: &Config) -> aws_sdk_s3::Client {
    let credentials = Credentials::new(
        &config.aws_access_key_id,
        &config.aws_secret_access_key,
        None,
        None,
        "recruit-static",
    );

    let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new(config.s3_region.clone()))
        .credentials_provider(credentials);
    if let Some(endpoint) = &config.s3_endpoint {
        loader = loader.endpoint_url(endpoint);
    }
    let shared = loader.load().await;

    // Custom endpoints are addressed path-style: {endpoint}/{bucket}/{key}
    let s3_config = aws_sdk_s3::config::Builder::from(&shared)
        .force_path_style(config.s3_endpoint.is_some())
        .build();
    aws_sdk_s3::Client::from_conf(s3_config)
}
