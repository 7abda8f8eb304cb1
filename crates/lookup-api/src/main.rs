//! # lookup-api — Binary Entry Point
//!
//! Reads configuration, runs the startup network steps (initial JWKS fetch,
//! Cloud Run self-discovery), then serves the Axum app on `PORT` (default 8080).

use lookup_api::auth::TokenVerifier;
use lookup_api::config::{AppConfig, AuthSettings, ConfigError};
use lookup_api::state::AppState;
use lookup_data_client::cloud_run::{resolve_service_url, CloudRunService, DiscoveryError};
use lookup_data_client::{DataLayerClient, MetadataServer};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let config = AppConfig::from_env().map_err(|e| {
        tracing::error!("Configuration invalid: {e}");
        e
    })?;
    tracing::info!(
        data_layer = %config.data_layer.base_url,
        "Data layer configured"
    );

    let tokens = config.data_layer.token_provider()?;
    let data_layer = DataLayerClient::new(config.data_layer.clone(), tokens)?;

    let verifier = match &config.auth {
        Some(auth) => Some(build_verifier(auth).await.map_err(|e| {
            tracing::error!("Inbound token verifier unavailable: {e}");
            e
        })?),
        None => {
            tracing::warn!("Inbound verification disabled; requests are not authenticated");
            None
        }
    };

    let service_url = discover_service_url(&config).await;

    let port = config.port;
    let state = AppState::new(config, data_layer, verifier).with_service_url(service_url);
    let app = lookup_api::app(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Lookup codes orchestration layer listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Structured logging; `LOG_FORMAT=json` switches to JSON lines.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

/// JWKS takes precedence over a shared secret when both are configured.
async fn build_verifier(auth: &AuthSettings) -> Result<TokenVerifier, Box<dyn std::error::Error>> {
    let verifier = match (&auth.jwks_url, &auth.secret_key) {
        (Some(url), _) => TokenVerifier::from_jwks_url(url.as_str(), auth.audience.clone()).await?,
        (None, Some(secret)) => TokenVerifier::from_secret(secret.as_bytes(), auth.audience.clone()),
        (None, None) => return Err(ConfigError::NoVerificationKey.into()),
    };
    Ok(verifier.with_issuers(auth.issuers.clone()))
}

/// Look up this service's public URL for the OpenAPI `servers` entry.
/// Only attempted on Cloud Run; failures are logged and ignored.
async fn discover_service_url(config: &AppConfig) -> Option<String> {
    let service = CloudRunService::from_env()?;
    match resolve_own_url(&config.data_layer.metadata_host, &service).await {
        Ok(url) => {
            tracing::info!(%url, "Discovered Cloud Run service URL");
            Some(url)
        }
        Err(e) => {
            tracing::warn!(service = %service.service, "Cloud Run service URL discovery failed: {e}");
            None
        }
    }
}

async fn resolve_own_url(
    metadata_host: &str,
    service: &CloudRunService,
) -> Result<String, DiscoveryError> {
    let metadata = MetadataServer::new(metadata_host)?;
    let api_base = service.admin_api_base()?;
    resolve_service_url(&metadata, service, &api_base).await
}
