//! # lookup-data-client -- Typed Rust client for the lookup codes data layer
//!
//! The data layer is a plain REST resource store:
//!
//! ```text
//! GET|POST|PUT|DELETE {base_url}[/{scope}][/{item_id}]
//! ```
//!
//! Every call carries a freshly minted identity token whose audience is the
//! data layer's base URL. Tokens come from an [`IdentityTokenProvider`];
//! on Cloud Run that is the instance metadata server ([`MetadataServer`]).
//!
//! ## Architecture
//!
//! This crate is the ONLY path from the orchestration layer to the data
//! layer. It forwards bodies as-is and hands back the raw status and body:
//! deciding what a downstream status *means* is the caller's job.
//!
//! No retries and no token caching: one token fetch and one HTTP call per
//! [`DataLayerClient::forward`].

pub mod cloud_run;
pub mod config;
pub mod error;
pub mod metadata;
pub mod token;

pub use config::{ConfigError, DataLayerConfig};
pub use error::DataLayerError;
pub use metadata::MetadataServer;
pub use token::{IdentityTokenProvider, StaticTokenProvider, TokenError};

use std::sync::Arc;
use std::time::Duration;

use lookup_core::DownstreamPath;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
pub use reqwest::{Method, StatusCode};
use url::Url;

/// Status and raw body of a data-layer response.
#[derive(Debug, Clone)]
pub struct DownstreamResponse {
    endpoint: String,
    pub status: StatusCode,
    pub body: Vec<u8>,
}

impl DownstreamResponse {
    /// Parse the body as JSON, whatever the status code was.
    pub fn json(&self) -> Result<serde_json::Value, DataLayerError> {
        serde_json::from_slice(&self.body).map_err(|e| DataLayerError::Deserialization {
            endpoint: self.endpoint.clone(),
            source: e,
        })
    }
}

/// Client for the lookup codes data layer.
#[derive(Clone)]
pub struct DataLayerClient {
    http: reqwest::Client,
    base_url: Url,
    audience: String,
    tokens: Arc<dyn IdentityTokenProvider>,
}

impl std::fmt::Debug for DataLayerClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataLayerClient")
            .field("base_url", &self.base_url)
            .field("audience", &self.audience)
            .finish_non_exhaustive()
    }
}

impl DataLayerClient {
    /// Create a client from configuration and an outbound token source.
    pub fn new(
        config: DataLayerConfig,
        tokens: Arc<dyn IdentityTokenProvider>,
    ) -> Result<Self, DataLayerError> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder.build().map_err(|e| DataLayerError::Http {
            endpoint: "client_init".into(),
            source: e,
        })?;

        Ok(Self {
            http,
            base_url: config.base_url,
            audience: config.audience,
            tokens,
        })
    }

    /// Forward one call to the data layer.
    ///
    /// Resolves `path` against the base URL, fetches an identity token for
    /// the configured audience, then sends `method` with the bearer token,
    /// `Content-Type: application/json` and `body` (if any). Any status code
    /// is returned as-is; only token, path and transport failures are errors.
    pub async fn forward(
        &self,
        method: Method,
        path: &DownstreamPath,
        body: Option<&serde_json::Value>,
    ) -> Result<DownstreamResponse, DataLayerError> {
        let url = path.resolve(&self.base_url)?;
        let endpoint = format!("{method} {path}");

        let token = self.tokens.fetch_identity_token(&self.audience).await?;

        let mut request = self
            .http
            .request(method.clone(), url.clone())
            .header(AUTHORIZATION, format!("Bearer {}", token.as_str()))
            .header(CONTENT_TYPE, "application/json");
        if let Some(body) = body {
            request = request.json(body);
        }

        let resp = request.send().await.map_err(|e| DataLayerError::Http {
            endpoint: endpoint.clone(),
            source: e,
        })?;

        let status = resp.status();
        tracing::debug!(%method, %url, status = status.as_u16(), "data layer call completed");

        let body = resp.bytes().await.map_err(|e| DataLayerError::Http {
            endpoint: endpoint.clone(),
            source: e,
        })?;

        Ok(DownstreamResponse {
            endpoint,
            status,
            body: body.to_vec(),
        })
    }
}
