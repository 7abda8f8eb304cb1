//! Cloud Run self-discovery.
//!
//! Looks up the public URL of the running Cloud Run service through the
//! Cloud Run Admin API (Knative serving v1):
//!
//! ```text
//! GET https://{region}-run.googleapis.com/apis/serving.knative.dev/v1/namespaces/{project}/services/{service}
//! ```
//!
//! The response's `status.url` is the service URL. Authentication uses an
//! access token from the metadata server. This runs once, at startup, and
//! only when explicitly requested.

use serde::Deserialize;
use url::Url;

use crate::metadata::MetadataServer;
use crate::token::TokenError;

/// Identifies a Cloud Run service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloudRunService {
    pub project_id: String,
    pub region: String,
    pub service: String,
}

impl CloudRunService {
    /// Read `PROJECT_ID`, `REGION` and `K_SERVICE`. Returns `None` unless
    /// all three are set and non-empty.
    pub fn from_env() -> Option<Self> {
        let var = |name: &str| {
            std::env::var(name)
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        Some(Self {
            project_id: var("PROJECT_ID")?,
            region: var("REGION")?,
            service: var("K_SERVICE")?,
        })
    }

    /// Regional Admin API endpoint for this service.
    pub fn admin_api_base(&self) -> Result<Url, DiscoveryError> {
        Url::parse(&format!("https://{}-run.googleapis.com/", self.region))
            .map_err(|e| DiscoveryError::InvalidUrl(e.to_string()))
    }

    fn service_url(&self, api_base: &Url) -> Result<Url, DiscoveryError> {
        let mut url = api_base.clone();
        url.path_segments_mut()
            .map_err(|()| DiscoveryError::InvalidUrl(api_base.to_string()))?
            .pop_if_empty()
            .extend([
                "apis",
                "serving.knative.dev",
                "v1",
                "namespaces",
                self.project_id.as_str(),
                "services",
                self.service.as_str(),
            ]);
        Ok(url)
    }
}

/// Errors from service URL discovery.
#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    #[error("could not obtain access token: {0}")]
    Token(#[from] TokenError),
    #[error("Cloud Run Admin API request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Cloud Run Admin API returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Cloud Run service has no status.url")]
    MissingUrl,
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

#[derive(Deserialize)]
struct ServiceResource {
    #[serde(default)]
    status: Option<ServiceStatus>,
}

#[derive(Deserialize)]
struct ServiceStatus {
    #[serde(default)]
    url: Option<String>,
}

/// Resolve the public URL of `service`.
///
/// `api_base` is normally [`CloudRunService::admin_api_base`].
pub async fn resolve_service_url(
    metadata: &MetadataServer,
    service: &CloudRunService,
    api_base: &Url,
) -> Result<String, DiscoveryError> {
    let access_token = metadata.access_token().await?;
    let url = service.service_url(api_base)?;

    let resp = reqwest::Client::new()
        .get(url)
        .bearer_auth(access_token.as_str())
        .send()
        .await?;

    if !resp.status().is_success() {
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        return Err(DiscoveryError::Status { status, body });
    }

    let resource: ServiceResource = resp.json().await?;
    resource
        .status
        .and_then(|s| s.url)
        .filter(|u| !u.is_empty())
        .ok_or(DiscoveryError::MissingUrl)
}
