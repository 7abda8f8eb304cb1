//! Client for the Google Compute instance metadata server.
//!
//! On Cloud Run the metadata server mints tokens for the service account
//! the revision runs as:
//!
//! | Path (relative to `/computeMetadata/v1`)        | Returns              |
//! |-------------------------------------------------|----------------------|
//! | `instance/service-accounts/default/identity`    | OIDC identity token  |
//! | `instance/service-accounts/default/token`       | OAuth2 access token  |
//!
//! Every request must carry `Metadata-Flavor: Google`.

use async_trait::async_trait;
use serde::Deserialize;
use url::Url;
use zeroize::Zeroizing;

use crate::token::{IdentityTokenProvider, TokenError};

/// Default metadata server host, overridable with `GCE_METADATA_HOST`.
pub const DEFAULT_METADATA_HOST: &str = "metadata.google.internal";

const IDENTITY_PATH: &str = "computeMetadata/v1/instance/service-accounts/default/identity";
const ACCESS_TOKEN_PATH: &str = "computeMetadata/v1/instance/service-accounts/default/token";

#[derive(Deserialize)]
struct AccessTokenResponse {
    access_token: String,
}

/// Metadata server client.
#[derive(Debug, Clone)]
pub struct MetadataServer {
    http: reqwest::Client,
    base_url: Url,
}

impl MetadataServer {
    /// Create a client for the metadata server at `host` (`host[:port]`).
    pub fn new(host: &str) -> Result<Self, TokenError> {
        let base_url = Url::parse(&format!("http://{host}/"))
            .map_err(|e| TokenError::InvalidUrl(format!("{host}: {e}")))?;
        Ok(Self::from_url(base_url))
    }

    /// Create a client for an explicit metadata server base URL.
    pub fn from_url(base_url: Url) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    /// Fetch an identity token for `audience`.
    ///
    /// Calls `GET {base}/computeMetadata/v1/instance/service-accounts/default/identity?audience={audience}`.
    pub async fn identity_token(&self, audience: &str) -> Result<Zeroizing<String>, TokenError> {
        let mut url = self.endpoint(IDENTITY_PATH)?;
        url.query_pairs_mut().append_pair("audience", audience);

        let body = self.get_text(url).await?;
        let token = body.trim();
        if token.is_empty() {
            return Err(TokenError::Empty(audience.to_string()));
        }
        Ok(Zeroizing::new(token.to_string()))
    }

    /// Fetch an OAuth2 access token for the default service account.
    ///
    /// Calls `GET {base}/computeMetadata/v1/instance/service-accounts/default/token`.
    pub async fn access_token(&self) -> Result<Zeroizing<String>, TokenError> {
        let url = self.endpoint(ACCESS_TOKEN_PATH)?;
        let body = self.get_text(url).await?;
        let parsed: AccessTokenResponse =
            serde_json::from_str(&body).map_err(|e| TokenError::Malformed(e.to_string()))?;
        Ok(Zeroizing::new(parsed.access_token))
    }

    fn endpoint(&self, path: &str) -> Result<Url, TokenError> {
        self.base_url
            .join(path)
            .map_err(|e| TokenError::InvalidUrl(e.to_string()))
    }

    async fn get_text(&self, url: Url) -> Result<String, TokenError> {
        let resp = self
            .http
            .get(url)
            .header("Metadata-Flavor", "Google")
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(TokenError::Status { status, body });
        }

        Ok(resp.text().await?)
    }
}

#[async_trait]
impl IdentityTokenProvider for MetadataServer {
    async fn fetch_identity_token(&self, audience: &str) -> Result<Zeroizing<String>, TokenError> {
        self.identity_token(audience).await
    }
}
