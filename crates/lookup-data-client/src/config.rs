//! Data layer client configuration.
//!
//! Reads the data layer base URL and the outbound token source from the
//! environment once, at process start.

use std::sync::Arc;

use url::Url;
use zeroize::Zeroizing;

use crate::metadata::{MetadataServer, DEFAULT_METADATA_HOST};
use crate::token::{IdentityTokenProvider, StaticTokenProvider, TokenError};

/// Configuration for connecting to the data layer.
///
/// Custom `Debug` implementation redacts `static_token`.
#[derive(Clone)]
pub struct DataLayerConfig {
    /// Base URL of the data layer.
    pub base_url: Url,
    /// Audience for outbound identity tokens: the base URL exactly as
    /// configured, minus any trailing slash.
    pub audience: String,
    /// Optional request timeout. `None` waits indefinitely.
    pub timeout_secs: Option<u64>,
    /// Fixed outbound token, for running outside Google Cloud.
    pub static_token: Option<Zeroizing<String>>,
    /// Host (and optional port) of the instance metadata server.
    pub metadata_host: String,
}

impl std::fmt::Debug for DataLayerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataLayerConfig")
            .field("base_url", &self.base_url)
            .field("audience", &self.audience)
            .field("timeout_secs", &self.timeout_secs)
            .field("static_token", &self.static_token.as_ref().map(|_| "[REDACTED]"))
            .field("metadata_host", &self.metadata_host)
            .finish()
    }
}

impl DataLayerConfig {
    /// Build a configuration for `base_url` with metadata-server tokens.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        let trimmed = base_url.trim().trim_end_matches('/');
        let parsed = Url::parse(trimmed)
            .map_err(|e| ConfigError::InvalidUrl("DATA_LAYER_URL".to_string(), e.to_string()))?;
        if parsed.cannot_be_a_base() {
            return Err(ConfigError::InvalidUrl(
                "DATA_LAYER_URL".to_string(),
                "URL cannot carry path segments".to_string(),
            ));
        }

        Ok(Self {
            base_url: parsed,
            audience: trimmed.to_string(),
            timeout_secs: None,
            static_token: None,
            metadata_host: DEFAULT_METADATA_HOST.to_string(),
        })
    }

    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `DATA_LAYER_URL` (required)
    /// - `DATA_LAYER_TOKEN` (optional; fixed outbound token instead of the metadata server)
    /// - `DATA_LAYER_TIMEOUT_SECS` (optional; no timeout when absent)
    /// - `GCE_METADATA_HOST` (default: `metadata.google.internal`)
    pub fn from_env() -> Result<Self, ConfigError> {
        let raw = std::env::var("DATA_LAYER_URL")
            .map_err(|_| ConfigError::MissingVar("DATA_LAYER_URL"))?;
        let mut config = Self::new(&raw)?;

        config.static_token = std::env::var("DATA_LAYER_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty())
            .map(Zeroizing::new);

        config.timeout_secs = match std::env::var("DATA_LAYER_TIMEOUT_SECS") {
            Ok(s) => Some(s.trim().parse().map_err(|_| {
                ConfigError::InvalidNumber("DATA_LAYER_TIMEOUT_SECS".to_string(), s.clone())
            })?),
            Err(_) => None,
        };

        if let Ok(host) = std::env::var("GCE_METADATA_HOST") {
            if !host.trim().is_empty() {
                config.metadata_host = host.trim().to_string();
            }
        }

        Ok(config)
    }

    /// Build the outbound token source this configuration selects.
    pub fn token_provider(&self) -> Result<Arc<dyn IdentityTokenProvider>, TokenError> {
        match &self.static_token {
            Some(token) => Ok(Arc::new(StaticTokenProvider::new(token.as_str()))),
            None => Ok(Arc::new(MetadataServer::new(&self.metadata_host)?)),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    MissingVar(&'static str),
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
    #[error("invalid number for {0}: {1}")]
    InvalidNumber(String, String),
}
