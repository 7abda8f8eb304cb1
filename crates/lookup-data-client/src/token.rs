//! Outbound identity tokens.
//!
//! The data layer only accepts calls carrying an identity token minted for
//! its own URL. [`IdentityTokenProvider`] is the seam between the client and
//! whatever issues those tokens.

use async_trait::async_trait;
use zeroize::Zeroizing;

/// Errors raised while obtaining an outbound token.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// The token endpoint could not be reached.
    #[error("token request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// The token endpoint answered with a non-2xx status.
    #[error("token endpoint returned {status}: {body}")]
    Status { status: u16, body: String },
    /// The token endpoint answered with an empty token.
    #[error("empty token returned for audience {0}")]
    Empty(String),
    /// The token endpoint answered with an unexpected body.
    #[error("malformed token response: {0}")]
    Malformed(String),
    /// The token endpoint URL is invalid.
    #[error("invalid token endpoint URL: {0}")]
    InvalidUrl(String),
}

/// Source of short-lived bearer tokens for a given audience.
#[async_trait]
pub trait IdentityTokenProvider: Send + Sync {
    /// Return a token whose audience is `audience`.
    async fn fetch_identity_token(&self, audience: &str) -> Result<Zeroizing<String>, TokenError>;
}

/// Hands out the same token for every audience.
///
/// For local development against a data layer that does not check
/// audiences. Custom `Debug` redacts the token.
#[derive(Clone)]
pub struct StaticTokenProvider {
    token: Zeroizing<String>,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: Zeroizing::new(token.into()),
        }
    }
}

impl std::fmt::Debug for StaticTokenProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticTokenProvider")
            .field("token", &"[REDACTED]")
            .finish()
    }
}

#[async_trait]
impl IdentityTokenProvider for StaticTokenProvider {
    async fn fetch_identity_token(&self, _audience: &str) -> Result<Zeroizing<String>, TokenError> {
        Ok(self.token.clone())
    }
}
