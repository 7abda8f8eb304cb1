//! # Inbound Authentication
//!
//! Bearer-JWT middleware in front of every lookup-code route.
//!
//! ```text
//! Authorization: Bearer <jwt>
//! ```
//!
//! Tokens are verified with `jsonwebtoken` against either a shared HS256
//! secret or a JWKS fetched at startup and re-fetched when a token names an
//! unknown key id. The audience must equal the
//! configured `AUDIENCE`; `exp` and `sub` are required; issuers are checked
//! when `TOKEN_ISSUERS` is set.
//!
//! ## CallerIdentity
//!
//! A verified token becomes a [`CallerIdentity`] in the request extensions.
//! Handlers extract it via the `FromRequestParts` impl.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::Request;
use axum::http::request::Parts;
use axum::http::{header, HeaderMap};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{Algorithm, DecodingKey, Header, Validation};
use parking_lot::RwLock;
use serde_json::{Map, Value};
use tokio::sync::Mutex;

use crate::error::AppError;

const SHARED_SECRET_ALGORITHMS: [Algorithm; 3] =
    [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

const PUBLIC_KEY_ALGORITHMS: [Algorithm; 9] = [
    Algorithm::RS256,
    Algorithm::RS384,
    Algorithm::RS512,
    Algorithm::PS256,
    Algorithm::PS384,
    Algorithm::PS512,
    Algorithm::ES256,
    Algorithm::ES384,
    Algorithm::EdDSA,
];

// ── CallerIdentity ──────────────────────────────────────────────────────────

/// Verified claims of the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct CallerIdentity {
    /// The `sub` claim. Scopes data-layer paths in identity routing.
    pub subject: String,
    /// Full claim set, as issued.
    pub claims: Map<String, Value>,
}

/// Extracts the identity the auth middleware injected into extensions.
/// Returns 401 if none is present.
#[axum::async_trait]
impl<S: Send + Sync> axum::extract::FromRequestParts<S> for CallerIdentity {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CallerIdentity>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("no caller identity in request context".into()))
    }
}

// ── Errors ──────────────────────────────────────────────────────────────────

/// Why a request was not authenticated. Logged, never returned.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("missing authorization header")]
    MissingHeader,
    #[error("authorization header must use Bearer scheme")]
    NotBearer,
    #[error("empty bearer token")]
    EmptyToken,
    #[error("token rejected: {0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),
    #[error("algorithm {0:?} is not accepted for the configured keys")]
    UnsupportedAlgorithm(Algorithm),
    #[error("no verification key matches kid {0:?}")]
    UnknownKey(Option<String>),
    #[error("token has no subject")]
    MissingSubject,
}

/// Failures loading a JWKS.
#[derive(Debug, thiserror::Error)]
pub enum JwksError {
    #[error("JWKS request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("JWKS endpoint returned {0}")]
    Status(u16),
    #[error("JWKS contains no usable signing keys")]
    Empty,
}

// ── Verifier ────────────────────────────────────────────────────────────────

/// Minimum time between two JWKS fetches triggered by unknown key ids.
pub const DEFAULT_JWKS_REFRESH_INTERVAL: Duration = Duration::from_secs(60);

struct KeySetEntry {
    kid: Option<String>,
    key: DecodingKey,
}

/// Keys of a remote JWKS, re-fetched when a token names a key id the
/// cached set does not hold. Fetches are at most one per `min_interval`.
///
/// `entries` is a `parking_lot` lock, never held across `.await`. The
/// fetch gate is a `tokio` mutex so concurrent misses wait for one fetch.
struct JwksCache {
    url: String,
    entries: RwLock<Vec<KeySetEntry>>,
    last_fetch: Mutex<Instant>,
    min_interval: Duration,
}

impl JwksCache {
    /// The key for `kid`; without a kid, the set's only key.
    fn lookup(&self, kid: Option<&str>) -> Option<DecodingKey> {
        let entries = self.entries.read();
        match (kid, entries.as_slice()) {
            (Some(kid), _) => entries
                .iter()
                .find(|e| e.kid.as_deref() == Some(kid))
                .map(|e| e.key.clone()),
            (None, [only]) => Some(only.key.clone()),
            (None, _) => None,
        }
    }

    fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Re-fetch the key set unless the last fetch is too recent. A failed
    /// fetch keeps the current keys.
    async fn refresh(&self) {
        let mut last_fetch = self.last_fetch.lock().await;
        if last_fetch.elapsed() < self.min_interval {
            return;
        }
        *last_fetch = Instant::now();

        match fetch_jwks(&self.url).await.and_then(|jwks| decode_key_set(&jwks)) {
            Ok(entries) => {
                tracing::info!(url = %self.url, keys = entries.len(), "Refreshed JWKS");
                *self.entries.write() = entries;
            }
            Err(e) => {
                tracing::warn!(url = %self.url, error = %e, "JWKS refresh failed; keeping cached keys");
            }
        }
    }
}

enum VerificationKeys {
    Shared(DecodingKey),
    KeySet(JwksCache),
}

/// Verifies inbound bearer tokens.
pub struct TokenVerifier {
    audience: String,
    issuers: Vec<String>,
    keys: VerificationKeys,
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let keys = match &self.keys {
            VerificationKeys::Shared(_) => "shared secret [REDACTED]".to_string(),
            VerificationKeys::KeySet(cache) => format!("{} JWKS keys from {}", cache.len(), cache.url),
        };
        f.debug_struct("TokenVerifier")
            .field("audience", &self.audience)
            .field("issuers", &self.issuers)
            .field("keys", &keys)
            .finish()
    }
}

impl TokenVerifier {
    /// Verify HMAC-signed tokens with a shared secret.
    pub fn from_secret(secret: &[u8], audience: impl Into<String>) -> Self {
        Self {
            audience: audience.into(),
            issuers: Vec::new(),
            keys: VerificationKeys::Shared(DecodingKey::from_secret(secret)),
        }
    }

    /// Verify asymmetric tokens against the JWKS at `url`.
    ///
    /// The set is fetched now and must hold at least one usable key. Later,
    /// a token signed with an unknown key id triggers a re-fetch, so keys
    /// rotated in by the issuer are picked up without a restart.
    pub async fn from_jwks_url(
        url: impl Into<String>,
        audience: impl Into<String>,
    ) -> Result<Self, JwksError> {
        let url = url.into();
        let entries = decode_key_set(&fetch_jwks(&url).await?)?;
        tracing::info!(%url, keys = entries.len(), "Loaded JWKS");

        Ok(Self {
            audience: audience.into(),
            issuers: Vec::new(),
            keys: VerificationKeys::KeySet(JwksCache {
                url,
                entries: RwLock::new(entries),
                last_fetch: Mutex::new(Instant::now()),
                min_interval: DEFAULT_JWKS_REFRESH_INTERVAL,
            }),
        })
    }

    /// Only accept tokens from these issuers. Empty accepts any issuer.
    pub fn with_issuers(mut self, issuers: Vec<String>) -> Self {
        self.issuers = issuers;
        self
    }

    /// Minimum time between JWKS re-fetches. No effect on a shared secret.
    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        if let VerificationKeys::KeySet(cache) = &mut self.keys {
            cache.min_interval = interval;
        }
        self
    }

    /// Verify a raw JWT and return the caller it identifies.
    pub async fn verify(&self, token: &str) -> Result<CallerIdentity, AuthError> {
        let header = jsonwebtoken::decode_header(token)?;
        let key = self.key_for(&header).await?;

        let mut validation = Validation::new(header.alg);
        validation.set_audience(&[&self.audience]);
        validation.set_required_spec_claims(&["exp", "aud", "sub"]);
        if !self.issuers.is_empty() {
            validation.set_issuer(self.issuers.as_slice());
        }

        let data = jsonwebtoken::decode::<Map<String, Value>>(token, &key, &validation)?;
        let subject = data
            .claims
            .get("sub")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .ok_or(AuthError::MissingSubject)?
            .to_string();

        Ok(CallerIdentity {
            subject,
            claims: data.claims,
        })
    }

    async fn key_for(&self, header: &Header) -> Result<DecodingKey, AuthError> {
        match &self.keys {
            VerificationKeys::Shared(key) => {
                if SHARED_SECRET_ALGORITHMS.contains(&header.alg) {
                    Ok(key.clone())
                } else {
                    Err(AuthError::UnsupportedAlgorithm(header.alg))
                }
            }
            VerificationKeys::KeySet(cache) => {
                if !PUBLIC_KEY_ALGORITHMS.contains(&header.alg) {
                    return Err(AuthError::UnsupportedAlgorithm(header.alg));
                }
                let kid = header.kid.as_deref();
                if let Some(key) = cache.lookup(kid) {
                    return Ok(key);
                }
                cache.refresh().await;
                cache
                    .lookup(kid)
                    .ok_or_else(|| AuthError::UnknownKey(header.kid.clone()))
            }
        }
    }
}

/// Keys `jsonwebtoken` cannot load are skipped with a warning.
fn decode_key_set(jwks: &JwkSet) -> Result<Vec<KeySetEntry>, JwksError> {
    let entries: Vec<KeySetEntry> = jwks
        .keys
        .iter()
        .filter_map(|jwk| match DecodingKey::from_jwk(jwk) {
            Ok(key) => Some(KeySetEntry {
                kid: jwk.common.key_id.clone(),
                key,
            }),
            Err(e) => {
                tracing::warn!(kid = ?jwk.common.key_id, error = %e, "skipping unusable JWK");
                None
            }
        })
        .collect();

    if entries.is_empty() {
        return Err(JwksError::Empty);
    }
    Ok(entries)
}

async fn fetch_jwks(url: &str) -> Result<JwkSet, JwksError> {
    let resp = reqwest::get(url).await?;
    if !resp.status().is_success() {
        return Err(JwksError::Status(resp.status().as_u16()));
    }
    Ok(resp.json::<JwkSet>().await?)
}

// ── Header parsing ──────────────────────────────────────────────────────────

/// Extract the token from `Authorization: Bearer <token>`.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingHeader)?
        .to_str()
        .map_err(|_| AuthError::NotBearer)?;
    let token = value
        .strip_prefix("Bearer ")
        .ok_or(AuthError::NotBearer)?
        .trim();
    if token.is_empty() {
        return Err(AuthError::EmptyToken);
    }
    Ok(token)
}

/// Authenticate a request from its headers.
pub async fn authenticate(
    verifier: &TokenVerifier,
    headers: &HeaderMap,
) -> Result<CallerIdentity, AuthError> {
    verifier.verify(bearer_token(headers)?).await
}

// ── Auth Configuration ──────────────────────────────────────────────────────

/// Auth configuration injected into request extensions.
///
/// `verifier: None` means inbound verification is disabled.
#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
    pub verifier: Option<Arc<TokenVerifier>>,
}

// ── Middleware ───────────────────────────────────────────────────────────────

/// Verify the bearer token and inject [`CallerIdentity`] for handlers.
///
/// Any failure answers `401 {"message": "Unauthorized"}` before the handler
/// runs. With verification disabled the request passes through without an
/// identity.
pub async fn auth_middleware(mut request: Request, next: Next) -> Response {
    let verifier = request
        .extensions()
        .get::<AuthConfig>()
        .and_then(|config| config.verifier.clone());

    let Some(verifier) = verifier else {
        return next.run(request).await;
    };

    match authenticate(&verifier, request.headers()).await {
        Ok(identity) => {
            tracing::debug!(subject = %identity.subject, "caller authenticated");
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
        Err(reason) => {
            tracing::warn!(%reason, "authentication failed");
            AppError::Unauthorized(reason.to_string()).into_response()
        }
    }
}
