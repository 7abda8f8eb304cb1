//! # Application Configuration
//!
//! Everything the service needs is read from the environment once, in
//! `main`, and handed to [`crate::state::AppState`]. Nothing reads the
//! environment after startup.
//!
//! | Variable         | Meaning                                            | Default        |
//! |------------------|----------------------------------------------------|----------------|
//! | `PORT`           | listen port                                        | `8080`         |
//! | `CONTEXT_ROOT`   | first path segment of every lookup-code route      | `PROJECT_ID`, then `lookup-codes` |
//! | `ROUTING_MODE`   | `identity` or `project`                            | `identity`     |
//! | `AUTH_DISABLED`  | `true` turns inbound verification off              | `false`        |
//! | `AUDIENCE`       | audience inbound tokens must carry                 | required       |
//! | `SECRET_KEY`     | HS256 verification secret                          |                |
//! | `JWKS_URL`       | JWKS endpoint for asymmetric tokens                |                |
//! | `TOKEN_ISSUERS`  | comma-separated accepted `iss` values              | any issuer     |
//!
//! Data-layer variables are documented on
//! [`lookup_data_client::DataLayerConfig::from_env`].

use std::str::FromStr;

use lookup_data_client::DataLayerConfig;
use zeroize::Zeroizing;

/// Context root used when neither `CONTEXT_ROOT` nor `PROJECT_ID` is set.
pub const DEFAULT_CONTEXT_ROOT: &str = "lookup-codes";

/// Path segments owned by the service itself.
const RESERVED_ROOTS: [&str; 2] = ["health", "openapi.json"];

/// How the second path segment is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoutingMode {
    /// `/{root}[/{item}]`, scoped to the caller's `sub` claim.
    #[default]
    Identity,
    /// `/{root}[/{project}[/{item}]]`, scoped by an explicit project id.
    Project,
}

impl RoutingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Identity => "identity",
            Self::Project => "project",
        }
    }
}

impl FromStr for RoutingMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "identity" => Ok(Self::Identity),
            "project" => Ok(Self::Project),
            _ => Err(ConfigError::InvalidValue {
                name: "ROUTING_MODE",
                value: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for RoutingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inbound token verification settings.
///
/// Custom `Debug` implementation redacts `secret_key`.
#[derive(Clone)]
pub struct AuthSettings {
    /// Audience every inbound token must be issued for.
    pub audience: String,
    /// Shared HS256 secret.
    pub secret_key: Option<Zeroizing<String>>,
    /// JWKS endpoint, fetched once at startup.
    pub jwks_url: Option<String>,
    /// Accepted issuers. Empty accepts any issuer.
    pub issuers: Vec<String>,
}

impl std::fmt::Debug for AuthSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSettings")
            .field("audience", &self.audience)
            .field("secret_key", &self.secret_key.as_ref().map(|_| "[REDACTED]"))
            .field("jwks_url", &self.jwks_url)
            .field("issuers", &self.issuers)
            .finish()
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// Route root, without slashes.
    pub context_root: String,
    pub routing_mode: RoutingMode,
    /// `None` when inbound verification is disabled.
    pub auth: Option<AuthSettings>,
    pub data_layer: DataLayerConfig,
}

impl AppConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let data_layer = DataLayerConfig::from_env()?;
        Self::load(|name| std::env::var(name).ok(), data_layer)
    }

    /// Load configuration through `lookup`, which returns the value of an
    /// environment variable by name.
    pub fn load(
        lookup: impl Fn(&str) -> Option<String>,
        data_layer: DataLayerConfig,
    ) -> Result<Self, ConfigError> {
        let var = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let port = match var("PORT") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
                name: "PORT",
                value: raw,
            })?,
            None => 8080,
        };

        let context_root = var("CONTEXT_ROOT")
            .or_else(|| var("PROJECT_ID"))
            .unwrap_or_else(|| DEFAULT_CONTEXT_ROOT.to_string());

        let routing_mode = match var("ROUTING_MODE") {
            Some(raw) => raw.parse()?,
            None => RoutingMode::default(),
        };

        let auth_disabled = match var("AUTH_DISABLED") {
            Some(raw) => parse_bool("AUTH_DISABLED", &raw)?,
            None => false,
        };

        let auth = if auth_disabled {
            None
        } else {
            let audience = var("AUDIENCE").ok_or(ConfigError::MissingVar("AUDIENCE"))?;
            let issuers = var("TOKEN_ISSUERS")
                .map(|raw| {
                    raw.split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(String::from)
                        .collect()
                })
                .unwrap_or_default();
            Some(AuthSettings {
                audience,
                secret_key: var("SECRET_KEY").map(Zeroizing::new),
                jwks_url: var("JWKS_URL"),
                issuers,
            })
        };

        let config = Self {
            port,
            context_root: normalize_root(&context_root),
            routing_mode,
            auth,
            data_layer,
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject combinations that cannot serve requests.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let root = self.context_root.as_str();
        if root.is_empty() || root.contains('/') || RESERVED_ROOTS.contains(&root) {
            return Err(ConfigError::InvalidContextRoot(root.to_string()));
        }

        match &self.auth {
            None if self.routing_mode == RoutingMode::Identity => {
                Err(ConfigError::IdentityWithoutAuth)
            }
            Some(auth) if auth.secret_key.is_none() && auth.jwks_url.is_none() => {
                Err(ConfigError::NoVerificationKey)
            }
            _ => Ok(()),
        }
    }
}

fn normalize_root(raw: &str) -> String {
    raw.trim_matches('/').to_string()
}

fn parse_bool(name: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            name,
            value: raw.to_string(),
        }),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    DataLayer(#[from] lookup_data_client::ConfigError),
    #[error("{0} environment variable is required")]
    MissingVar(&'static str),
    #[error("invalid value for {name}: {value:?}")]
    InvalidValue { name: &'static str, value: String },
    #[error("context root {0:?} must be a single non-reserved path segment")]
    InvalidContextRoot(String),
    #[error("identity routing scopes by the caller's subject and cannot run with AUTH_DISABLED")]
    IdentityWithoutAuth,
    #[error("inbound verification needs SECRET_KEY or JWKS_URL")]
    NoVerificationKey,
}
