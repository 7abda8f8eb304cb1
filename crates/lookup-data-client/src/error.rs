//! Data layer client error types.

/// Errors from data layer calls.
///
/// A non-2xx status is NOT an error here: the response is returned to the
/// caller, which decides how to present it.
#[derive(Debug, thiserror::Error)]
pub enum DataLayerError {
    /// The outbound identity token could not be obtained.
    #[error("failed to obtain outbound identity token: {0}")]
    Token(#[from] crate::token::TokenError),
    /// The downstream path could not be resolved against the base URL.
    #[error("invalid downstream path: {0}")]
    Path(#[from] lookup_core::PathError),
    /// HTTP transport error.
    #[error("HTTP error calling {endpoint}: {source}")]
    Http {
        endpoint: String,
        source: reqwest::Error,
    },
    /// Response body was not valid JSON.
    #[error("failed to deserialize response from {endpoint}: {source}")]
    Deserialization {
        endpoint: String,
        source: serde_json::Error,
    },
}
