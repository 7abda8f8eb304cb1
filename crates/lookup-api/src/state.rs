//! # Application State
//!
//! Shared state for the Axum application, passed to all route handlers via
//! the `State` extractor. Built once in `main` and never mutated: requests
//! share it through cheap clones of `Arc`s and of the reqwest client.

use std::sync::Arc;

use lookup_data_client::DataLayerClient;

use crate::auth::TokenVerifier;
use crate::config::{AppConfig, RoutingMode};

/// Shared application state.
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    /// The only path to the data layer.
    pub data_layer: DataLayerClient,
    /// `None` when inbound verification is disabled.
    pub verifier: Option<Arc<TokenVerifier>>,
    /// Public URL of this service, when it could be discovered.
    pub service_url: Option<String>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        data_layer: DataLayerClient,
        verifier: Option<TokenVerifier>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            data_layer,
            verifier: verifier.map(Arc::new),
            service_url: None,
        }
    }

    /// Record the public service URL advertised in the OpenAPI document.
    pub fn with_service_url(mut self, service_url: Option<String>) -> Self {
        self.service_url = service_url;
        self
    }

    pub fn context_root(&self) -> &str {
        &self.config.context_root
    }

    pub fn routing_mode(&self) -> RoutingMode {
        self.config.routing_mode
    }
}
