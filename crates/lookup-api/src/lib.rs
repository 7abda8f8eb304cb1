//! # lookup-api — Orchestration Layer for Lookup Codes
//!
//! A thin HTTP service in front of the lookup codes data layer. It
//! authenticates callers, validates `{code, value}` payloads, forwards each
//! call to the data layer with a freshly minted identity token, and shapes
//! the answer.
//!
//! ## API Surface
//!
//! | Path                 | Module                          | Auth |
//! |----------------------|---------------------------------|------|
//! | `/{root}/*`          | [`routes`] (identity or project)| yes  |
//! | `/health/*`          | this module                     | no   |
//! | `/openapi.json`      | [`openapi`]                     | no   |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → CorsLayer (answers OPTIONS with 200) → AuthMiddleware → Handler
//! ```
//!
//! `OPTIONS` requests never get past the CORS layer, and the auth
//! middleware only wraps the lookup-code routes, so preflights and health
//! probes never need a credential.

pub mod auth;
pub mod config;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod openapi;
pub mod orchestration;
pub mod routes;
pub mod state;

use axum::middleware::from_fn;
use axum::routing::get;
use axum::{Extension, Router};

use crate::auth::AuthConfig;
use crate::error::AppError;
use crate::state::AppState;

/// Assemble the full application router with all routes and middleware.
pub fn app(state: AppState) -> Router {
    let auth_config = AuthConfig {
        verifier: state.verifier.clone(),
    };

    tracing::info!(
        root = %state.context_root(),
        mode = %state.routing_mode(),
        auth_enabled = auth_config.verifier.is_some(),
        "mounting lookup-code routes"
    );

    // Authenticated lookup-code routes.
    let api = routes::router(state.routing_mode(), state.context_root())
        .layer(from_fn(auth::auth_middleware))
        .layer(Extension(auth_config));

    // Unauthenticated probes and documentation.
    let public = Router::new()
        .route("/health/liveness", get(liveness))
        .route("/health/readiness", get(readiness))
        .merge(openapi::router());

    // Layers are added after the fallback so unmatched paths get them too.
    Router::new()
        .merge(public)
        .merge(api)
        .fallback(not_found)
        .with_state(state)
        .layer(middleware::cors::layer())
        .layer(middleware::tracing_layer::layer())
}

/// Liveness probe: always 200 while the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe. Configuration is validated before the router is built,
/// so a running instance is ready.
async fn readiness() -> &'static str {
    "ready"
}

async fn not_found() -> AppError {
    AppError::NotFound
}
