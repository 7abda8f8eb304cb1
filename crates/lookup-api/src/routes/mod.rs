//! # Lookup-Code Routes
//!
//! Two addressing schemes over the same pipeline; `ROUTING_MODE` picks one
//! at startup.
//!
//! | Scheme                | Routes (under `/{root}`)                        | Scope          |
//! |-----------------------|-------------------------------------------------|----------------|
//! | [`identity_scoped`]   | `/`, `/:item_id`                                | caller's `sub` |
//! | [`project_scoped`]    | `/`, `/:project_id`, `/:project_id/:item_id`    | path segment   |
//!
//! Every route in here sits behind the auth middleware.

pub mod identity_scoped;
pub mod project_scoped;

use axum::Router;

use crate::config::RoutingMode;
use crate::state::AppState;

/// Build the lookup-code router for `mode`, mounted at `/{root}`.
pub fn router(mode: RoutingMode, root: &str) -> Router<AppState> {
    match mode {
        RoutingMode::Identity => identity_scoped::router(root),
        RoutingMode::Project => project_scoped::router(root),
    }
}

/// Root segment the handlers are documented under. The served OpenAPI
/// document swaps it for the configured context root.
pub const DOCUMENTED_ROOT: &str = "/lookup-codes";
