//! # OpenAPI Specification Assembly
//!
//! One utoipa document per routing mode, served at `/openapi.json`.
//! Handlers are documented under `/lookup-codes`; the served document is
//! rebased onto the configured context root and, when the public service
//! URL was discovered at startup, lists it as the only server.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::openapi::Server;
use utoipa::{Modify, OpenApi};

use crate::config::RoutingMode;
use crate::routes::DOCUMENTED_ROOT;
use crate::state::AppState;

/// Adds the Bearer token security scheme to the OpenAPI spec.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some(
                            "Identity token whose audience is this service.",
                        ))
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Lookup Codes orchestration API",
        version = "0.1.0",
        description = "Validates lookup codes and forwards them to the data layer.\n\nRoutes are scoped to the caller: the `sub` claim of the bearer token selects whose codes are read and written."
    ),
    security(
        ("bearer_auth" = [])
    ),
    paths(
        crate::routes::identity_scoped::list_own_codes,
        crate::routes::identity_scoped::get_own_code,
        crate::routes::identity_scoped::create_own_code,
        crate::routes::identity_scoped::update_own_code,
        crate::routes::identity_scoped::delete_own_code,
        crate::routes::identity_scoped::delete_without_item,
    ),
    components(
        schemas(lookup_core::LookupCode, crate::error::MessageBody)
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "lookup-codes", description = "Lookup codes owned by the authenticated caller")
    )
)]
pub struct IdentityScopedDoc;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Lookup Codes orchestration API",
        version = "0.1.0",
        description = "Validates lookup codes and forwards them to the data layer.\n\nRoutes are scoped by project id: `/{root}/{project_id}/{item_id}`."
    ),
    security(
        ("bearer_auth" = [])
    ),
    paths(
        crate::routes::project_scoped::list_all_codes,
        crate::routes::project_scoped::list_project_codes,
        crate::routes::project_scoped::get_project_code,
        crate::routes::project_scoped::create_project_code,
        crate::routes::project_scoped::update_project_code,
        crate::routes::project_scoped::delete_project_code,
        crate::routes::project_scoped::delete_without_item,
    ),
    components(
        schemas(lookup_core::LookupCode, crate::error::MessageBody)
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "lookup-codes", description = "Lookup codes grouped by project")
    )
)]
pub struct ProjectScopedDoc;

/// Build the document for `mode`, rebased onto `/{context_root}`.
pub fn document(
    mode: RoutingMode,
    context_root: &str,
    service_url: Option<&str>,
) -> utoipa::openapi::OpenApi {
    let mut doc = match mode {
        RoutingMode::Identity => IdentityScopedDoc::openapi(),
        RoutingMode::Project => ProjectScopedDoc::openapi(),
    };

    let root = format!("/{context_root}");
    let paths = std::mem::take(&mut doc.paths.paths);
    doc.paths.paths = paths
        .into_iter()
        .map(|(path, item)| (rebase(&path, &root), item))
        .collect();

    if let Some(url) = service_url {
        doc.servers = Some(vec![Server::new(url)]);
    }
    doc
}

fn rebase(path: &str, root: &str) -> String {
    match path.strip_prefix(DOCUMENTED_ROOT) {
        Some(rest) => format!("{root}{rest}"),
        None => path.to_string(),
    }
}

/// Build the OpenAPI router.
///
/// Serves the OpenAPI JSON spec at `/openapi.json`.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

/// GET /openapi.json: the document for the running configuration.
async fn openapi_json(State(state): State<AppState>) -> Json<utoipa::openapi::OpenApi> {
    Json(document(
        state.routing_mode(),
        state.context_root(),
        state.service_url.as_deref(),
    ))
}
