//! # Project-Scoped Routes
//!
//! The first segment after the root names a project, which becomes the
//! data-layer scope. The caller identity (when verification is enabled)
//! is only used for logging.
//!
//! | Inbound                                   | Data layer                        |
//! |-------------------------------------------|-----------------------------------|
//! | `GET    /{root}`                          | `GET    {base}`                   |
//! | `GET    /{root}/:project_id`              | `GET    {base}/{project}`         |
//! | `GET    /{root}/:project_id/:item_id`     | `GET    {base}/{project}/{item}`  |
//! | `POST   /{root}/:project_id`              | `POST   {base}/{project}`         |
//! | `PUT    /{root}/:project_id/:item_id`     | `PUT    {base}/{project}/{item}`  |
//! | `DELETE /{root}/:project_id/:item_id`     | `DELETE {base}/{project}/{item}`  |
//! | `DELETE /{root}/:project_id`              | none; 400 `Item ID is required`   |

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use lookup_core::{DownstreamPath, LookupCode};

use crate::auth::CallerIdentity;
use crate::error::{AppError, MessageBody};
use crate::extractors::optional_json;
use crate::orchestration;
use crate::state::AppState;

pub fn router(root: &str) -> Router<AppState> {
    Router::new()
        .route(&format!("/{root}"), get(list_all_codes))
        .route(
            &format!("/{root}/:project_id"),
            get(list_project_codes)
                .post(create_project_code)
                .delete(delete_without_item),
        )
        .route(
            &format!("/{root}/:project_id/:item_id"),
            get(get_project_code)
                .put(update_project_code)
                .delete(delete_project_code),
        )
}

#[utoipa::path(
    get,
    path = "/lookup-codes",
    responses(
        (status = 200, description = "Whole collection, relayed from the data layer"),
        (status = 401, description = "Missing or invalid bearer token", body = MessageBody),
        (status = 500, description = "Data layer unreachable or token minting failed", body = MessageBody),
    ),
    tag = "lookup-codes"
)]
async fn list_all_codes(
    State(state): State<AppState>,
    caller: Option<CallerIdentity>,
) -> Result<Response, AppError> {
    orchestration::read(&state.data_layer, caller.as_ref(), DownstreamPath::collection()).await
}

#[utoipa::path(
    get,
    path = "/lookup-codes/{project_id}",
    params(("project_id" = String, Path, description = "Project id")),
    responses(
        (status = 200, description = "Project's lookup codes, relayed from the data layer"),
        (status = 401, description = "Missing or invalid bearer token", body = MessageBody),
        (status = 500, description = "Data layer unreachable or token minting failed", body = MessageBody),
    ),
    tag = "lookup-codes"
)]
async fn list_project_codes(
    State(state): State<AppState>,
    caller: Option<CallerIdentity>,
    Path(project_id): Path<String>,
) -> Result<Response, AppError> {
    let path = DownstreamPath::scoped(project_id);
    orchestration::read(&state.data_layer, caller.as_ref(), path).await
}

#[utoipa::path(
    get,
    path = "/lookup-codes/{project_id}/{item_id}",
    params(
        ("project_id" = String, Path, description = "Project id"),
        ("item_id" = String, Path, description = "Lookup code item id"),
    ),
    responses(
        (status = 200, description = "Lookup code, relayed from the data layer"),
        (status = 401, description = "Missing or invalid bearer token", body = MessageBody),
        (status = 500, description = "Data layer unreachable or token minting failed", body = MessageBody),
    ),
    tag = "lookup-codes"
)]
async fn get_project_code(
    State(state): State<AppState>,
    caller: Option<CallerIdentity>,
    Path((project_id, item_id)): Path<(String, String)>,
) -> Result<Response, AppError> {
    let path = DownstreamPath::item(project_id, item_id);
    orchestration::read(&state.data_layer, caller.as_ref(), path).await
}

#[utoipa::path(
    post,
    path = "/lookup-codes/{project_id}",
    params(("project_id" = String, Path, description = "Project id")),
    request_body = LookupCode,
    responses(
        (status = 200, description = "Data layer response to the create"),
        (status = 400, description = "Invalid data provided", body = MessageBody),
        (status = 401, description = "Missing or invalid bearer token", body = MessageBody),
        (status = 500, description = "Data layer unreachable or token minting failed", body = MessageBody),
    ),
    tag = "lookup-codes"
)]
async fn create_project_code(
    State(state): State<AppState>,
    caller: Option<CallerIdentity>,
    Path(project_id): Path<String>,
    body: Bytes,
) -> Result<Response, AppError> {
    let path = DownstreamPath::scoped(project_id);
    orchestration::create(&state.data_layer, caller.as_ref(), path, optional_json(&body)).await
}

#[utoipa::path(
    put,
    path = "/lookup-codes/{project_id}/{item_id}",
    params(
        ("project_id" = String, Path, description = "Project id"),
        ("item_id" = String, Path, description = "Lookup code item id; overwrites `code` in the body"),
    ),
    request_body = LookupCode,
    responses(
        (status = 200, description = "Data layer response to the update"),
        (status = 400, description = "No data provided, or invalid data provided", body = MessageBody),
        (status = 401, description = "Missing or invalid bearer token", body = MessageBody),
        (status = 500, description = "Data layer unreachable or token minting failed", body = MessageBody),
    ),
    tag = "lookup-codes"
)]
async fn update_project_code(
    State(state): State<AppState>,
    caller: Option<CallerIdentity>,
    Path((project_id, item_id)): Path<(String, String)>,
    body: Bytes,
) -> Result<Response, AppError> {
    let path = DownstreamPath::item(project_id, item_id);
    orchestration::update(&state.data_layer, caller.as_ref(), path, optional_json(&body)).await
}

#[utoipa::path(
    delete,
    path = "/lookup-codes/{project_id}/{item_id}",
    params(
        ("project_id" = String, Path, description = "Project id"),
        ("item_id" = String, Path, description = "Lookup code item id"),
    ),
    responses(
        (status = 200, description = "Item deleted, or item not found", body = MessageBody),
        (status = 401, description = "Missing or invalid bearer token", body = MessageBody),
        (status = 500, description = "Error deleting item", body = MessageBody),
    ),
    tag = "lookup-codes"
)]
async fn delete_project_code(
    State(state): State<AppState>,
    caller: Option<CallerIdentity>,
    Path((project_id, item_id)): Path<(String, String)>,
) -> Result<Response, AppError> {
    orchestration::delete(
        &state.data_layer,
        caller.as_ref(),
        Some(project_id),
        Some(item_id),
    )
    .await
}

#[utoipa::path(
    delete,
    path = "/lookup-codes/{project_id}",
    params(("project_id" = String, Path, description = "Project id")),
    responses(
        (status = 400, description = "Item ID is required", body = MessageBody),
        (status = 401, description = "Missing or invalid bearer token", body = MessageBody),
    ),
    tag = "lookup-codes"
)]
async fn delete_without_item(
    State(state): State<AppState>,
    caller: Option<CallerIdentity>,
    Path(project_id): Path<String>,
) -> Result<Response, AppError> {
    orchestration::delete(&state.data_layer, caller.as_ref(), Some(project_id), None).await
}
