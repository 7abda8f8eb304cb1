//! # Identity-Scoped Routes
//!
//! The caller's `sub` claim is the scope, so every caller sees only their
//! own lookup codes:
//!
//! | Inbound                      | Data layer                   |
//! |------------------------------|------------------------------|
//! | `GET    /{root}`             | `GET    {base}/{sub}`        |
//! | `GET    /{root}/:item_id`    | `GET    {base}/{sub}/{item}` |
//! | `POST   /{root}`             | `POST   {base}/{sub}`        |
//! | `PUT    /{root}/:item_id`    | `PUT    {base}/{sub}/{item}` |
//! | `DELETE /{root}/:item_id`    | `DELETE {base}/{sub}/{item}` |
//! | `DELETE /{root}`             | none; 400 `Item ID is required` |

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
        .route(
            &format!("/{root}"),
            get(list_own_codes)
                .post(create_own_code)
                .delete(delete_without_item),
        )
        .route(
            &format!("/{root}/:item_id"),
            get(get_own_code)
                .put(update_own_code)
                .delete(delete_own_code),
        )
}

#[utoipa::path(
    get,
    path = "/lookup-codes",
    responses(
        (status = 200, description = "Caller's lookup codes, relayed from the data layer"),
        (status = 401, description = "Missing or invalid bearer token", body = MessageBody),
        (status = 500, description = "Data layer unreachable or token minting failed", body = MessageBody),
    ),
    tag = "lookup-codes"
)]
async fn list_own_codes(
    State(state): State<AppState>,
    caller: CallerIdentity,
) -> Result<Response, AppError> {
    let path = DownstreamPath::scoped(caller.subject.as_str());
    orchestration::read(&state.data_layer, Some(&caller), path).await
}

#[utoipa::path(
    get,
    path = "/lookup-codes/{item_id}",
    params(("item_id" = String, Path, description = "Lookup code item id")),
    responses(
        (status = 200, description = "Lookup code, relayed from the data layer"),
        (status = 401, description = "Missing or invalid bearer token", body = MessageBody),
        (status = 500, description = "Data layer unreachable or token minting failed", body = MessageBody),
    ),
    tag = "lookup-codes"
)]
async fn get_own_code(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(item_id): Path<String>,
) -> Result<Response, AppError> {
    let path = DownstreamPath::item(caller.subject.as_str(), item_id);
    orchestration::read(&state.data_layer, Some(&caller), path).await
}

#[utoipa::path(
    post,
    path = "/lookup-codes",
    request_body = LookupCode,
    responses(
        (status = 200, description = "Data layer response to the create"),
        (status = 400, description = "Invalid data provided", body = MessageBody),
        (status = 401, description = "Missing or invalid bearer token", body = MessageBody),
        (status = 500, description = "Data layer unreachable or token minting failed", body = MessageBody),
    ),
    tag = "lookup-codes"
)]
async fn create_own_code(
    State(state): State<AppState>,
    caller: CallerIdentity,
    body: Bytes,
) -> Result<Response, AppError> {
    let path = DownstreamPath::scoped(caller.subject.as_str());
    orchestration::create(&state.data_layer, Some(&caller), path, optional_json(&body)).await
}

#[utoipa::path(
    put,
    path = "/lookup-codes/{item_id}",
    params(("item_id" = String, Path, description = "Lookup code item id; overwrites `code` in the body")),
    request_body = LookupCode,
    responses(
        (status = 200, description = "Data layer response to the update"),
        (status = 400, description = "No data provided, or invalid data provided", body = MessageBody),
        (status = 401, description = "Missing or invalid bearer token", body = MessageBody),
        (status = 500, description = "Data layer unreachable or token minting failed", body = MessageBody),
    ),
    tag = "lookup-codes"
)]
async fn update_own_code(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(item_id): Path<String>,
    body: Bytes,
) -> Result<Response, AppError> {
    let path = DownstreamPath::item(caller.subject.as_str(), item_id);
    orchestration::update(&state.data_layer, Some(&caller), path, optional_json(&body)).await
}

#[utoipa::path(
    delete,
    path = "/lookup-codes/{item_id}",
    params(("item_id" = String, Path, description = "Lookup code item id")),
    responses(
        (status = 200, description = "Item deleted, or item not found", body = MessageBody),
        (status = 401, description = "Missing or invalid bearer token", body = MessageBody),
        (status = 500, description = "Error deleting item", body = MessageBody),
    ),
    tag = "lookup-codes"
)]
async fn delete_own_code(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(item_id): Path<String>,
) -> Result<Response, AppError> {
    let scope = caller.subject.clone();
    orchestration::delete(&state.data_layer, Some(&caller), Some(scope), Some(item_id)).await
}

#[utoipa::path(
    delete,
    path = "/lookup-codes",
    responses(
        (status = 400, description = "Item ID is required", body = MessageBody),
        (status = 401, description = "Missing or invalid bearer token", body = MessageBody),
    ),
    tag = "lookup-codes"
)]
async fn delete_without_item(
    State(state): State<AppState>,
    caller: CallerIdentity,
) -> Result<Response, AppError> {
    let scope = caller.subject.clone();
    orchestration::delete(&state.data_layer, Some(&caller), Some(scope), None).await
}
