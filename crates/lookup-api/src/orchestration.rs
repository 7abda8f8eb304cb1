//! # Orchestration Pipeline
//!
//! The four lookup-code operations, independent of how the route was
//! addressed. Each one follows the same shape:
//!
//! ```text
//! validate payload → resolve data-layer path → DataLayerClient::forward → shape response
//! ```
//!
//! Validation always happens before any data-layer call, so a rejected
//! payload never costs a token fetch.
//!
//! | Operation | Data-layer status | Response                                  |
//! |-----------|-------------------|-------------------------------------------|
//! | read      | any               | 200 + data-layer body                     |
//! | create    | any               | 200 + data-layer body                     |
//! | update    | any               | 200 + data-layer body                     |
//! | delete    | 200               | 200 `{"message": "Item deleted"}`         |
//! | delete    | 404               | 200 `{"message": "Item not found"}`       |
//! | delete    | other             | 500 `{"message": "Error deleting item"}`  |

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use lookup_core::{inject_identifier, DownstreamPath, LookupCode};
use lookup_data_client::{DataLayerClient, DownstreamResponse, Method};
use serde_json::Value;

use crate::auth::CallerIdentity;
use crate::error::{message_response, AppError};

fn subject_of(caller: Option<&CallerIdentity>) -> &str {
    caller.map_or("-", |c| c.subject.as_str())
}

/// Check `data` against the lookup-code schema.
fn validate(data: &Value) -> Result<(), AppError> {
    LookupCode::load(data).map(|_| ()).map_err(|errors| {
        tracing::warn!(%errors, "lookup code failed validation");
        AppError::InvalidData(errors)
    })
}

/// Answer 200 with the data-layer body, whatever status it came with.
fn relay(downstream: &DownstreamResponse) -> Result<Response, AppError> {
    let body = downstream.json()?;
    Ok((StatusCode::OK, Json(body)).into_response())
}

/// Read the collection, a scope, or one item.
#[tracing::instrument(
    name = "lookup_codes.read",
    skip_all,
    fields(path = %path, subject = subject_of(caller))
)]
pub async fn read(
    client: &DataLayerClient,
    caller: Option<&CallerIdentity>,
    path: DownstreamPath,
) -> Result<Response, AppError> {
    let downstream = client.forward(Method::GET, &path, None).await?;
    if !downstream.status.is_success() {
        tracing::warn!(
            status = downstream.status.as_u16(),
            "data layer read was not successful; relaying body with 200"
        );
    }
    relay(&downstream)
}

/// Validate and forward a new lookup code to `path`.
///
/// An absent body fails validation like any other non-object.
#[tracing::instrument(
    name = "lookup_codes.create",
    skip_all,
    fields(path = %path, subject = subject_of(caller))
)]
pub async fn create(
    client: &DataLayerClient,
    caller: Option<&CallerIdentity>,
    path: DownstreamPath,
    payload: Option<Value>,
) -> Result<Response, AppError> {
    let data = payload.unwrap_or(Value::Null);
    validate(&data)?;

    let downstream = client.forward(Method::POST, &path, Some(&data)).await?;
    relay(&downstream)
}

/// Overwrite `code` with the item id from `path`, validate, forward.
#[tracing::instrument(
    name = "lookup_codes.update",
    skip_all,
    fields(path = %path, subject = subject_of(caller))
)]
pub async fn update(
    client: &DataLayerClient,
    caller: Option<&CallerIdentity>,
    path: DownstreamPath,
    payload: Option<Value>,
) -> Result<Response, AppError> {
    let Some(mut data) = payload else {
        tracing::warn!("update request without body");
        return Err(AppError::NoData);
    };
    let item_id = path.item_id().ok_or(AppError::MissingItemId)?;

    // The path wins over whatever code the body carried.
    inject_identifier(&mut data, item_id);
    validate(&data)?;

    let downstream = client.forward(Method::PUT, &path, Some(&data)).await?;
    relay(&downstream)
}

/// Delete one item and translate the data-layer status.
#[tracing::instrument(
    name = "lookup_codes.delete",
    skip_all,
    fields(subject = subject_of(caller))
)]
pub async fn delete(
    client: &DataLayerClient,
    caller: Option<&CallerIdentity>,
    scope: Option<String>,
    item_id: Option<String>,
) -> Result<Response, AppError> {
    let Some(item_id) = item_id.filter(|id| !id.is_empty()) else {
        tracing::warn!("delete request without item id");
        return Err(AppError::MissingItemId);
    };
    let path = DownstreamPath::from_segments(scope, Some(item_id));

    let downstream = client.forward(Method::DELETE, &path, None).await?;
    match downstream.status.as_u16() {
        200 => Ok(message_response(StatusCode::OK, "Item deleted")),
        404 => Ok(message_response(StatusCode::OK, "Item not found")),
        other => Err(AppError::DeleteFailed(other)),
    }
}
