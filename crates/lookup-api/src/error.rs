//! # API Error Types
//!
//! Every response this service produces on its own (as opposed to relaying
//! a data-layer body) is `{"message": "..."}`. [`AppError`] carries the
//! failure taxonomy and maps each variant to a status and a fixed message.
//! Details of server-side failures are logged, never returned.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use lookup_core::SchemaErrors;
use lookup_data_client::DataLayerError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// JSON body of every service-generated response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MessageBody {
    pub message: String,
}

impl MessageBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Build a `{"message": ...}` response.
pub fn message_response(status: StatusCode, message: &str) -> Response {
    (status, Json(MessageBody::new(message))).into_response()
}

/// Application-level error type that implements [`IntoResponse`] for Axum.
#[derive(Error, Debug)]
pub enum AppError {
    /// Missing or invalid bearer token (401).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Create or update payload failed the lookup-code schema (400).
    #[error("invalid data provided: {0}")]
    InvalidData(SchemaErrors),

    /// Update without a body (400).
    #[error("no data provided")]
    NoData,

    /// Delete without an item id (400).
    #[error("item id is required")]
    MissingItemId,

    /// No route matched (404).
    #[error("not found")]
    NotFound,

    /// Data layer answered a delete with something other than 200 or 404 (500).
    #[error("data layer rejected delete with status {0}")]
    DeleteFailed(u16),

    /// Token, transport or decoding failure talking to the data layer (500).
    #[error("data layer call failed: {0}")]
    DataLayer(#[from] DataLayerError),
}

impl AppError {
    /// Return the HTTP status code and the client-facing message.
    fn status_and_message(&self) -> (StatusCode, &'static str) {
        match self {
            Self::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "Unauthorized"),
            Self::InvalidData(_) => (StatusCode::BAD_REQUEST, "Invalid data provided"),
            Self::NoData => (StatusCode::BAD_REQUEST, "No data provided"),
            Self::MissingItemId => (StatusCode::BAD_REQUEST, "Item ID is required"),
            Self::NotFound => (StatusCode::NOT_FOUND, "Not found"),
            Self::DeleteFailed(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Error deleting item"),
            Self::DataLayer(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        message_response(status, message)
    }
}
