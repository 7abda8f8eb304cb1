//! # Request Body Helpers
//!
//! Lookup-code handlers take the raw body as [`Bytes`] instead of
//! `Json<T>`: a missing or unparseable body is not a rejection here but
//! an input to the create/update pipeline, which answers with its own
//! `400` message. Content-Type is not checked.

use axum::body::Bytes;
use serde_json::Value;

/// Parse a request body into JSON.
///
/// Returns `None` for an empty body, a body that is not JSON, and a JSON
/// `null`; all three count as "no data".
pub fn optional_json(body: &Bytes) -> Option<Value> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return None;
    }
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Null) => None,
        Ok(value) => Some(value),
        Err(e) => {
            tracing::debug!(error = %e, "request body is not valid JSON");
            None
        }
    }
}
