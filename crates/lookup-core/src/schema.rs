//! # LookupCode Schema
//!
//! The fixed shape every create and update payload must satisfy before the
//! orchestration layer forwards it downstream:
//!
//! ```text
//! { "code": <non-empty string>, "value": <non-empty string> }
//! ```
//!
//! Validation works on the raw [`serde_json::Value`] rather than on a
//! deserialized struct so that failures are reported per field, and so the
//! caller can forward the exact body it received once it has passed.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// Name of the field that identifies a lookup code. Update requests
/// overwrite it with the item id taken from the request path.
pub const IDENTIFYING_FIELD: &str = "code";

/// Every field the schema accepts. Anything else is rejected.
const FIELDS: [&str; 2] = [IDENTIFYING_FIELD, "value"];

/// Key used for errors that concern the payload as a whole.
const SCHEMA_KEY: &str = "_schema";

const MSG_MISSING: &str = "Missing data for required field.";
const MSG_NULL: &str = "Field may not be null.";
const MSG_NOT_STRING: &str = "Not a valid string.";
const MSG_EMPTY: &str = "Shorter than minimum length 1.";
const MSG_UNKNOWN: &str = "Unknown field.";
const MSG_INVALID_INPUT: &str = "Invalid input type.";

/// A lookup code: the only resource this service manages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LookupCode {
    /// Identifier of the lookup code.
    #[schema(example = "A1")]
    pub code: String,
    /// Payload associated with the code.
    #[schema(example = "hello")]
    pub value: String,
}

impl LookupCode {
    /// Validate a raw JSON payload against the schema.
    ///
    /// Collects every violation instead of stopping at the first one, so the
    /// returned [`SchemaErrors`] can be logged in full.
    pub fn load(data: &Value) -> Result<Self, SchemaErrors> {
        let mut errors = SchemaErrors::default();

        let Some(object) = data.as_object() else {
            errors.push(SCHEMA_KEY, MSG_INVALID_INPUT);
            return Err(errors);
        };

        let mut fields: [Option<&str>; 2] = [None, None];
        for (slot, name) in fields.iter_mut().zip(FIELDS) {
            match object.get(name) {
                None => errors.push(name, MSG_MISSING),
                Some(Value::Null) => errors.push(name, MSG_NULL),
                Some(Value::String(s)) if s.is_empty() => errors.push(name, MSG_EMPTY),
                Some(Value::String(s)) => *slot = Some(s.as_str()),
                Some(_) => errors.push(name, MSG_NOT_STRING),
            }
        }

        for key in object.keys() {
            if !FIELDS.contains(&key.as_str()) {
                errors.push(key, MSG_UNKNOWN);
            }
        }

        match fields {
            [Some(code), Some(value)] if errors.is_empty() => Ok(Self {
                code: code.to_string(),
                value: value.to_string(),
            }),
            _ => Err(errors),
        }
    }
}

/// Overwrite the identifying field of `data` with `item_id`.
///
/// The path-supplied id always wins over whatever the body carried. Payloads
/// that are not JSON objects are left untouched; [`LookupCode::load`]
/// rejects them afterwards.
pub fn inject_identifier(data: &mut Value, item_id: &str) {
    if let Some(object) = data.as_object_mut() {
        object.insert(
            IDENTIFYING_FIELD.to_string(),
            Value::String(item_id.to_string()),
        );
    }
}

/// Field-level validation failures, keyed by field name.
///
/// Payload-wide problems (e.g. a JSON array instead of an object) are filed
/// under `_schema`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SchemaErrors(BTreeMap<String, Vec<String>>);

impl SchemaErrors {
    fn push(&mut self, field: &str, message: &str) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.to_string());
    }

    /// Messages recorded for `field`, if any.
    pub fn field(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// Whether no violation was recorded.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of fields with at least one violation.
    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Display for SchemaErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            first = false;
            write!(f, "{field}: {}", messages.join(" "))?;
        }
        Ok(())
    }
}

impl std::error::Error for SchemaErrors {}
