//! # Key Transformer
//!
//! Converts JSON payloads between the wire convention (snake_case keys, records wrapped
//! under a root key) and the local convention (camelCase keys, bare records).
//!
//! Recasing applies to object keys at every depth, including objects nested inside arrays.
//! Values are never touched.

use crate::inflect::{self, WordSplit};
use serde_json::{Map, Value};

/// Recases every object key from the wire convention to the local convention.
pub fn camelize_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (inflect::camelize(&k), camelize_keys(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(camelize_keys).collect()),
        other => other,
    }
}

/// Recases every object key from the local convention to the wire convention.
///
/// Words are split before uppercase letters and digits (`address2` -> `address_2`).
pub fn decamelize_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| {
                    (
                        inflect::decamelize_with(&k, WordSplit::UppercaseAndDigits),
                        decamelize_keys(v),
                    )
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(decamelize_keys).collect()),
        other => other,
    }
}

/// Where [`unwrap`] found the payload inside a response body.
///
/// Precedence is fixed: the exact root key wins over its singular form, and the whole
/// body is used only when neither is present (or no root key was requested).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadSource {
    /// `body[key]`
    Key,
    /// `body[singular(key)]`, e.g. a single `photo` returned for `photos`.
    SingularKey,
    /// The body itself.
    Body,
}

/// Decides where the payload lives in `body` for the given root key.
///
/// A key mapped to `null` counts as absent.
pub fn locate_payload(body: &Value, key: Option<&str>) -> PayloadSource {
    let Some(key) = key else {
        return PayloadSource::Body;
    };
    let present = |k: &str| body.get(k).is_some_and(|v| !v.is_null());

    if present(key) {
        PayloadSource::Key
    } else if present(&inflect::singular(key)) {
        PayloadSource::SingularKey
    } else {
        PayloadSource::Body
    }
}

fn take_field(body: &mut Value, key: &str) -> Value {
    body.as_object_mut()
        .and_then(|map| map.remove(key))
        .unwrap_or(Value::Null)
}

/// Extracts the payload from a wire body without recasing it.
pub fn extract(mut body: Value, key: Option<&str>) -> Value {
    match (locate_payload(&body, key), key) {
        (PayloadSource::Key, Some(key)) => take_field(&mut body, key),
        (PayloadSource::SingularKey, Some(key)) => take_field(&mut body, &inflect::singular(key)),
        _ => body,
    }
}

/// Extracts the payload from a wire body and recases it to the local convention.
///
/// With `key = None` the whole body is recased.
pub fn unwrap(body: Value, key: Option<&str>) -> Value {
    camelize_keys(extract(body, key))
}

/// Builds the wire form of a record: wrapped under `singular(key)` when a root key is
/// given, then recased to the wire convention.
pub fn wire_body(record: Value, key: Option<&str>) -> Value {
    let wrapped = match key {
        Some(key) => {
            let mut root = Map::new();
            root.insert(inflect::singular(key), record);
            Value::Object(root)
        }
        None => record,
    };
    decamelize_keys(wrapped)
}

/// Encodes a record as a JSON request body (see [`wire_body`]).
pub fn serialize(record: Value, key: Option<&str>) -> Result<String, serde_json::Error> {
    serde_json::to_string(&wire_body(record, key))
}
