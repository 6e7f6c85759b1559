//! # Validation Error Normalizer
//!
//! Servers report failed validations (HTTP 422) as a mapping from field path to a list of
//! messages:
//!
//! ```json
//! { "errors": { "photo.some_attr": ["is bs", "is too short"] } }
//! ```
//!
//! Form layers want one message per field, so this module flattens that into
//! `{ "photo.someAttr": "is bs, is too short" }`.

use crate::{inflect, keys};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Root key the wire error body is wrapped under.
pub const ERRORS_KEY: &str = "errors";

/// Separator placed between messages for the same field.
pub const MESSAGE_SEPARATOR: &str = ", ";

/// Normalized validation errors: field path -> joined message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, String>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Message for a field path, e.g. `"photo.someAttr"`.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn into_inner(self) -> BTreeMap<String, String> {
        self.0
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (field, message)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{field} {message}")?;
        }
        Ok(())
    }
}

impl<const N: usize> From<[(&str, &str); N]> for ValidationErrors {
    fn from(entries: [(&str, &str); N]) -> Self {
        normalize(
            entries
                .into_iter()
                .map(|(field, message)| (field.to_string(), vec![message.to_string()])),
        )
    }
}

/// Joins each field's messages with [`MESSAGE_SEPARATOR`].
///
/// If a field path appears more than once, the first occurrence wins.
pub fn normalize<I>(entries: I) -> ValidationErrors
where
    I: IntoIterator<Item = (String, Vec<String>)>,
{
    let mut normalized = BTreeMap::new();
    for (field, messages) in entries {
        normalized
            .entry(field)
            .or_insert_with(|| messages.join(MESSAGE_SEPARATOR));
    }
    ValidationErrors(normalized)
}

fn messages_of(value: Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.into_iter().flat_map(messages_of).collect(),
        Value::String(s) => vec![s],
        Value::Null => Vec::new(),
        other => vec![other.to_string()],
    }
}

/// Normalizes a wire error body.
///
/// The body is unwrapped from its `errors` root key (falling back to the whole body) and
/// field paths are recased to the local convention. Paths that recase to the same name
/// go through [`normalize`] in wire order, so the first one wins.
pub fn from_wire(body: Value) -> ValidationErrors {
    match keys::extract(body, Some(ERRORS_KEY)) {
        Value::Object(fields) => normalize(
            fields
                .into_iter()
                .map(|(field, value)| (inflect::camelize(&field), messages_of(value))),
        ),
        _ => ValidationErrors::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_wire_single_message() {
        let errors = from_wire(json!({ "errors": { "photo.someAttr": ["is bs"] } }));
        assert_eq!(errors, ValidationErrors::from([("photo.someAttr", "is bs")]));
    }

    #[test]
    fn test_from_wire_joins_messages_and_recases_paths() {
        let errors = from_wire(json!({
            "errors": {
                "photo.some_attr": ["is bs", "is too short"],
                "title": ["can't be blank"]
            }
        }));
        assert_eq!(errors.get("photo.someAttr"), Some("is bs, is too short"));
        assert_eq!(errors.get("title"), Some("can't be blank"));
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_from_wire_unwrapped_body() {
        let errors = from_wire(json!({ "name": ["is taken"] }));
        assert_eq!(errors.get("name"), Some("is taken"));
    }

    #[test]
    fn test_from_wire_non_object_is_empty() {
        assert!(from_wire(json!({ "errors": ["nope"] })).is_empty());
        assert!(from_wire(json!("boom")).is_empty());
    }

    #[test]
    fn test_from_wire_colliding_paths_keep_first() {
        let errors = from_wire(json!({
            "errors": {
                "photo.someAttr": ["first"],
                "photo.some_attr": ["second"],
            }
        }));
        assert_eq!(errors.get("photo.someAttr"), Some("first"));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_normalize_first_occurrence_wins() {
        let errors = normalize(vec![
            ("name".to_string(), vec!["is taken".to_string()]),
            ("name".to_string(), vec!["is too long".to_string()]),
        ]);
        assert_eq!(errors.get("name"), Some("is taken"));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_serializes_as_flat_map() {
        let errors = ValidationErrors::from([("photo.someAttr", "is bs")]);
        assert_eq!(serde_json::to_value(&errors).unwrap(), json!({ "photo.someAttr": "is bs" }));
        assert_eq!(errors.to_string(), "photo.someAttr is bs");
    }
}
