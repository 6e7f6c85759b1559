//! # CRUD Synchronization
//!
//! The operations that keep a local collection in step with a REST resource:
//! [`CrudDispatcher::fetch`], [`CrudDispatcher::create`], [`CrudDispatcher::update`] and
//! [`CrudDispatcher::destroy`]. Each one emits its transitions to a [`Dispatch`] sink and
//! returns the outcome to the caller.

mod dispatch;
mod dispatcher;
mod error;
mod options;
mod transition;

pub use dispatch::Dispatch;
pub use dispatcher::CrudDispatcher;
pub use error::CrudError;
pub use options::{default_path, resolve_path, FetchOptions, RootKey, WriteOptions};
pub use transition::{
    transition_types_for, Operation, Phase, Transition, TransitionCreators, TransitionKind,
    TransitionRecord, TransitionTypes,
};

use serde_json::Value;
use tracing::warn;

/// A record in the local convention: camelCase keys, not wrapped under a root key.
pub type Record = serde_json::Map<String, Value>;

/// Field holding a record's identity.
pub const ID_FIELD: &str = "id";

/// String form of a record's id, as used for item keys. `None` when missing or null.
pub fn record_key(record: &Record) -> Option<String> {
    match record.get(ID_FIELD)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Turns an unwrapped fetch payload into records. A single object counts as a list of one.
pub fn into_records(payload: Value) -> Vec<Record> {
    match payload {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::Object(record) => Some(record),
                other => {
                    warn!(item = %other, "Dropping non-record item");
                    None
                }
            })
            .collect(),
        Value::Object(record) => vec![record],
        Value::Null => Vec::new(),
        other => {
            warn!(payload = %other, "Payload is not a record list");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_record_key() {
        assert_eq!(record_key(&record(json!({ "id": 1 }))), Some("1".into()));
        assert_eq!(record_key(&record(json!({ "id": "abc" }))), Some("abc".into()));
        assert_eq!(record_key(&record(json!({ "id": null }))), None);
        assert_eq!(record_key(&record(json!({ "a": 1 }))), None);
    }

    #[test]
    fn test_into_records() {
        assert_eq!(into_records(json!([{ "id": 1 }, 5, { "id": 2 }])).len(), 2);
        assert_eq!(into_records(json!({ "id": 1 })), vec![record(json!({ "id": 1 }))]);
        assert!(into_records(Value::Null).is_empty());
        assert!(into_records(json!("nope")).is_empty());
    }
}
