//! # Resource State Reducer
//!
//! Folds transitions into a per-resource state: fetch metadata plus the collection of
//! records keyed by id.
//!
//! Only fetch transitions touch [`Meta`]. Item changes are handled by [`items_reducer`],
//! which also tracks optimistic operations that are still waiting for the server.

use crate::sync::{record_key, Record, Transition, TransitionRecord, ID_FIELD};
use crate::transport::ErrorInfo;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::trace;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    pub is_fetching: bool,
    pub did_invalidate: bool,
    pub last_updated_at: Option<DateTime<Utc>>,
    pub error: Option<ErrorInfo>,
}

/// An optimistic operation that has started but not yet settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Pending {
    Create,
    Update,
    Delete,
}

pub type Items = BTreeMap<String, Record>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceState {
    pub meta: Meta,
    /// Records keyed by the string form of their id.
    pub items: Items,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub pending: BTreeMap<String, Pending>,
}

impl ResourceState {
    pub fn item(&self, id: &str) -> Option<&Record> {
        self.items.get(id)
    }

    pub fn pending(&self, id: &str) -> Option<Pending> {
        self.pending.get(id).copied()
    }
}

pub fn meta_reducer(meta: Meta, transition: &Transition) -> Meta {
    match transition {
        Transition::FetchStart => Meta {
            did_invalidate: false,
            is_fetching: true,
            error: None,
            ..meta
        },
        Transition::FetchSuccess { received_at, .. } => Meta {
            did_invalidate: false,
            is_fetching: false,
            last_updated_at: Some(*received_at),
            error: None,
        },
        Transition::FetchError { error } => Meta {
            is_fetching: false,
            error: Some(error.clone()),
            ..meta
        },
        _ => meta,
    }
}

fn key_of(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Applies a transition to the item collection and its pending marks.
pub fn items_reducer(
    items: &mut Items,
    pending: &mut BTreeMap<String, Pending>,
    transition: &Transition,
) {
    match transition {
        Transition::FetchSuccess {
            records, replace, ..
        } => {
            if *replace {
                items.clear();
            }
            for record in records {
                if let Some(key) = record_key(record) {
                    items.insert(key, record.clone());
                }
            }
            pending.retain(|key, _| items.contains_key(key));
        }

        Transition::CreateStart { record } => {
            if let Some(key) = record_key(record) {
                items.insert(key.clone(), record.clone());
                pending.insert(key, Pending::Create);
            }
        }
        Transition::CreateSuccess { record, cid } => {
            if let Some(cid) = cid.as_ref().and_then(key_of) {
                items.remove(&cid);
                pending.remove(&cid);
            }
            if let Some(key) = record_key(record) {
                pending.remove(&key);
                items.insert(key, record.clone());
            }
        }
        Transition::CreateError { record, .. } => {
            if let Some(key) = record_key(record) {
                if pending.get(&key) == Some(&Pending::Create) {
                    pending.remove(&key);
                    items.remove(&key);
                }
            }
        }

        Transition::UpdateStart { record } => {
            if let Some(key) = record_key(record) {
                let stored = items.entry(key.clone()).or_default();
                for (field, value) in record {
                    stored.insert(field.clone(), value.clone());
                }
                pending.insert(key, Pending::Update);
            }
        }
        Transition::UpdateSuccess { record, id } => {
            let mut record = record.clone();
            if record_key(&record).is_none() {
                if let Some(id) = id {
                    record.insert(ID_FIELD.to_string(), id.clone());
                }
            }
            if let Some(key) = record_key(&record) {
                pending.remove(&key);
                items.insert(key, record);
            }
        }
        Transition::UpdateError { record, .. } => {
            if let Some(key) = record_key(record) {
                pending.remove(&key);
            }
        }

        Transition::DeleteStart { record } => {
            if let Some(key) = record_key(record) {
                if items.contains_key(&key) {
                    pending.insert(key, Pending::Delete);
                }
            }
        }
        Transition::DeleteSuccess { record } => {
            if let Some(key) = record_key(record) {
                items.remove(&key);
                pending.remove(&key);
            }
        }
        Transition::DeleteError { record, .. } => {
            if let Some(key) = record_key(record) {
                pending.remove(&key);
            }
        }

        Transition::FetchStart | Transition::FetchError { .. } => {}
    }
}

/// Reducer for one resource. Transitions tagged with another resource name leave the
/// state untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceReducer {
    resource_name: String,
}

pub fn reducers_for(resource_name: impl Into<String>) -> ResourceReducer {
    ResourceReducer {
        resource_name: resource_name.into(),
    }
}

impl ResourceReducer {
    pub fn resource_name(&self) -> &str {
        &self.resource_name
    }

    pub fn initial_state(&self) -> ResourceState {
        ResourceState::default()
    }

    pub fn reduce(&self, state: ResourceState, transition: &TransitionRecord) -> ResourceState {
        if transition.resource_name != self.resource_name {
            return state;
        }
        trace!(transition = %transition, "Reduce");

        let ResourceState {
            meta,
            mut items,
            mut pending,
        } = state;
        items_reducer(&mut items, &mut pending, &transition.transition);

        ResourceState {
            meta: meta_reducer(meta, &transition.transition),
            items,
            pending,
        }
    }
}

pub fn is_fetching(state: &ResourceState) -> bool {
    state.meta.is_fetching
}

pub fn last_updated_at(state: &ResourceState) -> Option<DateTime<Utc>> {
    state.meta.last_updated_at
}

/// Fetching, and no fetch has succeeded yet.
pub fn is_fetching_initial(state: &ResourceState) -> bool {
    state.meta.is_fetching && state.meta.last_updated_at.is_none()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::{CrudError, TransitionCreators};
    use crate::transport::TransportError;
    use serde_json::json;

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    fn setup() -> (ResourceReducer, TransitionCreators) {
        (
            reducers_for("myFunResource"),
            TransitionCreators::for_resource("myFunResource"),
        )
    }

    #[test]
    fn test_initial_state() {
        let (reducer, _) = setup();
        let state = reducer.initial_state();
        assert_eq!(state.meta, Meta::default());
        assert!(state.items.is_empty());
        assert_eq!(
            serde_json::to_value(&state).unwrap(),
            json!({
                "meta": { "isFetching": false, "didInvalidate": false, "lastUpdatedAt": null, "error": null },
                "items": {}
            })
        );
    }

    #[test]
    fn test_fetch_start() {
        let (reducer, creators) = setup();
        let state = reducer.reduce(reducer.initial_state(), &creators.fetch_start());

        assert_eq!(
            state.meta,
            Meta {
                is_fetching: true,
                did_invalidate: false,
                last_updated_at: None,
                error: None,
            }
        );
        assert!(state.items.is_empty());
        assert!(is_fetching(&state));
        assert!(is_fetching_initial(&state));
    }

    #[test]
    fn test_fetch_success_merges_items() {
        let (reducer, creators) = setup();
        let date = Utc::now();
        let before = ResourceState {
            meta: Meta {
                is_fetching: true,
                ..Meta::default()
            },
            items: Items::from([("1".to_string(), record(json!({ "id": 1, "blah": "blerg" })))]),
            ..ResourceState::default()
        };

        let after = reducer.reduce(
            before,
            &creators.fetch_success(vec![record(json!({ "id": 2, "blah": "blarg" }))], date, false),
        );

        assert_eq!(
            after.meta,
            Meta {
                last_updated_at: Some(date),
                ..Meta::default()
            }
        );
        assert_eq!(after.items.len(), 2);
        assert_eq!(after.item("1"), Some(&record(json!({ "id": 1, "blah": "blerg" }))));
        assert_eq!(after.item("2"), Some(&record(json!({ "id": 2, "blah": "blarg" }))));
        assert_eq!(last_updated_at(&after), Some(date));
        assert!(!is_fetching(&after));
    }

    #[test]
    fn test_fetch_success_with_replace_discards_prior_items() {
        let (reducer, creators) = setup();
        let mut state = reducer.initial_state();
        state.items.insert("1".into(), record(json!({ "id": 1 })));

        let state = reducer.reduce(
            state,
            &creators.fetch_success(vec![record(json!({ "id": 2 }))], Utc::now(), true),
        );
        assert_eq!(state.items.keys().collect::<Vec<_>>(), vec!["2"]);
    }

    #[test]
    fn test_fetch_error_keeps_last_updated_at() {
        let (reducer, creators) = setup();
        let date = Utc::now();
        let state = reducer.reduce(reducer.initial_state(), &creators.fetch_success(vec![], date, false));
        let state = reducer.reduce(state, &creators.fetch_start());
        assert!(!is_fetching_initial(&state));

        let error = TransportError::Network("down".into()).info();
        let state = reducer.reduce(state, &creators.fetch_error(error.clone()));
        assert!(!state.meta.is_fetching);
        assert_eq!(state.meta.error, Some(error));
        assert_eq!(state.meta.last_updated_at, Some(date));

        let state = reducer.reduce(state, &creators.fetch_start());
        assert_eq!(state.meta.error, None);
    }

    #[test]
    fn test_ignores_other_resources() {
        let (reducer, _) = setup();
        let other = TransitionCreators::for_resource("photos");
        let state = reducer.reduce(reducer.initial_state(), &other.fetch_start());
        assert_eq!(state, reducer.initial_state());
    }

    #[test]
    fn test_create_reconciles_client_id() {
        let (reducer, creators) = setup();
        let draft = record(json!({ "id": "tmp-1", "title": "draft" }));

        let state = reducer.reduce(reducer.initial_state(), &creators.create_start(draft.clone()));
        assert_eq!(state.pending("tmp-1"), Some(Pending::Create));
        assert!(state.meta == Meta::default());

        let saved = record(json!({ "id": 7, "title": "draft" }));
        let state = reducer.reduce(state, &creators.create_success(saved.clone(), Some(json!("tmp-1"))));
        assert_eq!(state.item("tmp-1"), None);
        assert_eq!(state.item("7"), Some(&saved));
        assert!(state.pending.is_empty());
    }

    #[test]
    fn test_create_error_rolls_back() {
        let (reducer, creators) = setup();
        let draft = record(json!({ "id": "tmp-1" }));
        let state = reducer.reduce(reducer.initial_state(), &creators.create_start(draft.clone()));
        let state = reducer.reduce(
            state,
            &creators.create_error(CrudError::Transport(TransportError::Network("down".into())), draft),
        );
        assert!(state.items.is_empty());
        assert!(state.pending.is_empty());
    }

    #[test]
    fn test_update_and_delete() {
        let (reducer, creators) = setup();
        let mut state = reducer.initial_state();
        state.items.insert("1".into(), record(json!({ "id": 1, "title": "a", "likes": 3 })));

        let state = reducer.reduce(state, &creators.update_start(record(json!({ "id": 1, "title": "b" }))));
        assert_eq!(state.item("1"), Some(&record(json!({ "id": 1, "title": "b", "likes": 3 }))));
        assert_eq!(state.pending("1"), Some(Pending::Update));

        let state = reducer.reduce(
            state,
            &creators.update_success(record(json!({ "title": "b", "likes": 4 })), Some(json!(1))),
        );
        assert_eq!(state.item("1"), Some(&record(json!({ "id": 1, "title": "b", "likes": 4 }))));
        assert_eq!(state.pending("1"), None);

        let target = record(json!({ "id": 1 }));
        let state = reducer.reduce(state, &creators.delete_start(target.clone()));
        assert_eq!(state.pending("1"), Some(Pending::Delete));
        let state = reducer.reduce(state, &creators.delete_success(target));
        assert!(state.items.is_empty());
        assert!(state.pending.is_empty());
    }

    #[test]
    fn test_delete_error_keeps_record() {
        let (reducer, creators) = setup();
        let mut state = reducer.initial_state();
        state.items.insert("1".into(), record(json!({ "id": 1 })));

        let target = record(json!({ "id": 1 }));
        let state = reducer.reduce(state, &creators.delete_start(target.clone()));
        let state = reducer.reduce(
            state,
            &creators.delete_error(CrudError::Transport(TransportError::Network("down".into())), target),
        );
        assert!(state.item("1").is_some());
        assert!(state.pending.is_empty());
    }

    #[test]
    fn test_records_without_id_are_not_stored() {
        let (reducer, creators) = setup();
        let state = reducer.reduce(
            reducer.initial_state(),
            &creators.fetch_success(vec![record(json!({ "title": "anon" }))], Utc::now(), false),
        );
        assert!(state.items.is_empty());
    }
}
