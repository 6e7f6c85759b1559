//! # State Store Actor
//!
//! Hosts the [`ResourceState`] of each registered resource in its own task. Transitions
//! arrive over an unbounded channel and are folded in the order they were dispatched, so
//! a state query sent after an operation settles sees every transition it emitted.
//!
//! [`StoreClient`] is the handle: it is a [`Dispatch`] sink for the dispatcher and answers
//! state queries.

use super::reducer::{reducers_for, ResourceReducer, ResourceState};
use crate::sync::{Dispatch, TransitionRecord};
use std::collections::HashMap;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    #[error("State store closed")]
    Closed,
    #[error("State store dropped response channel")]
    Dropped,
    #[error("State store task failed: {0}")]
    TaskFailed(String),
}

#[derive(Debug)]
enum StoreRequest {
    Apply(TransitionRecord),
    State {
        resource_name: String,
        respond_to: oneshot::Sender<Option<ResourceState>>,
    },
}

pub struct StateStore {
    receiver: mpsc::UnboundedReceiver<StoreRequest>,
    resources: HashMap<String, (ResourceReducer, ResourceState)>,
}

impl StateStore {
    pub fn new<I, S>(resource_names: I) -> (Self, StoreClient)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let (sender, receiver) = mpsc::unbounded_channel();
        let resources = resource_names
            .into_iter()
            .map(|name| {
                let reducer = reducers_for(name);
                let state = reducer.initial_state();
                (reducer.resource_name().to_string(), (reducer, state))
            })
            .collect();

        (
            Self {
                receiver,
                resources,
            },
            StoreClient { sender },
        )
    }

    /// Processes requests until every client is dropped.
    pub async fn run(mut self) {
        info!(resources = self.resources.len(), "Store started");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                StoreRequest::Apply(transition) => {
                    let Some((reducer, state)) = self.resources.get_mut(&transition.resource_name)
                    else {
                        warn!(resource = %transition.resource_name, %transition, "Unregistered resource");
                        continue;
                    };
                    debug!(%transition, "Apply");
                    *state = reducer.reduce(std::mem::take(state), &transition);
                }
                StoreRequest::State {
                    resource_name,
                    respond_to,
                } => {
                    let state = self.resources.get(&resource_name).map(|(_, state)| state.clone());
                    let _ = respond_to.send(state);
                }
            }
        }

        info!(resources = self.resources.len(), "Shutdown");
    }
}

/// Cloneable handle to a running [`StateStore`].
#[derive(Debug, Clone)]
pub struct StoreClient {
    sender: mpsc::UnboundedSender<StoreRequest>,
}

impl StoreClient {
    /// Current state of a resource, `None` if it is not registered.
    pub async fn state(&self, resource_name: &str) -> Result<Option<ResourceState>, StoreError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(StoreRequest::State {
                resource_name: resource_name.to_string(),
                respond_to,
            })
            .map_err(|_| StoreError::Closed)?;
        response.await.map_err(|_| StoreError::Dropped)
    }
}

impl Dispatch for StoreClient {
    fn dispatch(&self, transition: TransitionRecord) {
        if let Err(mpsc::error::SendError(StoreRequest::Apply(transition))) =
            self.sender.send(StoreRequest::Apply(transition))
        {
            warn!(%transition, "Store closed, transition dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::TransitionCreators;
    use chrono::Utc;
    use serde_json::json;

    #[tokio::test]
    async fn test_applies_transitions_in_order() {
        let (store, client) = StateStore::new(["photos"]);
        let handle = tokio::spawn(store.run());
        let creators = TransitionCreators::for_resource("photos");

        client.dispatch(creators.fetch_start());
        let state = client.state("photos").await.unwrap().unwrap();
        assert!(state.meta.is_fetching);

        let record = json!({ "id": 1 }).as_object().cloned().unwrap();
        client.dispatch(creators.fetch_success(vec![record], Utc::now(), false));
        let state = client.state("photos").await.unwrap().unwrap();
        assert!(!state.meta.is_fetching);
        assert!(state.item("1").is_some());

        drop(client);
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_unregistered_resource() {
        let (store, client) = StateStore::new(["photos"]);
        tokio::spawn(store.run());

        client.dispatch(TransitionCreators::for_resource("albums").fetch_start());
        assert_eq!(client.state("albums").await.unwrap(), None);
        assert_eq!(client.state("photos").await.unwrap(), Some(ResourceState::default()));
    }

    #[tokio::test]
    async fn test_closed_store() {
        let (store, client) = StateStore::new(["photos"]);
        drop(store);

        client.dispatch(TransitionCreators::for_resource("photos").fetch_start());
        assert_eq!(client.state("photos").await, Err(StoreError::Closed));
    }
}
