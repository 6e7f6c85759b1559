//! # Mock Transport
//!
//! Test doubles for exercising the dispatcher without a server.
//!
//! [`MockTransport`] answers requests from a queue of expectations. Each expectation names
//! the method and path it expects and the response to return:
//!
//! ```ignore
//! let mock = MockTransport::new();
//! mock.expect(Method::Get, "photos").respond_json(200, json!({ "photos": [] }));
//!
//! let dispatcher = CrudDispatcher::new(mock.clone(), ApiConfig::default());
//! // ...
//! mock.verify(); // Ensures all expectations were met
//! ```
//!
//! [`MockTransport::pause`] holds every response until [`MockTransport::release`], which
//! is how tests line up concurrent requests.
//!
//! [`TransitionLog`] is a [`Dispatch`] sink that records every transition it receives.

use crate::sync::{Dispatch, TransitionRecord};
use crate::transport::{Method, Request, Response, Transport, TransportError};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::watch;

struct Expectation {
    method: Method,
    path: String,
    response: Result<Response, TransportError>,
}

/// A request the mock received.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub path: String,
    pub request: Request,
}

impl RecordedCall {
    /// Request body parsed as JSON.
    pub fn json_body(&self) -> Option<Value> {
        self.request
            .body
            .as_deref()
            .and_then(|body| serde_json::from_str(body).ok())
    }
}

/// A [`Transport`] that replays queued responses and records what it was sent.
#[derive(Clone)]
pub struct MockTransport {
    expectations: Arc<Mutex<VecDeque<Expectation>>>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
    open: Arc<watch::Sender<bool>>,
}

impl Default for MockTransport {
    fn default() -> Self {
        let (open, _) = watch::channel(true);
        Self {
            expectations: Arc::new(Mutex::new(VecDeque::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
            open: Arc::new(open),
        }
    }
}

impl MockTransport {
    /// Creates a mock with no expectations.
    pub fn new() -> Self {
        Self::default()
    }

    /// Expects a request. Expectations are consumed in the order they were added.
    pub fn expect(&self, method: Method, path: impl Into<String>) -> ExpectationBuilder {
        ExpectationBuilder {
            method,
            path: path.into(),
            expectations: self.expectations.clone(),
        }
    }

    /// Holds responses until [`MockTransport::release`]. Requests are still recorded.
    pub fn pause(&self) {
        self.open.send_replace(false);
    }

    pub fn release(&self) {
        self.open.send_replace(true);
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, method: Method, path: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| call.request.method == method && call.path == path)
            .count()
    }

    /// Verifies that all expectations were met.
    pub fn verify(&self) {
        let exps = self.expectations.lock().unwrap();
        if !exps.is_empty() {
            panic!("Not all expectations were met. {} remaining", exps.len());
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, path: &str, request: Request) -> Result<Response, TransportError> {
        let method = request.method;
        self.calls.lock().unwrap().push(RecordedCall {
            path: path.to_string(),
            request,
        });

        let expectation = self.expectations.lock().unwrap().pop_front();
        let expectation = match expectation {
            Some(exp) if exp.method == method && exp.path == path => exp,
            Some(exp) => panic!(
                "Expected {} {}, got {} {}",
                exp.method, exp.path, method, path
            ),
            None => panic!("Unexpected request: {} {}", method, path),
        };

        let mut open = self.open.subscribe();
        let _ = open.wait_for(|open| *open).await;

        expectation.response
    }
}

fn status_text(status: u16) -> &'static str {
    reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|status| status.canonical_reason())
        .unwrap_or_default()
}

/// Builder for the response to one expected request.
pub struct ExpectationBuilder {
    method: Method,
    path: String,
    expectations: Arc<Mutex<VecDeque<Expectation>>>,
}

impl ExpectationBuilder {
    fn push(self, response: Result<Response, TransportError>) {
        self.expectations.lock().unwrap().push_back(Expectation {
            method: self.method,
            path: self.path,
            response,
        });
    }

    pub fn respond_json(self, status: u16, body: Value) {
        self.push(Ok(Response::new(status, status_text(status), body.to_string())));
    }

    /// Responds with an empty body.
    pub fn respond_status(self, status: u16) {
        self.push(Ok(Response::new(status, status_text(status), "")));
    }

    pub fn respond_raw(self, status: u16, body: &str) {
        self.push(Ok(Response::new(status, status_text(status), body)));
    }

    /// Fails as if the server could not be reached.
    pub fn fail_network(self, message: &str) {
        self.push(Err(TransportError::Network(message.to_string())));
    }
}

/// Records every transition it is handed.
#[derive(Clone, Default)]
pub struct TransitionLog {
    transitions: Arc<Mutex<Vec<TransitionRecord>>>,
}

impl TransitionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transitions(&self) -> Vec<TransitionRecord> {
        self.transitions.lock().unwrap().clone()
    }

    /// Type names in the order they were dispatched.
    pub fn types(&self) -> Vec<String> {
        self.transitions
            .lock()
            .unwrap()
            .iter()
            .map(TransitionRecord::type_name)
            .collect()
    }

    pub fn last(&self) -> Option<TransitionRecord> {
        self.transitions.lock().unwrap().last().cloned()
    }

    pub fn clear(&self) {
        self.transitions.lock().unwrap().clear();
    }
}

impl Dispatch for TransitionLog {
    fn dispatch(&self, transition: TransitionRecord) {
        self.transitions.lock().unwrap().push(transition);
    }
}
