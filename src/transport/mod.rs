//! # Transport Seam
//!
//! The dispatcher never talks to the network directly. It goes through a [`Transport`],
//! the "send request, get status + body" primitive, wrapped by a [`Requester`] that applies
//! the conventions every call shares:
//!
//! - JSON `Accept`/`Content-Type` headers and the configured credentials mode.
//! - A login-redirect hook on HTTP 403.
//! - Non-ok responses become a [`TransportError::Status`] rejection.
//! - Success bodies are parsed as JSON unless the caller opts out.
//!
//! [`HttpTransport`] is the `reqwest` implementation. Tests use
//! [`MockTransport`](crate::mock::MockTransport).

pub mod http;

pub use http::HttpTransport;

use crate::config::{ApiConfig, Credentials};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// HTTP methods used by the CRUD operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Headers sent with every request.
pub const DEFAULT_HEADERS: [(&str, &str); 2] = [
    ("Accept", "application/json"),
    ("Content-Type", "application/json"),
];

/// A request handed to a [`Transport`]. The path is relative to the API base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub method: Method,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
    pub credentials: Credentials,
}

impl Request {
    pub fn new(method: Method, credentials: Credentials) -> Self {
        Self {
            method,
            headers: DEFAULT_HEADERS
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            body: None,
            credentials,
        }
    }

    pub fn with_body(mut self, body: String) -> Self {
        self.body = Some(body);
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// A raw response: status line plus unparsed body.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: u16,
    pub status_text: String,
    pub body: String,
}

impl Response {
    pub fn new(status: u16, status_text: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            status,
            status_text: status_text.into(),
            body: body.into(),
        }
    }

    /// 2xx
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json(&self) -> Result<Value, TransportError> {
        serde_json::from_str(&self.body).map_err(|e| TransportError::InvalidJson(e.to_string()))
    }
}

/// The `type` of a failed response, after the Fetch API's `Response.type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseType {
    /// A regular HTTP response with a status.
    Basic,
    /// No usable HTTP response (connection failure, undecodable body).
    Error,
}

/// Status summary of a failed request, as carried by fetch-error transitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorInfo {
    pub status: u16,
    pub status_text: String,
    #[serde(rename = "type")]
    pub kind: ResponseType,
}

/// Failures surfaced by the transport layer.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransportError {
    /// The server answered with a non-2xx status. The body is kept unparsed.
    #[error("HTTP {status} {status_text}")]
    Status {
        status: u16,
        status_text: String,
        body: String,
    },
    #[error("Request failed: {0}")]
    Network(String),
    #[error("Invalid JSON in response: {0}")]
    InvalidJson(String),
}

impl TransportError {
    /// HTTP status, or 0 when there was no usable response.
    pub fn status(&self) -> u16 {
        match self {
            TransportError::Status { status, .. } => *status,
            _ => 0,
        }
    }

    pub fn info(&self) -> ErrorInfo {
        match self {
            TransportError::Status {
                status, status_text, ..
            } => ErrorInfo {
                status: *status,
                status_text: status_text.clone(),
                kind: ResponseType::Basic,
            },
            other => ErrorInfo {
                status: 0,
                status_text: other.to_string(),
                kind: ResponseType::Error,
            },
        }
    }

    /// Parses the body of a status rejection as JSON.
    pub fn json(&self) -> Result<Value, TransportError> {
        match self {
            TransportError::Status { body, .. } => serde_json::from_str(body)
                .map_err(|e| TransportError::InvalidJson(e.to_string())),
            other => Err(other.clone()),
        }
    }
}

/// The network primitive: send a request to a path, get a status and a body back.
///
/// Implementations must not interpret the status; that is the [`Requester`]'s job.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    async fn send(&self, path: &str, request: Request) -> Result<Response, TransportError>;
}

/// Called with the configured login URL when the server answers 403.
pub type LoginRedirect = Arc<dyn Fn(&str) + Send + Sync>;

/// Applies the shared request conventions on top of a [`Transport`].
pub struct Requester<T> {
    transport: Arc<T>,
    config: Arc<ApiConfig>,
    on_forbidden: LoginRedirect,
}

impl<T> Clone for Requester<T> {
    fn clone(&self) -> Self {
        Self {
            transport: self.transport.clone(),
            config: self.config.clone(),
            on_forbidden: self.on_forbidden.clone(),
        }
    }
}

impl<T: Transport> Requester<T> {
    pub fn new(transport: T, config: ApiConfig) -> Self {
        Self {
            transport: Arc::new(transport),
            config: Arc::new(config),
            on_forbidden: Arc::new(|login_url: &str| {
                warn!(login_url, "Forbidden, redirect to login");
            }),
        }
    }

    /// Replaces the hook invoked on HTTP 403.
    pub fn on_forbidden(mut self, hook: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_forbidden = Arc::new(hook);
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Sends a request and resolves with the parsed JSON body (`null` when `parse_json`
    /// is false).
    pub async fn request(
        &self,
        path: &str,
        method: Method,
        body: Option<String>,
        parse_json: bool,
    ) -> Result<Value, TransportError> {
        let mut request = Request::new(method, self.config.credentials);
        if let Some(body) = body {
            request = request.with_body(body);
        }

        debug!(%method, path, "Sending request");
        let response = self.transport.send(path, request).await?;
        debug!(%method, path, status = response.status, "Received response");

        if response.status == 403 {
            (self.on_forbidden)(&self.config.login_url);
        }
        if !response.ok() {
            return Err(TransportError::Status {
                status: response.status,
                status_text: response.status_text,
                body: response.body,
            });
        }

        if parse_json {
            response.json()
        } else {
            Ok(Value::Null)
        }
    }
}
