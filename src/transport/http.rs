//! # HTTP Transport
//!
//! [`Transport`] over `reqwest`. Paths are appended to a base URL.
//!
//! The transport holds no [`ApiConfig`](crate::config::ApiConfig) of its own: credentials
//! arrive on each [`Request`] from the [`Requester`](super::Requester), which owns the one
//! configuration.

use super::{Method, Request, Response, Transport, TransportError};
use crate::config::{join_url, ApiConfig, Credentials};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

pub struct HttpTransport {
    base_url: String,
    /// Keeps and sends cookies.
    client: reqwest::Client,
    /// Used for requests whose credentials are `omit`.
    anonymous: reqwest::Client,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, TransportError> {
        let build = |cookies: bool| {
            reqwest::Client::builder()
                .timeout(timeout)
                .cookie_store(cookies)
                .build()
                .map_err(|e| TransportError::Network(format!("Failed to build HTTP client: {}", e)))
        };

        Ok(Self {
            base_url: base_url.into(),
            client: build(true)?,
            anonymous: build(false)?,
        })
    }

    /// Takes the base URL and timeout from `config`. Nothing else is read.
    pub fn for_config(config: &ApiConfig) -> Result<Self, TransportError> {
        Self::new(config.api_url.clone(), config.timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn method(method: Method) -> reqwest::Method {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }

    fn client_for(&self, credentials: Credentials) -> &reqwest::Client {
        match credentials {
            Credentials::Omit => &self.anonymous,
            Credentials::Include | Credentials::SameOrigin => &self.client,
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, path: &str, request: Request) -> Result<Response, TransportError> {
        let url = join_url(&self.base_url, path);
        debug!(method = %request.method, %url, "HTTP request");

        let mut builder = self
            .client_for(request.credentials)
            .request(Self::method(request.method), &url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::Network(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::Network(format!("Failed to read response: {}", e)))?;

        Ok(Response::new(
            status.as_u16(),
            status.canonical_reason().unwrap_or_default(),
            body,
        ))
    }
}
