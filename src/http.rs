//! HTTP seam between the adapter and the network.
//!
//! [`HttpTransport`] is the only thing that touches the wire; tests swap in a
//! scripted implementation. [`UpstreamApi`] adds authentication, status
//! checking and two-stage (JSON, then shape) decoding on top of it.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::{McpError, Result};

/// HTTP verbs used against the table APIs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    /// GET
    Get,
    /// POST
    Post,
    /// PATCH
    Patch,
    /// DELETE
    Delete,
}

impl HttpMethod {
    /// Upper-case verb, as it appears on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

/// A fully-resolved outbound request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// Verb
    pub method: HttpMethod,
    /// Absolute URL without query string
    pub url: String,
    /// Query parameters, in order; keys may repeat
    pub query: Vec<(String, String)>,
    /// Request headers
    pub headers: Vec<(String, String)>,
    /// JSON body, if any
    pub body: Option<JsonValue>,
}

impl HttpRequest {
    /// First value of a query parameter.
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Value of a header, matched case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Raw response: status plus body text.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Body as text
    pub body: String,
}

/// Something that can execute an [`HttpRequest`].
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send the request and return whatever the server answered.
    ///
    /// Only failures to obtain a response are errors here; non-2xx statuses
    /// are returned as normal responses.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse>;
}

/// reqwest-backed transport used in production.
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Build a transport, optionally bounding every request by `timeout`.
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| McpError::Config(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let method = match request.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self.client.request(method, &request.url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let resp = builder.send().await?;
        let status = resp.status().as_u16();
        let body = resp.text().await?;
        Ok(HttpResponse { status, body })
    }
}

/// Authenticated JSON access to the upstream service.
#[derive(Clone)]
pub struct UpstreamApi {
    transport: Arc<dyn HttpTransport>,
    base_url: String,
    api_key: String,
}

impl UpstreamApi {
    /// Bind a transport to the configured endpoint and credentials.
    pub fn new(transport: Arc<dyn HttpTransport>, config: &ClientConfig) -> Self {
        Self {
            transport,
            base_url: config.base_url().to_string(),
            api_key: config.api_key().to_string(),
        }
    }

    /// GET `path` and decode the body as `T`.
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: Vec<(String, String)>,
    ) -> Result<T> {
        self.send(HttpMethod::Get, path, query, None).await
    }

    /// Issue a request and decode the body as `T`.
    pub async fn send<T: DeserializeOwned>(
        &self,
        method: HttpMethod,
        path: &str,
        query: Vec<(String, String)>,
        body: Option<JsonValue>,
    ) -> Result<T> {
        let request = HttpRequest {
            method,
            url: format!("{}{}", self.base_url, path),
            query,
            headers: vec![
                ("Authorization".to_string(), format!("Bearer {}", self.api_key)),
                ("Accept".to_string(), "application/json".to_string()),
                ("Content-Type".to_string(), "application/json".to_string()),
            ],
            body,
        };

        debug!(method = method.as_str(), path, "upstream request");
        let response = self.transport.send(request).await?;

        if !(200..300).contains(&response.status) {
            return Err(McpError::Http {
                status: response.status,
                body: response.body,
            });
        }

        decode_body(&response.body)
    }
}

/// Parse a body in two stages so "not JSON" and "wrong shape" stay distinct.
pub fn decode_body<T: DeserializeOwned>(body: &str) -> Result<T> {
    let value: JsonValue = if body.trim().is_empty() {
        JsonValue::Null
    } else {
        serde_json::from_str(body).map_err(|e| McpError::InvalidJson {
            reason: e.to_string(),
            body: body.to_string(),
        })?
    };

    serde_json::from_value(value).map_err(|e| McpError::InvalidResponse(e.to_string()))
}
