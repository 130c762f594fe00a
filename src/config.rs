//! Client configuration.
//!
//! Built once by the binary from CLI flags / environment and handed to
//! [`TableClient`](crate::TableClient) by value.

use std::time::Duration;

use crate::error::{McpError, Result};

/// Production endpoint of the primary dialect.
pub const DEFAULT_BASE_URL: &str = "https://api.airtable.com";

/// Connection settings for the upstream table service.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    api_key: String,
    base_url: String,
    request_timeout: Option<Duration>,
}

impl ClientConfig {
    /// Create a configuration, rejecting an empty API key.
    pub fn new(api_key: impl Into<String>, base_url: Option<String>) -> Result<Self> {
        let api_key = api_key.into().trim().to_string();
        if api_key.is_empty() {
            return Err(McpError::Config(
                "API key is required: pass --api-key or set AITABLE_API_KEY".to_string(),
            ));
        }

        let base_url = base_url
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Ok(Self {
            api_key,
            base_url,
            request_timeout: None,
        })
    }

    /// Apply a timeout to every outbound request.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// The bearer token sent upstream.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Base URL shared by both dialects, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Per-request timeout, if any.
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout
    }
}
