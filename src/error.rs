//! Error types for the MCP server.
//!
//! One enum covers configuration, upstream HTTP, parsing, lookup and
//! validation failures, plus the protocol-level errors of the JSON-RPC layer.

use serde::{Deserialize, Serialize};

/// MCP server errors.
#[derive(Debug, Clone, thiserror::Error, Serialize, Deserialize)]
pub enum McpError {
    /// Missing or unusable configuration (e.g. an empty API key).
    #[error("configuration error: {0}")]
    Config(String),

    /// Upstream answered with a non-2xx status.
    #[error("upstream HTTP {status}: {body}")]
    Http {
        /// HTTP status code
        status: u16,
        /// Raw response body
        body: String,
    },

    /// Upstream answered 2xx but flagged the call as failed in its envelope.
    #[error("upstream rejected request (code {code}): {message}")]
    Api {
        /// Service-specific error code
        code: i64,
        /// Message reported by the service
        message: String,
    },

    /// The request never produced a response (connect, TLS, timeout).
    #[error("request failed: {0}")]
    Transport(String),

    /// Response body is not JSON at all.
    #[error("response is not valid JSON ({reason}): {body}")]
    InvalidJson {
        /// Parser message
        reason: String,
        /// Raw response body
        body: String,
    },

    /// Response body is JSON but does not have the expected shape.
    #[error("response failed schema validation: {0}")]
    InvalidResponse(String),

    /// A lookup by id or name found nothing.
    #[error("not found: {0}")]
    NotFound(String),

    /// Caller-supplied arguments are malformed.
    #[error("validation error: {0}")]
    Validation(String),

    /// Invalid argument value.
    #[error("invalid argument '{name}': {reason}")]
    InvalidArg {
        /// Argument name
        name: String,
        /// Reason why it's invalid
        reason: String,
    },

    /// The dialect has no endpoint for this operation.
    #[error("unsupported operation: {0}")]
    Unsupported(String),

    /// Both dialects failed; the primary error leads.
    #[error("{primary} (fallback dialect: {fallback})")]
    Fallback {
        /// Error from the primary dialect
        primary: Box<McpError>,
        /// Error from the fallback dialect
        fallback: Box<McpError>,
    },

    /// Unknown tool requested.
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    /// JSON-RPC protocol error.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(String),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<std::io::Error> for McpError {
    fn from(err: std::io::Error) -> Self {
        McpError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for McpError {
    fn from(err: serde_json::Error) -> Self {
        McpError::Protocol(format!("JSON error: {}", err))
    }
}

impl From<reqwest::Error> for McpError {
    fn from(err: reqwest::Error) -> Self {
        McpError::Transport(err.to_string())
    }
}

/// JSON-RPC error codes.
pub mod rpc_codes {
    /// Parse error - Invalid JSON was received.
    pub const PARSE_ERROR: i32 = -32700;
    /// Invalid Request - The JSON sent is not a valid Request object.
    pub const INVALID_REQUEST: i32 = -32600;
    /// Method not found - The method does not exist / is not available.
    pub const METHOD_NOT_FOUND: i32 = -32601;
    /// Invalid params - Invalid method parameter(s).
    pub const INVALID_PARAMS: i32 = -32602;
    /// Internal error - Internal JSON-RPC error.
    pub const INTERNAL_ERROR: i32 = -32603;
    /// Resource not found (MCP extension range).
    pub const RESOURCE_NOT_FOUND: i32 = -32002;
}

impl McpError {
    /// Convert to JSON-RPC error code.
    pub fn rpc_code(&self) -> i32 {
        match self {
            McpError::UnknownTool(_) => rpc_codes::METHOD_NOT_FOUND,
            McpError::Validation(_) | McpError::InvalidArg { .. } => rpc_codes::INVALID_PARAMS,
            McpError::NotFound(_) => rpc_codes::RESOURCE_NOT_FOUND,
            McpError::Protocol(_) => rpc_codes::INVALID_REQUEST,
            McpError::Fallback { primary, .. } => primary.rpc_code(),
            _ => rpc_codes::INTERNAL_ERROR,
        }
    }

    /// Shorthand for a validation error about one named argument.
    pub fn invalid_arg(name: &str, reason: impl Into<String>) -> Self {
        McpError::InvalidArg {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type for MCP operations.
pub type Result<T> = std::result::Result<T, McpError>;
