//! # aitable-mcp
//!
//! MCP (Model Context Protocol) server for tabular-database APIs.
//!
//! This crate exposes bases, tables, fields and records of an Airtable-style
//! or AITable-style service as tools and resources for AI agents. It
//! implements the MCP protocol over stdin/stdout using JSON-RPC 2.0.
//!
//! ## Features
//!
//! - **15 tools** for listing, describing, searching and mutating bases, tables, fields and records
//! - **Two upstream dialects**: the `/v0` metadata API is tried first, the `/fusion/v1`
//!   spaces API is used when that fails, both normalized into one data model
//! - **Folder discovery**: datasheets nested in folders are found and reported with their path
//! - **Resources**: base schemas and table records addressable as `aitable://` URIs
//!
//! ## Usage
//!
//! The server is typically run as an executable and configured in AI tools like Claude Desktop:
//!
//! ```json
//! {
//!   "mcpServers": {
//!     "aitable": {
//!       "command": "/path/to/aitable-mcp",
//!       "env": { "AITABLE_API_KEY": "..." }
//!     }
//!   }
//! }
//! ```
//!
//! ## Library Usage
//!
//! For testing or embedding, you can use the library API:
//!
//! ```no_run
//! use aitable_mcp::{ClientConfig, McpServer, TableClient};
//!
//! let config = ClientConfig::new("key", None).expect("API key required");
//! let client = TableClient::new(config).expect("HTTP client");
//! let mut server = McpServer::new(client);
//!
//! // Run the server (reads from stdin, writes to stdout)
//! // server.run().await.expect("Server error");
//! ```

#![warn(missing_docs)]

pub mod client;
mod config;
mod convert;
mod error;
mod http;
mod resources;
mod server;
mod tools;

pub use client::types::{
    Base, BaseSchema, DatasheetInfo, DeletedRecord, Field, ListRecordsOptions, MetadataUpdate,
    PermissionLevel, Record, Table, View,
};
pub use client::TableClient;
pub use config::{ClientConfig, DEFAULT_BASE_URL};
pub use error::{McpError, Result};
pub use http::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
pub use resources::ResourceUri;
pub use server::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, McpServer, Outcome};
pub use tools::detail::{project_table, DetailLevel};
pub use tools::{CallToolResult, ToolContent, ToolDef, ToolRegistry};
