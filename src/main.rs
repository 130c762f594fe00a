//! MCP server for Airtable-style and AITable-style table APIs.
//!
//! Run with `aitable-mcp --api-key <KEY>` or with `AITABLE_API_KEY` set.

use std::time::Duration;

use aitable_mcp::{ClientConfig, McpServer, TableClient};
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// MCP server for table APIs.
///
/// Exposes bases, tables, fields and records as MCP tools for AI agents.
/// Communicates via JSON-RPC 2.0 over stdin/stdout.
#[derive(Parser)]
#[command(name = "aitable-mcp")]
#[command(version, about, long_about = None)]
struct Args {
    /// API key sent as a bearer token.
    #[arg(long, env = "AITABLE_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Base URL of the table API.
    /// Defaults to the Airtable production endpoint.
    #[arg(long, env = "AITABLE_BASE_URL", value_name = "URL")]
    base_url: Option<String>,

    /// Abort any single upstream request after this many seconds.
    #[arg(long, value_name = "SECS")]
    timeout_secs: Option<u64>,

    /// Enable debug logging to stderr.
    #[arg(long, short)]
    verbose: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = Args::parse();

    // Set up logging
    if args.verbose {
        let mut filter = EnvFilter::from_default_env();
        if let Ok(directive) = "aitable_mcp=debug".parse() {
            filter = filter.add_directive(directive);
        }
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    // Build the configuration
    let mut config = match ClientConfig::new(args.api_key.unwrap_or_default(), args.base_url) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    if let Some(secs) = args.timeout_secs {
        config = config.with_request_timeout(Duration::from_secs(secs));
    }

    let client = match TableClient::new(config) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Error: Failed to create HTTP client: {}", e);
            std::process::exit(1);
        }
    };

    // Run the server
    let mut server = McpServer::new(client);
    if let Err(e) = server.run().await {
        eprintln!("Error: Server error: {}", e);
        std::process::exit(1);
    }
}
