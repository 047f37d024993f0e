//! CONNX MCP Server - Main entry point.
//!
//! This server provides MCP (Model Context Protocol) tools for AI assistants
//! to query mainframe VSAM data through a CONNX ODBC gateway.

use connx_mcp_server::config::Config;
use connx_mcp_server::db::{OdbcProvider, QueryExecutor};
use connx_mcp_server::transport::{StdioTransport, Transport};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initialize the tracing subscriber for logging.
///
/// Logs go to stderr; stdout belongs to the stdio transport. Off by default
/// so a bare launch stays silent.
fn init_tracing(config: &Config) {
    if !config.enable_logs {
        return;
    }

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if config.json_logs {
        subscriber
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        subscriber
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse configuration from command line and environment
    let config = Config::parse_args();

    // Initialize logging
    init_tracing(&config);

    if let Err(message) = config.validate() {
        eprintln!("Error: {message}.");
        eprintln!();
        eprintln!("Usage: connx-mcp-server --dsn <DSN> [--user <USER>] [--password <PASS>]");
        eprintln!();
        eprintln!("Environment variables:");
        eprintln!("  CONNX_DSN           ODBC Data Source Name (required)");
        eprintln!("  CONNX_USER          DSN login user");
        eprintln!("  CONNX_PASS          DSN login password");
        eprintln!("  CONNX_ALLOW_WRITES  Set to true to enable insert/update/delete");
        eprintln!("  CONNX_TIMEOUT       Per-request driver timeout in seconds (default 30)");
        eprintln!("  CONNX_MAX_ROWS      Row cap per query (default 1000)");
        std::process::exit(1);
    }

    let provider = OdbcProvider::from_config(&config);
    info!(
        connection = %provider.redacted_connection_string(),
        allow_writes = config.allow_writes,
        "Starting CONNX MCP Server v{}",
        env!("CARGO_PKG_VERSION")
    );

    let executor = QueryExecutor::new(Arc::new(provider), &config);

    let transport = StdioTransport::new(executor, config);
    if let Err(e) = transport.run().await {
        error!(error = %e, "Server error");
        return Err(e.into());
    }

    info!("Server shutdown complete");
    Ok(())
}
