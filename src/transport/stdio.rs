//! Stdio transport for the MCP server.
//!
//! Reads JSON-RPC messages from stdin and writes responses to stdout,
//! following the MCP protocol specification. Logging goes to stderr so
//! stdout carries protocol traffic only.

use crate::config::Config;
use crate::db::QueryExecutor;
use crate::error::{ConnxError, ConnxResult};
use crate::mcp::ConnxService;
use crate::transport::Transport;
use rmcp::{ServiceExt, transport::stdio};
use tokio::signal;
use tracing::info;

pub struct StdioTransport {
    executor: QueryExecutor,
    config: Config,
}

impl StdioTransport {
    pub fn new(executor: QueryExecutor, config: Config) -> Self {
        Self { executor, config }
    }
}

impl Transport for StdioTransport {
    async fn run(&self) -> ConnxResult<()> {
        info!("Starting MCP server with stdio transport");

        let service = ConnxService::new(self.executor.clone(), &self.config);

        let transport = stdio();
        let running_service = service.serve(transport).await.map_err(|e| {
            ConnxError::internal(format!("Failed to start stdio transport: {e}"))
        })?;

        let shutdown_requested = tokio::select! {
            result = running_service.waiting() => {
                match result {
                    Ok(_quit_reason) => {
                        info!("Stdio transport completed normally");
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Stdio transport error");
                        return Err(ConnxError::internal(format!(
                            "Stdio transport error: {e}"
                        )));
                    }
                }
                false
            }
            _ = wait_for_signal() => {
                info!("Shutdown signal received (send again to force exit)");
                true
            }
        };

        if shutdown_requested {
            // Second signal forces exit.
            tokio::spawn(async {
                wait_for_signal().await;
                tracing::warn!("Received second signal, forcing immediate exit");
                std::process::exit(1);
            });

            // tokio::select! cannot interrupt a blocking stdin read, so the
            // process exits directly once shutdown is requested.
            info!("Exiting process");
            std::process::exit(0);
        }

        Ok(())
    }

    fn name(&self) -> &'static str {
        "stdio"
    }
}

/// Wait for a shutdown signal (SIGINT or SIGTERM).
async fn wait_for_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT");
        }
        _ = terminate => {
            info!("Received SIGTERM");
        }
    }
}
