//! Configuration handling for the CONNX MCP Server.
//!
//! All options are consumed from the environment (the `CONNX_*` variables the
//! hosting MCP client sets) or from CLI flags, via clap. The credential pair
//! is never logged; see [`crate::db::OdbcProvider`] for redaction.

use clap::Parser;
use std::time::Duration;

pub const DEFAULT_QUERY_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_MAX_RESULT_ROWS: u32 = 1000;

/// Configuration for the CONNX MCP Server.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "connx-mcp-server",
    about = "MCP server for CONNX-connected legacy data sources - enables AI assistants to query mainframe VSAM data via ODBC",
    version,
    author
)]
pub struct Config {
    /// ODBC Data Source Name of the CONNX gateway.
    #[arg(long, env = "CONNX_DSN")]
    pub dsn: String,

    /// User for the DSN login.
    #[arg(long, env = "CONNX_USER", default_value = "")]
    pub user: String,

    /// Password for the DSN login (never logged).
    #[arg(long, env = "CONNX_PASS", default_value = "", hide_env_values = true)]
    pub password: String,

    /// Optional default database/catalog to select after connecting.
    #[arg(long, env = "CONNX_DATABASE", default_value = "")]
    pub database: String,

    /// Enable INSERT/UPDATE/DELETE through the write-query tool.
    /// When unset or false, every write request is rejected before it
    /// touches the connection.
    #[arg(long, env = "CONNX_ALLOW_WRITES")]
    pub allow_writes: bool,

    /// Per-request driver timeout in seconds (connect and execute).
    #[arg(long, default_value_t = DEFAULT_QUERY_TIMEOUT_SECS, env = "CONNX_TIMEOUT")]
    pub timeout: u64,

    /// Hard cap on rows returned by any single query.
    #[arg(long, default_value_t = DEFAULT_MAX_RESULT_ROWS, env = "CONNX_MAX_ROWS")]
    pub max_rows: u32,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "CONNX_LOG_LEVEL")]
    pub log_level: String,

    /// Enable JSON logging format
    #[arg(long, env = "CONNX_JSON_LOGS")]
    pub json_logs: bool,

    /// Enable logging output (disabled by default; logs go to stderr so the
    /// stdio transport's stdout stays clean either way)
    #[arg(long, env = "CONNX_ENABLE_LOGS")]
    pub enable_logs: bool,
}

impl Config {
    /// Parse configuration from command line arguments and environment.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Create a default configuration (useful for testing).
    pub fn default_config() -> Self {
        Self {
            dsn: String::new(),
            user: String::new(),
            password: String::new(),
            database: String::new(),
            allow_writes: false,
            timeout: DEFAULT_QUERY_TIMEOUT_SECS,
            max_rows: DEFAULT_MAX_RESULT_ROWS,
            log_level: "info".to_string(),
            json_logs: false,
            enable_logs: false,
        }
    }

    /// Get the per-request driver timeout as a Duration.
    pub fn timeout_duration(&self) -> Duration {
        Duration::from_secs(self.timeout.max(1))
    }

    /// Get the row cap, guarding against a zero value from the environment.
    pub fn effective_max_rows(&self) -> u32 {
        if self.max_rows == 0 {
            DEFAULT_MAX_RESULT_ROWS
        } else {
            self.max_rows
        }
    }

    /// Validate required settings, returning a human-readable message for
    /// anything missing.
    pub fn validate(&self) -> Result<(), String> {
        if self.dsn.trim().is_empty() {
            return Err("CONNX_DSN is not configured".to_string());
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}
