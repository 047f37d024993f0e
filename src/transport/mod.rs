//! Transport layer for the MCP server.
//!
//! The server speaks MCP over standard input/output, the mode CLI
//! integrations launch it in.

pub mod stdio;

pub use stdio::StdioTransport;

use crate::error::ConnxResult;
use std::future::Future;

/// Trait for MCP transport implementations.
pub trait Transport: Send + Sync {
    /// Start the transport and block until it shuts down.
    fn run(&self) -> impl Future<Output = ConnxResult<()>> + Send;

    /// Name of this transport for logging.
    fn name(&self) -> &'static str;
}
