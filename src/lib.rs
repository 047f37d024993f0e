//! CONNX MCP Server Library
//!
//! This library provides MCP (Model Context Protocol) tools for AI assistants
//! to query legacy data sources (mainframe VSAM files and similar) through a
//! CONNX ODBC DSN, without ever holding a direct database connection.

pub mod audit;
pub mod config;
pub mod db;
pub mod error;
pub mod mcp;
pub mod models;
pub mod tools;
pub mod transport;

pub use config::Config;
pub use error::ConnxError;
pub use mcp::ConnxService;
