//! Data models for the CONNX MCP Server.
//!
//! This module re-exports all model types used throughout the application.

pub mod entity;
pub mod query;

// Re-export commonly used types
pub use entity::{ENTITIES, EntityDef, resolve_entity};
pub use query::{RowSet, SqlParam};
