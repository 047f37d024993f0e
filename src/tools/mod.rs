//! MCP tool implementations.
//!
//! Each tool is a handler struct with typed input/output structs; the MCP
//! service in `crate::mcp` wires them to the protocol.

pub mod entities;
pub mod guard;
pub mod lookup;
pub mod query;
pub mod schema;
pub mod write;

pub use guard::{classify, StatementClass, WriteOp};
