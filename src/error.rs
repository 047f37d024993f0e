//! Error types for the CONNX MCP Server.
//!
//! This module defines all error types using `thiserror` for ergonomic error
//! handling. Messages are written for the calling assistant: they describe
//! what was rejected and how to proceed, and they never echo raw SQL text,
//! bound parameter values, or credential material.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConnxError {
    /// Malformed or disallowed SQL shape: multi-statement batches, verb
    /// mismatches, unsupported verbs. Detected before any driver call.
    #[error("Invalid query: {message}")]
    Validation { message: String },

    /// A write was attempted while the write-enablement switch is off.
    #[error("Writes are disabled. Set CONNX_ALLOW_WRITES=true to enable update operations.")]
    WritesDisabled,

    /// The ODBC driver or the CONNX gateway could not be reached.
    #[error("Connection failed: {message}")]
    Connectivity { message: String },

    /// The driver call did not complete within the configured timeout.
    #[error("Timeout: {operation} exceeded {elapsed_secs}s")]
    Timeout {
        operation: String,
        elapsed_secs: u64,
    },

    /// The driver accepted the connection but rejected the statement.
    #[error("Query execution failed: {message}")]
    Execution {
        message: String,
        /// e.g., "42S02" for table not found
        sql_state: Option<String>,
    },

    /// A read executed but produced no result set (caller error).
    #[error("Query did not return a result set: {message}")]
    EmptyResult { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl ConnxError {
    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a connectivity error.
    pub fn connectivity(message: impl Into<String>) -> Self {
        Self::Connectivity {
            message: message.into(),
        }
    }

    /// Create a timeout error.
    pub fn timeout(operation: impl Into<String>, elapsed_secs: u64) -> Self {
        Self::Timeout {
            operation: operation.into(),
            elapsed_secs,
        }
    }

    /// Create an execution error with optional SQLSTATE.
    pub fn execution(message: impl Into<String>, sql_state: Option<String>) -> Self {
        Self::Execution {
            message: message.into(),
            sql_state,
        }
    }

    /// Create an empty-result error.
    pub fn empty_result(message: impl Into<String>) -> Self {
        Self::EmptyResult {
            message: message.into(),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Short, stable identifier used as the `error_kind` field of audit
    /// records.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "validation",
            Self::WritesDisabled => "permission",
            Self::Connectivity { .. } => "connectivity",
            Self::Timeout { .. } => "timeout",
            Self::Execution { .. } => "execution",
            Self::EmptyResult { .. } => "empty_result",
            Self::Internal { .. } => "internal",
        }
    }

    /// Errors detected locally, before the request touches the driver.
    pub fn is_pre_execution(&self) -> bool {
        matches!(self, Self::Validation { .. } | Self::WritesDisabled)
    }
}

/// Convert ODBC driver errors to ConnxError.
///
/// Diagnostics records carry a five-character SQLSTATE; the state class
/// distinguishes connectivity failures (08xxx, IM0xx, 28000) and driver
/// timeouts (HYT00/HYT01) from statement-level rejections.
impl From<odbc_api::Error> for ConnxError {
    fn from(err: odbc_api::Error) -> Self {
        match &err {
            odbc_api::Error::Diagnostics { record, .. } => {
                let state = record.state.as_str().to_string();
                let message = record.to_string();
                if state.starts_with("08") || state.starts_with("IM") || state == "28000" {
                    ConnxError::connectivity(message)
                } else if state == "HYT00" || state == "HYT01" {
                    ConnxError::timeout("driver call", 0)
                } else {
                    ConnxError::execution(message, Some(state))
                }
            }
            odbc_api::Error::NoDiagnostics { function } => ConnxError::internal(format!(
                "Driver reported an error without diagnostics in {function}"
            )),
            _ => ConnxError::connectivity(err.to_string()),
        }
    }
}

/// Result type alias for CONNX operations.
pub type ConnxResult<T> = Result<T, ConnxError>;

/// Convert ConnxError to MCP ErrorData for semantic error categorization.
///
/// Caller errors (bad SQL shape, disabled writes, statements the driver
/// rejected) map to invalid_params; infrastructure failures map to
/// internal_error.
impl From<ConnxError> for rmcp::ErrorData {
    fn from(err: ConnxError) -> Self {
        match &err {
            ConnxError::Validation { .. } => rmcp::ErrorData::invalid_params(err.to_string(), None),
            ConnxError::WritesDisabled => rmcp::ErrorData::invalid_params(err.to_string(), None),
            ConnxError::EmptyResult { .. } => {
                rmcp::ErrorData::invalid_params(err.to_string(), None)
            }
            ConnxError::Execution { sql_state, .. } => {
                let msg = match sql_state {
                    Some(code) => format!("{} (SQLSTATE: {})", err, code),
                    None => err.to_string(),
                };
                rmcp::ErrorData::invalid_params(msg, None)
            }
            ConnxError::Connectivity { .. } => {
                rmcp::ErrorData::internal_error(err.to_string(), None)
            }
            ConnxError::Timeout { .. } => rmcp::ErrorData::internal_error(err.to_string(), None),
            ConnxError::Internal { .. } => rmcp::ErrorData::internal_error(err.to_string(), None),
        }
    }
}
