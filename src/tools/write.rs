//! Free-form write tool.
//!
//! Write support is opt-in. The enablement flag is checked before anything
//! else, including classification, so a disabled server rejects even
//! malformed write requests without parsing them or opening a connection.
//! When enabled, the declared operation must match the statement verb and
//! the statement runs in its own transaction.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::audit::{self, AuditRecord, OperationKind};
use crate::db::QueryExecutor;
use crate::error::{ConnxError, ConnxResult};
use crate::models::SqlParam;
use crate::tools::guard::{self, WriteOp};

/// Input for the write_query tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct WriteQueryInput {
    /// The operation this statement performs. Must match the SQL verb.
    pub operation: WriteOp,
    /// SQL INSERT, UPDATE, or DELETE statement. Must be a single statement.
    pub query: String,
    /// Positional parameters bound to `?` placeholders.
    #[serde(default)]
    pub params: Vec<SqlParam>,
}

/// Output from the write_query tool.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct WriteQueryOutput {
    /// Rows affected by the statement.
    pub affected_rows: u64,
    /// Human-readable completion message.
    pub message: String,
}

pub struct WriteToolHandler {
    executor: QueryExecutor,
    allow_writes: bool,
}

impl WriteToolHandler {
    pub fn new(executor: QueryExecutor, allow_writes: bool) -> Self {
        Self {
            executor,
            allow_writes,
        }
    }

    pub async fn write_query(&self, input: WriteQueryInput) -> ConnxResult<WriteQueryOutput> {
        let fingerprint = audit::fingerprint(&input.query);
        let result = self.run(input).await;
        match &result {
            Ok(out) => {
                AuditRecord::success(fingerprint, OperationKind::Write, out.affected_rows).emit()
            }
            Err(e) => AuditRecord::failure(fingerprint, OperationKind::Write, e).emit(),
        }
        result
    }

    async fn run(&self, input: WriteQueryInput) -> ConnxResult<WriteQueryOutput> {
        // Checked before classification: a disabled server rejects every
        // write request outright, valid or not.
        if !self.allow_writes {
            return Err(ConnxError::WritesDisabled);
        }

        guard::classify_write(&input.query, input.operation)?;

        let affected_rows = self.executor.execute(input.query, input.params).await?;
        info!(
            operation = input.operation.verb(),
            affected_rows, "write executed"
        );
        Ok(WriteQueryOutput {
            affected_rows,
            message: format!("{} completed successfully.", input.operation.label()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_deserialization() {
        let input: WriteQueryInput = serde_json::from_str(
            r#"{"operation": "update", "query": "UPDATE T SET A = ? WHERE B = ?", "params": [1, "x"]}"#,
        )
        .unwrap();
        assert_eq!(input.operation, WriteOp::Update);
        assert_eq!(input.params.len(), 2);
    }

    #[test]
    fn test_unknown_operation_rejected_at_deserialization() {
        let result: Result<WriteQueryInput, _> =
            serde_json::from_str(r#"{"operation": "merge", "query": "MERGE ..."}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_output_message() {
        let output = WriteQueryOutput {
            affected_rows: 3,
            message: format!("{} completed successfully.", WriteOp::Delete.label()),
        };
        assert_eq!(output.message, "Delete completed successfully.");
    }
}
