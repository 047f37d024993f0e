//! Schema discovery tools.
//!
//! Thin pass-throughs over INFORMATION_SCHEMA. The per-table lookup binds
//! the table name as a parameter like any other value.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::audit::{self, AuditRecord, OperationKind};
use crate::db::QueryExecutor;
use crate::error::ConnxResult;
use crate::models::SqlParam;

const LIST_TABLES_SQL: &str =
    "SELECT DISTINCT TABLE_NAME FROM INFORMATION_SCHEMA.COLUMNS ORDER BY TABLE_NAME";

const DESCRIBE_TABLE_SQL: &str = "\
    SELECT TABLE_NAME, COLUMN_NAME, DATA_TYPE \
    FROM INFORMATION_SCHEMA.COLUMNS \
    WHERE TABLE_NAME = ?";

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct ListTablesOutput {
    pub tables: Vec<String>,
    pub count: usize,
}

/// Input for the describe_table tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct DescribeTableInput {
    /// Unqualified table name (e.g. "CUSTOMERS_VSAM").
    pub table_name: String,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct DescribeTableOutput {
    /// One row per column: { TABLE_NAME, COLUMN_NAME, DATA_TYPE }.
    pub columns: Vec<serde_json::Map<String, JsonValue>>,
    pub count: usize,
}

pub struct SchemaToolHandler {
    executor: QueryExecutor,
}

impl SchemaToolHandler {
    pub fn new(executor: QueryExecutor) -> Self {
        Self { executor }
    }

    pub async fn list_tables(&self) -> ConnxResult<ListTablesOutput> {
        let fingerprint = audit::fingerprint(LIST_TABLES_SQL);
        let result = self
            .executor
            .fetch(LIST_TABLES_SQL.to_string(), vec![], None)
            .await;
        match &result {
            Ok(rows) => {
                AuditRecord::success(fingerprint, OperationKind::Read, rows.row_count() as u64)
                    .emit()
            }
            Err(e) => AuditRecord::failure(fingerprint, OperationKind::Read, e).emit(),
        }

        let tables: Vec<String> = result?
            .rows
            .into_iter()
            .filter_map(|row| {
                row.get("TABLE_NAME")
                    .and_then(JsonValue::as_str)
                    .map(str::to_string)
            })
            .collect();
        let count = tables.len();
        Ok(ListTablesOutput { tables, count })
    }

    pub async fn describe_table(&self, input: DescribeTableInput) -> ConnxResult<DescribeTableOutput> {
        let params = vec![SqlParam::Text(input.table_name.trim().to_string())];

        let fingerprint = audit::fingerprint(DESCRIBE_TABLE_SQL);
        let result = self
            .executor
            .fetch(DESCRIBE_TABLE_SQL.to_string(), params, None)
            .await;
        match &result {
            Ok(rows) => {
                AuditRecord::success(fingerprint, OperationKind::Read, rows.row_count() as u64)
                    .emit()
            }
            Err(e) => AuditRecord::failure(fingerprint, OperationKind::Read, e).emit(),
        }

        let row_set = result?;
        let count = row_set.row_count();
        Ok(DescribeTableOutput {
            columns: row_set.rows,
            count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_table_binds_name() {
        assert!(DESCRIBE_TABLE_SQL.contains("TABLE_NAME = ?"));
        assert!(!DESCRIBE_TABLE_SQL.contains(';'));
    }

    #[test]
    fn test_describe_input_deserialization() {
        let input: DescribeTableInput =
            serde_json::from_str(r#"{"table_name": "CUSTOMERS_VSAM"}"#).unwrap();
        assert_eq!(input.table_name, "CUSTOMERS_VSAM");
    }
}
