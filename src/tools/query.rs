//! Free-form SELECT tool.
//!
//! The only tool that accepts raw SQL for reads. The guard admits exactly
//! one SELECT statement; everything else is rejected before the driver is
//! touched. One audit record is emitted per attempt, keyed by the query
//! fingerprint rather than its text.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::info;

use crate::audit::{self, AuditRecord, OperationKind};
use crate::db::QueryExecutor;
use crate::error::ConnxResult;
use crate::models::SqlParam;
use crate::tools::guard;

/// Input for the read_query tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ReadQueryInput {
    /// SQL SELECT statement. Must be a single statement; writes are rejected.
    pub query: String,
    /// Positional parameters bound to `?` placeholders.
    #[serde(default)]
    pub params: Vec<SqlParam>,
    /// Maximum rows to return; clamped to the configured ceiling.
    #[serde(default)]
    pub max_rows: Option<u32>,
}

/// Output from the read_query tool.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct ReadQueryOutput {
    /// Result rows as column-name to value maps.
    pub results: Vec<serde_json::Map<String, JsonValue>>,
    /// Number of rows returned.
    pub count: usize,
    /// True if the result was cut off at the row limit.
    pub truncated: bool,
}

pub struct QueryToolHandler {
    executor: QueryExecutor,
}

impl QueryToolHandler {
    pub fn new(executor: QueryExecutor) -> Self {
        Self { executor }
    }

    pub async fn read_query(&self, input: ReadQueryInput) -> ConnxResult<ReadQueryOutput> {
        let fingerprint = audit::fingerprint(&input.query);
        let result = self.run(input).await;
        match &result {
            Ok(out) => {
                AuditRecord::success(fingerprint, OperationKind::Read, out.count as u64).emit()
            }
            Err(e) => AuditRecord::failure(fingerprint, OperationKind::Read, e).emit(),
        }
        result
    }

    async fn run(&self, input: ReadQueryInput) -> ConnxResult<ReadQueryOutput> {
        guard::classify_read(&input.query)?;

        let row_set = self
            .executor
            .fetch(
                input.query,
                input.params,
                input.max_rows.map(|n| n as usize),
            )
            .await?;

        let count = row_set.row_count();
        info!(count, truncated = row_set.truncated, "read query executed");
        Ok(ReadQueryOutput {
            results: row_set.rows,
            count,
            truncated: row_set.truncated,
        })
    }
}
