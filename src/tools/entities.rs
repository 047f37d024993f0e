//! Entity-level tools: counts and registry description.
//!
//! Table names for counting come exclusively from the static entity
//! registry; caller input selects an entry, it never reaches the SQL text.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::info;

use crate::audit::{self, AuditRecord, OperationKind};
use crate::db::QueryExecutor;
use crate::error::{ConnxError, ConnxResult};
use crate::models::{resolve_entity, ENTITIES};

const CUSTOMERS_BY_STATE_SQL: &str = "\
    SELECT \
        RTRIM(CUSTOMERSTATE) AS STATE, \
        COUNT(*) AS CUSTOMER_COUNT \
    FROM daea_Mainframe_VSAM.dbo.CUSTOMERS_VSAM \
    GROUP BY RTRIM(CUSTOMERSTATE) \
    ORDER BY CUSTOMER_COUNT DESC";

/// Input for the count_entities tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CountEntitiesInput {
    /// Business entity name or alias (e.g. "customers", "clients", "orders").
    pub entity: String,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct CountEntitiesOutput {
    /// The entity name as given by the caller.
    pub entity: String,
    /// Canonical table the count ran against.
    pub table: String,
    /// Total row count.
    pub total: i64,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct CustomersByStateOutput {
    /// One row per state: { STATE, CUSTOMER_COUNT }, descending by count.
    pub states: Vec<serde_json::Map<String, JsonValue>>,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct EntityDescription {
    pub entity: String,
    pub aliases: Vec<String>,
    pub table: String,
    pub primary_key: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct DescribeEntitiesOutput {
    pub entities: Vec<EntityDescription>,
}

pub struct EntityToolHandler {
    executor: QueryExecutor,
}

impl EntityToolHandler {
    pub fn new(executor: QueryExecutor) -> Self {
        Self { executor }
    }

    pub async fn count_entities(&self, input: CountEntitiesInput) -> ConnxResult<CountEntitiesOutput> {
        let Some(def) = resolve_entity(&input.entity) else {
            return Err(ConnxError::validation(format!(
                "Unknown entity: {}",
                input.entity
            )));
        };

        let sql = format!("SELECT COUNT(*) AS TOTAL_COUNT FROM {}", def.table);
        let fingerprint = audit::fingerprint(&sql);
        // Extracting the total can still fail, so it happens before the
        // audit record is emitted.
        let result = self.executor.fetch(sql, vec![], Some(1)).await.and_then(|rows| {
            rows.first_value("TOTAL_COUNT")
                .and_then(JsonValue::as_i64)
                .ok_or_else(|| ConnxError::execution("Count query returned no total.", None))
        });
        match &result {
            Ok(_) => AuditRecord::success(fingerprint, OperationKind::Read, 1).emit(),
            Err(e) => AuditRecord::failure(fingerprint, OperationKind::Read, e).emit(),
        }

        let total = result?;
        info!(entity = %def.name, total, "entity count");
        Ok(CountEntitiesOutput {
            entity: input.entity,
            table: def.table.to_string(),
            total,
        })
    }

    pub async fn customers_by_state(&self) -> ConnxResult<CustomersByStateOutput> {
        let fingerprint = audit::fingerprint(CUSTOMERS_BY_STATE_SQL);
        let result = self
            .executor
            .fetch(CUSTOMERS_BY_STATE_SQL.to_string(), vec![], None)
            .await;
        match &result {
            Ok(rows) => {
                AuditRecord::success(fingerprint, OperationKind::Read, rows.row_count() as u64)
                    .emit()
            }
            Err(e) => AuditRecord::failure(fingerprint, OperationKind::Read, e).emit(),
        }

        Ok(CustomersByStateOutput {
            states: result?.rows,
        })
    }

    /// Registry dump; no driver call involved.
    pub fn describe_entities(&self) -> DescribeEntitiesOutput {
        DescribeEntitiesOutput {
            entities: ENTITIES
                .iter()
                .map(|def| EntityDescription {
                    entity: def.name.to_string(),
                    aliases: def.aliases.iter().map(|a| a.to_string()).collect(),
                    table: def.table.to_string(),
                    primary_key: def.primary_key.to_string(),
                    description: def.description.to_string(),
                })
                .collect(),
        }
    }
}
