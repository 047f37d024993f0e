//! MCP service implementation using rmcp.
//!
//! This module defines the ConnxService struct with all CONNX tools exposed
//! via the MCP protocol using the rmcp framework's macros.

use crate::config::Config;
use crate::db::QueryExecutor;
use crate::error::ConnxError;
use crate::tools::entities::{
    CountEntitiesInput, CountEntitiesOutput, CustomersByStateOutput, DescribeEntitiesOutput,
    EntityToolHandler,
};
use crate::tools::lookup::{
    CustomerCitiesOutput, CustomerOrdersInput, CustomerOrdersOutput, CustomersMissingPhoneOutput,
    FindCustomersInput, FindCustomersOutput, GetCustomerInput, GetCustomerOutput,
    LookupToolHandler,
};
use crate::tools::query::{QueryToolHandler, ReadQueryInput, ReadQueryOutput};
use crate::tools::schema::{
    DescribeTableInput, DescribeTableOutput, ListTablesOutput, SchemaToolHandler,
};
use crate::tools::write::{WriteQueryInput, WriteQueryOutput, WriteToolHandler};
use rmcp::Json;
use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::tool::ToolRouter,
    handler::server::wrapper::Parameters,
    model::{Implementation, ProtocolVersion, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router,
};

#[derive(Clone)]
pub struct ConnxService {
    /// Executor shared by all tools; owns the provider and limits.
    executor: QueryExecutor,
    /// Global write-enablement switch (CONNX_ALLOW_WRITES).
    allow_writes: bool,
    /// Tool router for MCP tool dispatch (auto-generated)
    tool_router: ToolRouter<Self>,
}

impl ConnxService {
    pub fn new(executor: QueryExecutor, config: &Config) -> Self {
        Self {
            executor,
            allow_writes: config.allow_writes,
            tool_router: Self::tool_router(),
        }
    }
}

#[tool_router]
impl ConnxService {
    #[tool(
        description = "Execute a single SELECT statement against the CONNX data source.\nUse ? placeholders with params for values; semicolons and write verbs are rejected.\nANSI SQL-92 only: no LIMIT/TOP, results are truncated at max_rows instead.\nVSAM CHAR columns are fixed-width; values come back right-trimmed."
    )]
    async fn read_query(
        &self,
        Parameters(input): Parameters<ReadQueryInput>,
    ) -> Result<Json<ReadQueryOutput>, McpError> {
        let handler = QueryToolHandler::new(self.executor.clone());
        handler
            .read_query(input)
            .await
            .map(Json)
            .map_err(|e: ConnxError| e.into())
    }

    #[tool(
        description = "Execute a single INSERT, UPDATE, or DELETE statement.\nThe operation field must match the statement verb.\nRequires CONNX_ALLOW_WRITES=true; otherwise every write is rejected.\nRuns in its own transaction: committed on success, rolled back on failure."
    )]
    async fn write_query(
        &self,
        Parameters(input): Parameters<WriteQueryInput>,
    ) -> Result<Json<WriteQueryOutput>, McpError> {
        let handler = WriteToolHandler::new(self.executor.clone(), self.allow_writes);
        handler
            .write_query(input)
            .await
            .map(Json)
            .map_err(|e: ConnxError| e.into())
    }

    #[tool(
        description = "Find customers by US state, with an optional city filter.\nAccepts a 2-letter code or a full state name (\"Virginia\" is normalized to \"VA\").\nReturns up to max_rows customer records, sorted by name."
    )]
    async fn find_customers(
        &self,
        Parameters(input): Parameters<FindCustomersInput>,
    ) -> Result<Json<FindCustomersOutput>, McpError> {
        let handler = LookupToolHandler::new(self.executor.clone());
        handler
            .find_customers(input)
            .await
            .map(Json)
            .map_err(|e: ConnxError| e.into())
    }

    #[tool(description = "Fetch a single customer record by customer ID.\nReturns null if no customer matches.")]
    async fn get_customer(
        &self,
        Parameters(input): Parameters<GetCustomerInput>,
    ) -> Result<Json<GetCustomerOutput>, McpError> {
        let handler = LookupToolHandler::new(self.executor.clone());
        handler
            .get_customer(input)
            .await
            .map(Json)
            .map_err(|e: ConnxError| e.into())
    }

    #[tool(description = "List the distinct cities customers live in, alphabetically.")]
    async fn customer_cities(&self) -> Result<Json<CustomerCitiesOutput>, McpError> {
        let handler = LookupToolHandler::new(self.executor.clone());
        handler
            .customer_cities()
            .await
            .map(Json)
            .map_err(|e: ConnxError| e.into())
    }

    #[tool(description = "List customers whose phone number field is blank.")]
    async fn customers_missing_phone(
        &self,
    ) -> Result<Json<CustomersMissingPhoneOutput>, McpError> {
        let handler = LookupToolHandler::new(self.executor.clone());
        handler
            .customers_missing_phone()
            .await
            .map(Json)
            .map_err(|e: ConnxError| e.into())
    }

    #[tool(
        description = "Get a customer's orders for a specific product, newest first.\nJoins orders to customers and products; the product name is matched case-insensitively.\nReturns order IDs, dates, and quantities up to max_rows."
    )]
    async fn customer_orders_for_product(
        &self,
        Parameters(input): Parameters<CustomerOrdersInput>,
    ) -> Result<Json<CustomerOrdersOutput>, McpError> {
        let handler = LookupToolHandler::new(self.executor.clone());
        handler
            .customer_orders_for_product(input)
            .await
            .map(Json)
            .map_err(|e: ConnxError| e.into())
    }

    #[tool(
        description = "Count rows for a known business entity.\nAccepts natural-language names: customers/clients/accounts, orders/purchases, products/inventory.\nUnknown entities are rejected; call describe_entities for the full list."
    )]
    async fn count_entities(
        &self,
        Parameters(input): Parameters<CountEntitiesInput>,
    ) -> Result<Json<CountEntitiesOutput>, McpError> {
        let handler = EntityToolHandler::new(self.executor.clone());
        handler
            .count_entities(input)
            .await
            .map(Json)
            .map_err(|e: ConnxError| e.into())
    }

    #[tool(description = "Count customers grouped by state, descending by count.")]
    async fn customers_by_state(&self) -> Result<Json<CustomersByStateOutput>, McpError> {
        let handler = EntityToolHandler::new(self.executor.clone());
        handler
            .customers_by_state()
            .await
            .map(Json)
            .map_err(|e: ConnxError| e.into())
    }

    #[tool(
        description = "Describe the known business entities, their aliases, and the tables backing them.\nUse this instead of guessing table names."
    )]
    async fn describe_entities(&self) -> Json<DescribeEntitiesOutput> {
        let handler = EntityToolHandler::new(self.executor.clone());
        Json(handler.describe_entities())
    }

    #[tool(description = "List the tables visible through the CONNX catalog.")]
    async fn list_tables(&self) -> Result<Json<ListTablesOutput>, McpError> {
        let handler = SchemaToolHandler::new(self.executor.clone());
        handler
            .list_tables()
            .await
            .map(Json)
            .map_err(|e: ConnxError| e.into())
    }

    #[tool(
        description = "List the columns of a table with their data types.\nTable name is matched against the catalog, e.g. \"CUSTOMERS_VSAM\"."
    )]
    async fn describe_table(
        &self,
        Parameters(input): Parameters<DescribeTableInput>,
    ) -> Result<Json<DescribeTableOutput>, McpError> {
        let handler = SchemaToolHandler::new(self.executor.clone());
        handler
            .describe_table(input)
            .await
            .map(Json)
            .map_err(|e: ConnxError| e.into())
    }
}

#[tool_handler]
impl ServerHandler for ConnxService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_03_26,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "connx-mcp-server".to_owned(),
                title: Some("CONNX MCP Server".to_owned()),
                version: env!("CARGO_PKG_VERSION").to_owned(),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Tools for querying mainframe VSAM data through a CONNX ODBC gateway.\n\
                \n\
                ## Data source\n\
                - Tables live under `daea_Mainframe_VSAM.dbo` (e.g. CUSTOMERS_VSAM,\n\
                  ORDERS_VSAM, PRODUCTS_VSAM). Call `describe_entities` or `list_tables`\n\
                  instead of guessing names.\n\
                - CHAR columns are fixed-width and space-padded; returned values are\n\
                  already right-trimmed. Use RTRIM() in your own WHERE clauses.\n\
                - The SQL dialect is ANSI SQL-92: no LIMIT or TOP. Use max_rows; results\n\
                  beyond it are truncated and flagged.\n\
                \n\
                ## Reads and writes\n\
                - `read_query` accepts exactly one SELECT statement. Use ? placeholders\n\
                  with `params` rather than splicing values into the SQL.\n\
                - `write_query` requires the server to run with CONNX_ALLOW_WRITES=true\n\
                  and the `operation` field to match the statement verb.\n\
                - Semicolons are always rejected; send one statement per call.\n\
                \n\
                ## Purpose-built lookups\n\
                Prefer `find_customers`, `get_customer`, `customer_orders_for_product`,\n\
                `count_entities`, and `customers_by_state` over hand-written SQL for\n\
                those questions."
                    .to_string(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::provider::ConnectionProvider;
    use crate::error::ConnxResult;
    use crate::models::{RowSet, SqlParam};
    use std::sync::Arc;

    struct NoopProvider;

    impl ConnectionProvider for NoopProvider {
        fn fetch_rows(
            &self,
            _sql: &str,
            _params: &[SqlParam],
            _fetch_limit: usize,
        ) -> ConnxResult<RowSet> {
            Ok(RowSet::default())
        }

        fn execute_write(
            &self,
            _sql: &str,
            _params: &[SqlParam],
            _cancel: &std::sync::atomic::AtomicBool,
        ) -> ConnxResult<u64> {
            Ok(0)
        }
    }

    fn create_test_service() -> ConnxService {
        let config = Config {
            dsn: "TEST".to_string(),
            ..Config::default_config()
        };
        let executor = QueryExecutor::new(Arc::new(NoopProvider), &config);
        ConnxService::new(executor, &config)
    }

    #[test]
    fn test_service_creation() {
        let _service = create_test_service();
    }

    #[test]
    fn test_server_info() {
        let service = create_test_service();
        let info = service.get_info();
        assert_eq!(info.server_info.name, "connx-mcp-server");
        assert!(info.capabilities.tools.is_some());
        assert!(info.instructions.is_some());
    }
}
