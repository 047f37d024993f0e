//! Customer lookup tools backed by fixed SQL templates.
//!
//! Arguments are always bound as parameters, never spliced into the SQL.
//! The backing store is fixed-width VSAM reached over ANSI SQL-92, which
//! shapes the templates: RTRIM on every CHAR column, UPPER for
//! case-insensitive comparison, and no LIMIT/TOP (row limits are enforced
//! by the executor's fetch cutoff).

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::info;

use crate::audit::{self, AuditRecord, OperationKind};
use crate::db::QueryExecutor;
use crate::error::ConnxResult;
use crate::models::SqlParam;

const FIND_CUSTOMERS_SQL: &str = "\
    SELECT \
        RTRIM(CUSTOMERID)       AS CUSTOMERID, \
        RTRIM(CUSTOMERNAME)     AS CUSTOMERNAME, \
        RTRIM(CUSTOMERADDRESS)  AS CUSTOMERADDRESS, \
        RTRIM(CUSTOMERCITY)     AS CUSTOMERCITY, \
        RTRIM(CUSTOMERSTATE)    AS CUSTOMERSTATE, \
        RTRIM(CUSTOMERZIP)      AS CUSTOMERZIP, \
        RTRIM(CUSTOMERCOUNTRY)  AS CUSTOMERCOUNTRY, \
        RTRIM(CUSTOMERPHONE)    AS CUSTOMERPHONE \
    FROM daea_Mainframe_VSAM.dbo.CUSTOMERS_VSAM \
    WHERE UPPER(RTRIM(CUSTOMERSTATE)) = UPPER(?)";

const FIND_CUSTOMERS_CITY_CLAUSE: &str = " AND UPPER(RTRIM(CUSTOMERCITY)) = UPPER(?)";

const FIND_CUSTOMERS_ORDER: &str = " ORDER BY RTRIM(CUSTOMERNAME)";

const CUSTOMER_CITIES_SQL: &str = "\
    SELECT DISTINCT RTRIM(CUSTOMERCITY) AS CITY \
    FROM daea_Mainframe_VSAM.dbo.CUSTOMERS_VSAM \
    ORDER BY CITY";

const CUSTOMERS_MISSING_PHONE_SQL: &str = "\
    SELECT \
        RTRIM(CUSTOMERID)   AS CUSTOMERID, \
        RTRIM(CUSTOMERNAME) AS CUSTOMERNAME \
    FROM daea_Mainframe_VSAM.dbo.CUSTOMERS_VSAM \
    WHERE RTRIM(CUSTOMERPHONE) = ''";

const CUSTOMER_ORDERS_FOR_PRODUCT_SQL: &str = "\
    SELECT \
        o.ORDERID, \
        o.ORDERDATE, \
        o.PRODUCTQUANTITY, \
        RTRIM(p.PRODUCTNAME)  AS PRODUCTNAME, \
        RTRIM(c.CUSTOMERNAME) AS CUSTOMERNAME \
    FROM daea_Mainframe_VSAM.dbo.ORDERS_VSAM o \
    INNER JOIN daea_Mainframe_VSAM.dbo.CUSTOMERS_VSAM c \
        ON RTRIM(c.CUSTOMERID) = RTRIM(o.CUSTOMERID) \
    INNER JOIN daea_Mainframe_VSAM.dbo.PRODUCTS_VSAM p \
        ON o.PRODUCTID = p.PRODUCTID \
    WHERE RTRIM(c.CUSTOMERID) = ? \
      AND UPPER(RTRIM(p.PRODUCTNAME)) = UPPER(?) \
    ORDER BY o.ORDERDATE DESC";

const GET_CUSTOMER_SQL: &str = "\
    SELECT \
        RTRIM(CUSTOMERID)       AS CUSTOMERID, \
        RTRIM(CUSTOMERNAME)     AS CUSTOMERNAME, \
        RTRIM(CUSTOMERADDRESS)  AS CUSTOMERADDRESS, \
        RTRIM(CUSTOMERCITY)     AS CUSTOMERCITY, \
        RTRIM(CUSTOMERSTATE)    AS CUSTOMERSTATE, \
        RTRIM(CUSTOMERZIP)      AS CUSTOMERZIP, \
        RTRIM(CUSTOMERPHONE)    AS CUSTOMERPHONE \
    FROM daea_Mainframe_VSAM.dbo.CUSTOMERS_VSAM \
    WHERE RTRIM(CUSTOMERID) = ?";

/// Full US state names mapped to the 2-letter codes the state column holds.
static STATE_CODES: &[(&str, &str)] = &[
    ("alabama", "AL"),
    ("alaska", "AK"),
    ("arizona", "AZ"),
    ("arkansas", "AR"),
    ("california", "CA"),
    ("colorado", "CO"),
    ("connecticut", "CT"),
    ("delaware", "DE"),
    ("florida", "FL"),
    ("georgia", "GA"),
    ("hawaii", "HI"),
    ("idaho", "ID"),
    ("illinois", "IL"),
    ("indiana", "IN"),
    ("iowa", "IA"),
    ("kansas", "KS"),
    ("kentucky", "KY"),
    ("louisiana", "LA"),
    ("maine", "ME"),
    ("maryland", "MD"),
    ("massachusetts", "MA"),
    ("michigan", "MI"),
    ("minnesota", "MN"),
    ("mississippi", "MS"),
    ("missouri", "MO"),
    ("montana", "MT"),
    ("nebraska", "NE"),
    ("nevada", "NV"),
    ("new hampshire", "NH"),
    ("new jersey", "NJ"),
    ("new mexico", "NM"),
    ("new york", "NY"),
    ("north carolina", "NC"),
    ("north dakota", "ND"),
    ("ohio", "OH"),
    ("oklahoma", "OK"),
    ("oregon", "OR"),
    ("pennsylvania", "PA"),
    ("rhode island", "RI"),
    ("south carolina", "SC"),
    ("south dakota", "SD"),
    ("tennessee", "TN"),
    ("texas", "TX"),
    ("utah", "UT"),
    ("vermont", "VT"),
    ("virginia", "VA"),
    ("washington", "WA"),
    ("west virginia", "WV"),
    ("wisconsin", "WI"),
    ("wyoming", "WY"),
];

/// Normalize a state argument to the 2-letter code stored in the column.
/// Full names map through the table; anything else passes through trimmed
/// (already-abbreviated input stays as given, comparison is UPPER-folded
/// in SQL).
pub fn normalize_state(state: &str) -> String {
    let trimmed = state.trim();
    let lower = trimmed.to_lowercase();
    STATE_CODES
        .iter()
        .find(|(name, _)| *name == lower)
        .map(|(_, code)| (*code).to_string())
        .unwrap_or_else(|| trimmed.to_string())
}

/// Input for the find_customers tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct FindCustomersInput {
    /// US state, as a 2-letter code or full name (e.g. "VA" or "Virginia").
    pub state: String,
    /// Optional city filter, matched case-insensitively.
    #[serde(default)]
    pub city: Option<String>,
    /// Maximum rows to return; clamped to the configured ceiling.
    #[serde(default)]
    pub max_rows: Option<u32>,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct FindCustomersOutput {
    pub results: Vec<serde_json::Map<String, JsonValue>>,
    pub count: usize,
    pub truncated: bool,
}

/// Input for the get_customer tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GetCustomerInput {
    /// Customer identifier.
    pub customer_id: String,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct GetCustomerOutput {
    /// The matching customer record, or null when no row matched.
    pub customer: Option<serde_json::Map<String, JsonValue>>,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct CustomerCitiesOutput {
    /// Distinct cities customers live in, alphabetical.
    pub cities: Vec<serde_json::Map<String, JsonValue>>,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct CustomersMissingPhoneOutput {
    pub results: Vec<serde_json::Map<String, JsonValue>>,
    pub count: usize,
    pub truncated: bool,
}

/// Input for the customer_orders_for_product tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CustomerOrdersInput {
    /// Customer identifier.
    pub customer_id: String,
    /// Product name, matched case-insensitively.
    pub product_name: String,
    /// Maximum orders to return; clamped to the configured ceiling.
    #[serde(default)]
    pub max_rows: Option<u32>,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct CustomerOrdersOutput {
    pub customer_id: String,
    pub product_name: String,
    /// Matching orders, newest first.
    pub orders: Vec<serde_json::Map<String, JsonValue>>,
    pub count: usize,
    pub truncated: bool,
}

pub struct LookupToolHandler {
    executor: QueryExecutor,
}

impl LookupToolHandler {
    pub fn new(executor: QueryExecutor) -> Self {
        Self { executor }
    }

    pub async fn find_customers(&self, input: FindCustomersInput) -> ConnxResult<FindCustomersOutput> {
        let state_code = normalize_state(&input.state);

        let mut sql = String::from(FIND_CUSTOMERS_SQL);
        let mut params = vec![SqlParam::Text(state_code)];
        if let Some(city) = input.city.as_deref() {
            let city = city.trim();
            if !city.is_empty() {
                sql.push_str(FIND_CUSTOMERS_CITY_CLAUSE);
                params.push(SqlParam::Text(city.to_string()));
            }
        }
        sql.push_str(FIND_CUSTOMERS_ORDER);

        let fingerprint = audit::fingerprint(&sql);
        let result = self
            .executor
            .fetch(sql, params, input.max_rows.map(|n| n as usize))
            .await;
        match &result {
            Ok(rows) => AuditRecord::success(
                fingerprint,
                OperationKind::Read,
                rows.row_count() as u64,
            )
            .emit(),
            Err(e) => AuditRecord::failure(fingerprint, OperationKind::Read, e).emit(),
        }

        let row_set = result?;
        let count = row_set.row_count();
        info!(count, truncated = row_set.truncated, "customer lookup");
        Ok(FindCustomersOutput {
            results: row_set.rows,
            count,
            truncated: row_set.truncated,
        })
    }

    pub async fn customer_cities(&self) -> ConnxResult<CustomerCitiesOutput> {
        let fingerprint = audit::fingerprint(CUSTOMER_CITIES_SQL);
        let result = self
            .executor
            .fetch(CUSTOMER_CITIES_SQL.to_string(), vec![], None)
            .await;
        match &result {
            Ok(rows) => AuditRecord::success(
                fingerprint,
                OperationKind::Read,
                rows.row_count() as u64,
            )
            .emit(),
            Err(e) => AuditRecord::failure(fingerprint, OperationKind::Read, e).emit(),
        }

        Ok(CustomerCitiesOutput {
            cities: result?.rows,
        })
    }

    pub async fn customers_missing_phone(&self) -> ConnxResult<CustomersMissingPhoneOutput> {
        let fingerprint = audit::fingerprint(CUSTOMERS_MISSING_PHONE_SQL);
        let result = self
            .executor
            .fetch(CUSTOMERS_MISSING_PHONE_SQL.to_string(), vec![], None)
            .await;
        match &result {
            Ok(rows) => AuditRecord::success(
                fingerprint,
                OperationKind::Read,
                rows.row_count() as u64,
            )
            .emit(),
            Err(e) => AuditRecord::failure(fingerprint, OperationKind::Read, e).emit(),
        }

        let row_set = result?;
        let count = row_set.row_count();
        Ok(CustomersMissingPhoneOutput {
            results: row_set.rows,
            count,
            truncated: row_set.truncated,
        })
    }

    pub async fn customer_orders_for_product(
        &self,
        input: CustomerOrdersInput,
    ) -> ConnxResult<CustomerOrdersOutput> {
        let params = vec![
            SqlParam::Text(input.customer_id.trim().to_string()),
            SqlParam::Text(input.product_name.trim().to_string()),
        ];

        let fingerprint = audit::fingerprint(CUSTOMER_ORDERS_FOR_PRODUCT_SQL);
        let result = self
            .executor
            .fetch(
                CUSTOMER_ORDERS_FOR_PRODUCT_SQL.to_string(),
                params,
                input.max_rows.map(|n| n as usize),
            )
            .await;
        match &result {
            Ok(rows) => AuditRecord::success(
                fingerprint,
                OperationKind::Read,
                rows.row_count() as u64,
            )
            .emit(),
            Err(e) => AuditRecord::failure(fingerprint, OperationKind::Read, e).emit(),
        }

        let row_set = result?;
        let count = row_set.row_count();
        info!(count, truncated = row_set.truncated, "order lookup");
        Ok(CustomerOrdersOutput {
            customer_id: input.customer_id,
            product_name: input.product_name,
            orders: row_set.rows,
            count,
            truncated: row_set.truncated,
        })
    }

    pub async fn get_customer(&self, input: GetCustomerInput) -> ConnxResult<GetCustomerOutput> {
        let params = vec![SqlParam::Text(input.customer_id.trim().to_string())];

        let fingerprint = audit::fingerprint(GET_CUSTOMER_SQL);
        let result = self
            .executor
            .fetch(GET_CUSTOMER_SQL.to_string(), params, Some(1))
            .await;
        match &result {
            Ok(rows) => AuditRecord::success(
                fingerprint,
                OperationKind::Read,
                rows.row_count() as u64,
            )
            .emit(),
            Err(e) => AuditRecord::failure(fingerprint, OperationKind::Read, e).emit(),
        }

        let mut row_set = result?;
        let customer = if row_set.rows.is_empty() {
            None
        } else {
            Some(row_set.rows.remove(0))
        };
        Ok(GetCustomerOutput { customer })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_state_name_normalized() {
        assert_eq!(normalize_state("Virginia"), "VA");
        assert_eq!(normalize_state("new york"), "NY");
        assert_eq!(normalize_state("WEST VIRGINIA"), "WV");
    }

    #[test]
    fn test_abbreviation_passes_through() {
        assert_eq!(normalize_state("VA"), "VA");
        assert_eq!(normalize_state("tx"), "tx");
    }

    #[test]
    fn test_whitespace_trimmed() {
        assert_eq!(normalize_state("  Virginia  "), "VA");
        assert_eq!(normalize_state("  CA "), "CA");
    }

    #[test]
    fn test_unknown_value_passes_through() {
        assert_eq!(normalize_state("Nowhere"), "Nowhere");
        assert_eq!(normalize_state(""), "");
    }

    #[test]
    fn test_templates_bind_not_concatenate() {
        assert!(FIND_CUSTOMERS_SQL.contains("= UPPER(?)"));
        assert!(GET_CUSTOMER_SQL.contains("= ?"));
        assert!(!FIND_CUSTOMERS_SQL.contains(';'));
    }

    #[test]
    fn test_order_join_template_binds_both_filters() {
        assert!(CUSTOMER_ORDERS_FOR_PRODUCT_SQL.contains("WHERE RTRIM(c.CUSTOMERID) = ?"));
        assert!(CUSTOMER_ORDERS_FOR_PRODUCT_SQL.contains("UPPER(RTRIM(p.PRODUCTNAME)) = UPPER(?)"));
        assert!(CUSTOMER_ORDERS_FOR_PRODUCT_SQL.contains("ORDER BY o.ORDERDATE DESC"));
        assert!(!CUSTOMER_ORDERS_FOR_PRODUCT_SQL.contains(';'));
    }

    #[test]
    fn test_customer_orders_input_deserialization() {
        let input: CustomerOrdersInput =
            serde_json::from_str(r#"{"customer_id": "C1", "product_name": "Widget"}"#).unwrap();
        assert_eq!(input.customer_id, "C1");
        assert_eq!(input.product_name, "Widget");
        assert!(input.max_rows.is_none());
    }

    #[test]
    fn test_find_customers_input_deserialization() {
        let input: FindCustomersInput =
            serde_json::from_str(r#"{"state": "Virginia", "city": "Richmond"}"#).unwrap();
        assert_eq!(input.state, "Virginia");
        assert_eq!(input.city.as_deref(), Some("Richmond"));
        assert!(input.max_rows.is_none());
    }
}
