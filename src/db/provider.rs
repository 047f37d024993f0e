//! ODBC connection provider.
//!
//! odbc-api is a synchronous library, so every method here blocks; the
//! executor wraps calls in `tokio::task::spawn_blocking`. The ODBC
//! environment is created per call to keep the provider `Send + Sync`
//! without sharing driver handles across threads. Connections are opened
//! fresh for each operation and failures surface immediately; there is no
//! pooling or retry, the caller decides whether to try again.

use std::sync::atomic::{AtomicBool, Ordering};

use odbc_api::buffers::TextRowSet;
use odbc_api::{ConnectionOptions, Cursor, Environment, ResultSetMetadata};
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::config::Config;
use crate::db::params::bind_params;
use crate::db::types::{cell_to_json, column_kind, ColumnKind};
use crate::error::{ConnxError, ConnxResult};
use crate::models::{RowSet, SqlParam};

/// Rows fetched per driver round trip.
const FETCH_BATCH_ROWS: usize = 1000;

/// Upper bound on a single text field, in bytes. VSAM records are small;
/// this mainly guards against a driver reporting an unbounded column.
const MAX_FIELD_BYTES: usize = 8192;

/// Blocking access to the data source.
///
/// Tools never talk to the driver directly; they go through this trait so
/// tests can substitute an in-memory implementation.
pub trait ConnectionProvider: Send + Sync {
    /// Run a statement expected to produce rows. Fetches at most
    /// `fetch_limit` rows; the caller detects truncation by asking for one
    /// row more than it intends to return.
    fn fetch_rows(&self, sql: &str, params: &[SqlParam], fetch_limit: usize)
        -> ConnxResult<RowSet>;

    /// Run a modifying statement and return the affected row count.
    ///
    /// `cancel` is set by the executor when the caller has stopped waiting;
    /// implementations must not commit once it reads true.
    fn execute_write(&self, sql: &str, params: &[SqlParam], cancel: &AtomicBool)
        -> ConnxResult<u64>;
}

/// Provider backed by an ODBC DSN.
pub struct OdbcProvider {
    dsn: String,
    user: String,
    password: String,
    database: Option<String>,
    login_timeout_secs: u32,
}

impl OdbcProvider {
    pub fn from_config(config: &Config) -> Self {
        Self {
            dsn: config.dsn.clone(),
            user: config.user.clone(),
            password: config.password.clone(),
            database: if config.database.trim().is_empty() {
                None
            } else {
                Some(config.database.clone())
            },
            login_timeout_secs: config.timeout.max(1) as u32,
        }
    }

    /// Full connection string, including credentials. Never log this.
    fn connection_string(&self) -> String {
        let mut s = format!("DSN={};UID={};PWD={}", self.dsn, self.user, self.password);
        if let Some(db) = &self.database {
            s.push_str(";DATABASE=");
            s.push_str(db);
        }
        s
    }

    /// Connection string with the password masked, safe for logs.
    pub fn redacted_connection_string(&self) -> String {
        let mut s = format!("DSN={};UID={};PWD=***", self.dsn, self.user);
        if let Some(db) = &self.database {
            s.push_str(";DATABASE=");
            s.push_str(db);
        }
        s
    }

    fn connection_options(&self) -> ConnectionOptions {
        let mut opts = ConnectionOptions::default();
        opts.login_timeout_sec = Some(self.login_timeout_secs);
        opts
    }
}

impl ConnectionProvider for OdbcProvider {
    fn fetch_rows(
        &self,
        sql: &str,
        params: &[SqlParam],
        fetch_limit: usize,
    ) -> ConnxResult<RowSet> {
        let env = Environment::new()?;
        let conn = env
            .connect_with_connection_string(&self.connection_string(), self.connection_options())?;
        debug!(dsn = %self.dsn, "connected");

        let bound = bind_params(params);
        let maybe_cursor = conn.execute(sql, bound.as_slice())?;
        let Some(mut cursor) = maybe_cursor else {
            return Err(ConnxError::empty_result(
                "Statement produced no result set.",
            ));
        };

        let num_cols = cursor.num_result_cols()? as u16;
        if num_cols == 0 {
            return Err(ConnxError::empty_result(
                "Statement produced no result columns.",
            ));
        }

        let mut columns = Vec::with_capacity(num_cols as usize);
        let mut kinds: Vec<ColumnKind> = Vec::with_capacity(num_cols as usize);
        for i in 1..=num_cols {
            let name = cursor.col_name(i)?;
            columns.push(if name.is_empty() {
                format!("COL{i}")
            } else {
                name
            });
            kinds.push(column_kind(&cursor.col_data_type(i)?));
        }

        let batch_size = fetch_limit.clamp(1, FETCH_BATCH_ROWS);
        let buffer = TextRowSet::for_cursor(batch_size, &mut cursor, Some(MAX_FIELD_BYTES))?;
        let mut row_set_cursor = cursor.bind_buffer(buffer)?;

        let mut rows: Vec<serde_json::Map<String, JsonValue>> = Vec::new();
        'fetch: while let Some(batch) = row_set_cursor.fetch()? {
            for row_idx in 0..batch.num_rows() {
                if rows.len() >= fetch_limit {
                    break 'fetch;
                }
                let mut row = serde_json::Map::with_capacity(columns.len());
                for (col_idx, name) in columns.iter().enumerate() {
                    let value = cell_to_json(kinds[col_idx], batch.at(col_idx, row_idx));
                    row.insert(name.clone(), value);
                }
                rows.push(row);
            }
        }

        Ok(RowSet {
            columns,
            rows,
            truncated: false,
        })
    }

    fn execute_write(
        &self,
        sql: &str,
        params: &[SqlParam],
        cancel: &AtomicBool,
    ) -> ConnxResult<u64> {
        let env = Environment::new()?;
        let conn = env
            .connect_with_connection_string(&self.connection_string(), self.connection_options())?;
        conn.set_autocommit(false)?;

        let bound = bind_params(params);
        let mut stmt = conn.preallocate()?;
        match stmt.execute(sql, bound.as_slice()) {
            Ok(_) => {}
            Err(e) => {
                let _ = conn.rollback();
                return Err(e.into());
            }
        }

        let affected = match stmt.row_count() {
            Ok(count) => count.unwrap_or(0) as u64,
            Err(e) => {
                let _ = conn.rollback();
                return Err(e.into());
            }
        };

        // The executor abandons this task when it times out; a write the
        // caller was already told failed must not land.
        if cancel.load(Ordering::SeqCst) {
            let _ = conn.rollback();
            return Err(ConnxError::execution(
                "Write abandoned after timeout; transaction rolled back.",
                None,
            ));
        }

        conn.commit()?;
        Ok(affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> OdbcProvider {
        OdbcProvider {
            dsn: "CONNX_VSAM".to_string(),
            user: "admin".to_string(),
            password: "supersecret".to_string(),
            database: None,
            login_timeout_secs: 30,
        }
    }

    #[test]
    fn test_connection_string() {
        assert_eq!(
            provider().connection_string(),
            "DSN=CONNX_VSAM;UID=admin;PWD=supersecret"
        );
    }

    #[test]
    fn test_connection_string_with_database() {
        let mut p = provider();
        p.database = Some("daea_Mainframe_VSAM".to_string());
        assert_eq!(
            p.connection_string(),
            "DSN=CONNX_VSAM;UID=admin;PWD=supersecret;DATABASE=daea_Mainframe_VSAM"
        );
    }

    #[test]
    fn test_redacted_connection_string_hides_password() {
        let redacted = provider().redacted_connection_string();
        assert!(redacted.contains("PWD=***"));
        assert!(!redacted.contains("supersecret"));
        assert!(redacted.contains("UID=admin"));
    }

    #[test]
    fn test_login_timeout_floors_at_one_second() {
        let config = Config {
            dsn: "X".to_string(),
            timeout: 0,
            ..Config::default_config()
        };
        let p = OdbcProvider::from_config(&config);
        assert_eq!(p.login_timeout_secs, 1);
    }
}
