//! Asynchronous query execution with timeouts and row limits.
//!
//! The provider blocks, so every call runs on the blocking thread pool and
//! races a timeout. Row limits are enforced here rather than in SQL: the
//! data source speaks ANSI SQL-92, which has no LIMIT or TOP, so the
//! executor fetches one row past the caller's limit and reports truncation
//! when that extra row shows up.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tracing::warn;

use crate::config::Config;
use crate::db::provider::ConnectionProvider;
use crate::error::{ConnxError, ConnxResult};
use crate::models::{RowSet, SqlParam};

#[derive(Clone)]
pub struct QueryExecutor {
    provider: Arc<dyn ConnectionProvider>,
    query_timeout: Duration,
    max_rows: usize,
}

impl QueryExecutor {
    pub fn new(provider: Arc<dyn ConnectionProvider>, config: &Config) -> Self {
        Self {
            provider,
            query_timeout: config.timeout_duration(),
            max_rows: config.effective_max_rows() as usize,
        }
    }

    /// Configured ceiling on returned rows.
    pub fn max_rows(&self) -> usize {
        self.max_rows
    }

    /// Clamp a requested row limit to the configured maximum. Zero or absent
    /// means "the maximum".
    pub fn effective_limit(&self, requested: Option<usize>) -> usize {
        match requested {
            Some(n) if n > 0 => n.min(self.max_rows),
            _ => self.max_rows,
        }
    }

    /// Run a row-producing statement and return at most `effective_limit`
    /// rows, flagging truncation when more were available.
    pub async fn fetch(
        &self,
        sql: String,
        params: Vec<SqlParam>,
        max_rows: Option<usize>,
    ) -> ConnxResult<RowSet> {
        let limit = self.effective_limit(max_rows);
        let fetch_limit = limit + 1;

        let provider = Arc::clone(&self.provider);
        let mut row_set = self
            .run_blocking("query", move || {
                provider.fetch_rows(&sql, &params, fetch_limit)
            })
            .await?;

        if row_set.rows.len() > limit {
            row_set.rows.truncate(limit);
            row_set.truncated = true;
        }
        Ok(row_set)
    }

    /// Run a modifying statement and return the affected row count.
    ///
    /// On timeout the blocking task is abandoned but keeps running; the
    /// cancel flag tells the provider to roll back instead of committing,
    /// so a write reported as failed never lands.
    pub async fn execute(&self, sql: String, params: Vec<SqlParam>) -> ConnxResult<u64> {
        let provider = Arc::clone(&self.provider);
        let cancel = Arc::new(AtomicBool::new(false));
        let task_cancel = Arc::clone(&cancel);
        let result = self
            .run_blocking("update", move || {
                provider.execute_write(&sql, &params, &task_cancel)
            })
            .await;
        if matches!(result, Err(ConnxError::Timeout { .. })) {
            cancel.store(true, Ordering::SeqCst);
        }
        result
    }

    async fn run_blocking<T, F>(&self, operation: &'static str, f: F) -> ConnxResult<T>
    where
        T: Send + 'static,
        F: FnOnce() -> ConnxResult<T> + Send + 'static,
    {
        let timeout = self.query_timeout;
        let handle = tokio::task::spawn_blocking(f);
        match tokio::time::timeout(timeout, handle).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_err)) => Err(ConnxError::internal(format!(
                "blocking task failed: {join_err}"
            ))),
            Err(_) => {
                warn!(operation, timeout_secs = timeout.as_secs(), "timed out");
                Err(ConnxError::timeout(operation, timeout.as_secs()))
            }
        }
    }
}
