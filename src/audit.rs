//! Audit records for query execution attempts.
//!
//! Every execution attempt - success or failure, including requests rejected
//! before any driver call - produces exactly one audit record on the log
//! stream. Records carry a short fingerprint of the normalized query text
//! instead of the SQL itself, so the audit trail never leaks statement text,
//! parameter values, or credentials.

use crate::error::ConnxError;
use sha2::{Digest, Sha256};
use tracing::info;

/// Hex characters kept from the SHA-256 digest.
const FINGERPRINT_LEN: usize = 12;

/// Which side of the read/write split a request landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Read,
    Write,
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Ok,
    Error,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Error => "error",
        }
    }
}

/// One audit line per execution attempt.
#[derive(Debug, Clone)]
pub struct AuditRecord {
    pub fingerprint: String,
    pub operation: OperationKind,
    /// Row count for reads, affected count for writes, 0 on failure.
    pub rows: u64,
    pub outcome: Outcome,
    pub error_kind: Option<&'static str>,
}

impl AuditRecord {
    pub fn success(fingerprint: String, operation: OperationKind, rows: u64) -> Self {
        Self {
            fingerprint,
            operation,
            rows,
            outcome: Outcome::Ok,
            error_kind: None,
        }
    }

    pub fn failure(fingerprint: String, operation: OperationKind, err: &ConnxError) -> Self {
        Self {
            fingerprint,
            operation,
            rows: 0,
            outcome: Outcome::Error,
            error_kind: Some(err.kind()),
        }
    }

    /// Append this record to the log stream.
    pub fn emit(&self) {
        info!(
            target: "audit",
            fingerprint = %self.fingerprint,
            operation = self.operation.as_str(),
            rows = self.rows,
            outcome = self.outcome.as_str(),
            error_kind = self.error_kind.unwrap_or("-"),
            "query audit"
        );
    }
}

/// Collapse runs of whitespace so formatting differences do not change the
/// fingerprint.
fn normalize(sql: &str) -> String {
    sql.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Short stable fingerprint of the normalized query text.
pub fn fingerprint(sql: &str) -> String {
    let digest = Sha256::digest(normalize(sql).as_bytes());
    let hex: String = digest.iter().map(|b| format!("{b:02x}")).collect();
    hex[..FINGERPRINT_LEN].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_is_stable_and_short() {
        let a = fingerprint("SELECT 1");
        let b = fingerprint("SELECT 1");
        assert_eq!(a, b);
        assert_eq!(a.len(), FINGERPRINT_LEN);
    }

    #[test]
    fn test_fingerprint_never_equals_raw_text() {
        let sql = "SELECT CUSTOMER_ID FROM CUSTOMERS";
        assert_ne!(fingerprint(sql), sql);
    }

    #[test]
    fn test_fingerprint_ignores_whitespace_differences() {
        assert_eq!(
            fingerprint("SELECT *\n  FROM CUSTOMERS"),
            fingerprint("SELECT * FROM CUSTOMERS")
        );
    }

    #[test]
    fn test_fingerprint_differs_for_different_queries() {
        assert_ne!(fingerprint("SELECT 1"), fingerprint("SELECT 2"));
    }

    #[test]
    fn test_failure_record_carries_error_kind() {
        let err = ConnxError::WritesDisabled;
        let record = AuditRecord::failure(fingerprint("UPDATE T SET A=1"), OperationKind::Write, &err);
        assert_eq!(record.outcome, Outcome::Error);
        assert_eq!(record.error_kind, Some("permission"));
        assert_eq!(record.rows, 0);
    }

    #[test]
    fn test_success_record_has_no_error_kind() {
        let record = AuditRecord::success(fingerprint("SELECT 1"), OperationKind::Read, 42);
        assert_eq!(record.outcome, Outcome::Ok);
        assert!(record.error_kind.is_none());
        assert_eq!(record.rows, 42);
    }
}
