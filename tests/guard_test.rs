//! Integration tests for SQL statement classification.
//!
//! These tests verify the structural classification rules: single-statement
//! enforcement, the supported verb set, and declared-operation matching.

use connx_mcp_server::error::ConnxError;
use connx_mcp_server::tools::guard::{classify, classify_read, classify_write, StatementClass, WriteOp};

/// Any statement containing a semicolon is rejected, regardless of verb.
#[test]
fn test_semicolon_always_rejected() {
    for sql in [
        "SELECT 1; DROP TABLE CUSTOMERS",
        "SELECT * FROM CUSTOMERS;",
        "INSERT INTO T VALUES (1); INSERT INTO T VALUES (2)",
        "DELETE FROM T WHERE ID = 1;",
    ] {
        let err = classify(sql).unwrap_err();
        assert!(
            matches!(err, ConnxError::Validation { .. }),
            "expected validation error for: {sql}"
        );
        assert!(
            err.to_string().contains("single SQL statement"),
            "reason should reference the multi-statement rule for: {sql}"
        );
    }
}

/// The verb table: SELECT reads, INSERT/UPDATE/DELETE write, the rest fail.
#[test]
fn test_verb_classification_table() {
    assert_eq!(
        classify("SELECT CUSTOMER_ID FROM CUSTOMERS WHERE STATE = 'CA'").unwrap(),
        StatementClass::Read
    );
    assert_eq!(
        classify("INSERT INTO CUSTOMERS (CUSTOMERID) VALUES ('C1')").unwrap(),
        StatementClass::Write(WriteOp::Insert)
    );
    assert_eq!(
        classify("UPDATE CUSTOMERS SET STATUS = 'INACTIVE' WHERE LAST_LOGIN < '2022-01-01'")
            .unwrap(),
        StatementClass::Write(WriteOp::Update)
    );
    assert_eq!(
        classify("DELETE FROM CUSTOMERS WHERE CUSTOMERID = 'C1'").unwrap(),
        StatementClass::Write(WriteOp::Delete)
    );

    for sql in [
        "DROP TABLE CUSTOMERS",
        "TRUNCATE TABLE CUSTOMERS",
        "CREATE TABLE T (ID INT)",
        "GRANT SELECT ON CUSTOMERS TO APP",
    ] {
        let err = classify(sql).unwrap_err();
        assert!(
            err.to_string().contains("Unsupported operation"),
            "expected unsupported-operation rejection for: {sql}"
        );
    }
}

/// The read path admits only SELECT.
#[test]
fn test_read_path_rejects_writes() {
    assert!(classify_read("SELECT * FROM CUSTOMERS").is_ok());
    assert!(classify_read("UPDATE CUSTOMERS SET A = 1 WHERE B = 2").is_err());
    assert!(classify_read("DROP TABLE CUSTOMERS").is_err());
}

/// Declared operation must match the statement verb; mismatches are
/// rejected, not corrected.
#[test]
fn test_declared_operation_must_match() {
    assert!(classify_write("DELETE FROM T WHERE ID = 1", WriteOp::Delete).is_ok());

    let err = classify_write("DELETE FROM T WHERE ID = 1", WriteOp::Update).unwrap_err();
    assert!(err.to_string().contains("does not match"));

    let err = classify_write("INSERT INTO T (A) VALUES (1)", WriteOp::Delete).unwrap_err();
    assert!(err.to_string().contains("does not match"));
}

/// Comment and formatting tricks do not change the verdict.
#[test]
fn test_formatting_does_not_bypass_classification() {
    assert_eq!(
        classify("/* hint */ SELECT 1").unwrap(),
        StatementClass::Read
    );
    assert_eq!(
        classify("-- note\n  delete FROM T WHERE ID = 1").unwrap(),
        StatementClass::Write(WriteOp::Delete)
    );
    // A write verb hidden in a string literal stays a read.
    assert_eq!(
        classify("SELECT * FROM T WHERE NOTE = 'DROP TABLE T'").unwrap(),
        StatementClass::Read
    );
}

/// Unparseable or empty input never classifies.
#[test]
fn test_garbage_rejected() {
    assert!(classify("").is_err());
    assert!(classify("   \n\t ").is_err());
    assert!(classify("COMPLETELY NOT SQL !!!").is_err());
}
