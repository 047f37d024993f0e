//! SQL statement classification for the raw-SQL tools.
//!
//! Every free-text statement passes through here before it gets anywhere
//! near the driver. The rules are structural, not semantic: a statement is
//! rejected when it is a batch (any semicolon), when it fails to parse as a
//! single statement, or when its verb is outside the supported set of
//! SELECT/INSERT/UPDATE/DELETE. There is deliberately no blocklist of
//! "dangerous substrings" — injection defense belongs to parameter binding,
//! and keyword pattern matching is unreliable against comments and string
//! literals. Uses sqlparser so formatting tricks cannot change the verdict.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sqlparser::ast::Statement;
use sqlparser::dialect::GenericDialect;
use sqlparser::parser::Parser;

use crate::error::{ConnxError, ConnxResult};

/// The modifying verbs accepted by the write tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum WriteOp {
    Insert,
    Update,
    Delete,
}

impl WriteOp {
    /// Lowercase verb, as it appears in SQL.
    pub fn verb(&self) -> &'static str {
        match self {
            Self::Insert => "insert",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }

    /// Capitalized label for success messages.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Insert => "Insert",
            Self::Update => "Update",
            Self::Delete => "Delete",
        }
    }
}

/// Category of a classified statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementClass {
    /// Produces a result set.
    Read,
    /// Modifies data; carries the actual verb.
    Write(WriteOp),
}

/// Classify a raw SQL string.
///
/// Rejections are `Validation` errors: empty input, any semicolon (batches
/// are never allowed, regardless of what follows the separator), parse
/// failure, or an unsupported verb (DDL, EXEC, and everything else outside
/// SELECT/INSERT/UPDATE/DELETE).
pub fn classify(sql: &str) -> ConnxResult<StatementClass> {
    let trimmed = sql.trim();
    if trimmed.is_empty() {
        return Err(ConnxError::validation("Empty SQL statement."));
    }
    if trimmed.contains(';') {
        return Err(ConnxError::validation(
            "Only a single SQL statement is allowed (no semicolons).",
        ));
    }

    let dialect = GenericDialect {};
    let statements = Parser::parse_sql(&dialect, trimmed)
        .map_err(|e| ConnxError::validation(format!("Failed to parse SQL statement: {e}")))?;

    let stmt = match statements.as_slice() {
        [stmt] => stmt,
        [] => return Err(ConnxError::validation("Empty SQL statement.")),
        _ => {
            return Err(ConnxError::validation(
                "Only a single SQL statement is allowed.",
            ))
        }
    };

    match stmt {
        Statement::Query(_) => Ok(StatementClass::Read),
        Statement::Insert(_) => Ok(StatementClass::Write(WriteOp::Insert)),
        Statement::Update { .. } => Ok(StatementClass::Write(WriteOp::Update)),
        Statement::Delete(_) => Ok(StatementClass::Write(WriteOp::Delete)),
        _ => Err(ConnxError::validation(
            "Unsupported operation. Only SELECT, INSERT, UPDATE, and DELETE are allowed.",
        )),
    }
}

/// Validate a statement for the read tool: it must be a SELECT.
pub fn classify_read(sql: &str) -> ConnxResult<()> {
    match classify(sql)? {
        StatementClass::Read => Ok(()),
        StatementClass::Write(op) => Err(ConnxError::validation(format!(
            "Only SELECT statements are allowed here; use the update tool for {} operations.",
            op.verb()
        ))),
    }
}

/// Validate a statement for the write tool: it must be a modifying statement
/// whose verb matches the one the caller declared. A mismatch is rejected,
/// never silently corrected.
pub fn classify_write(sql: &str, declared: WriteOp) -> ConnxResult<()> {
    match classify(sql)? {
        StatementClass::Write(actual) if actual == declared => Ok(()),
        StatementClass::Write(actual) => Err(ConnxError::validation(format!(
            "Declared operation '{}' does not match the statement verb '{}'.",
            declared.verb(),
            actual.verb()
        ))),
        StatementClass::Read => Err(ConnxError::validation(
            "SELECT statements are not allowed here; use the query tool for reads.",
        )),
    }
}
