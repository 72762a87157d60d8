//! Diagnostic translator: turns a failed statement into a category and a
//! message the user can act on.
//!
//! SQLite reports most failures only as text, so classification is a
//! best-effort match on well-known phrases. Uniqueness violations are
//! recognized from the extended result code first and from the text only
//! when no code is available.

use std::fmt;

use rusqlite::ErrorCode;
use rusqlite::ffi::{SQLITE_CONSTRAINT_PRIMARYKEY, SQLITE_CONSTRAINT_UNIQUE};
use tracing::{debug, warn};

use crate::engine::{Engine, EngineError};

const MISSING_TABLE_MARKER: &str = "no such table: ";
const SYNTAX_MARKER: &str = "near ";
const UNIQUE_MARKER: &str = "UNIQUE constraint failed";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorCategory {
    MissingTable(String),
    SyntaxNearToken(String),
    /// The conflicting column, when it could be determined.
    DuplicateKey(Option<String>),
    Unrecognized(String),
}

/// What was being attempted when the engine failed.
#[derive(Debug, Clone, Copy, Default)]
pub struct ErrorContext<'a> {
    pub statement: &'a str,
    pub table: Option<&'a str>,
}

impl<'a> ErrorContext<'a> {
    pub fn statement(statement: &'a str) -> Self {
        Self { statement, table: None }
    }
    pub fn with_table(mut self, table: &'a str) -> Self {
        self.table = Some(table);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnosis {
    pub category: ErrorCategory,
    pub message: String,
}

impl fmt::Display for Diagnosis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

fn missing_table(message: &str) -> Option<String> {
    let (_, rest) = message.split_once(MISSING_TABLE_MARKER)?;
    let table = rest.trim();
    (!table.is_empty()).then(|| table.to_string())
}

fn syntax_token(message: &str) -> Option<String> {
    let (_, rest) = message.split_once(SYNTAX_MARKER)?;
    let token = rest.split(':').next().unwrap_or(rest).trim();
    Some(token.to_string())
}

fn is_uniqueness_violation(error: &EngineError) -> bool {
    match (error.code, error.extended_code) {
        (Some(ErrorCode::ConstraintViolation), Some(extended))
            if extended == SQLITE_CONSTRAINT_UNIQUE || extended == SQLITE_CONSTRAINT_PRIMARYKEY =>
        {
            true
        }
        _ => error.message.contains(UNIQUE_MARKER),
    }
}

/// Column named by a message such as `UNIQUE constraint failed: t.col`.
fn conflicting_column(message: &str) -> Option<String> {
    let (_, rest) = message.split_once(UNIQUE_MARKER)?;
    let first = rest.trim_start_matches(':').trim().split(',').next()?.trim();
    let column = first.rsplit('.').next()?.trim();
    (!column.is_empty()).then(|| column.to_string())
}

fn primary_key_column<E: Engine + ?Sized>(engine: &E, table: &str) -> Option<String> {
    match engine.describe_table(table) {
        Ok(columns) => columns.into_iter().find(|c| c.primary_key).map(|c| c.name),
        Err(e) => {
            debug!(error = %e, table, "primary key lookup failed");
            None
        }
    }
}

pub fn classify<E: Engine + ?Sized>(error: &EngineError, context: &ErrorContext<'_>, engine: &E) -> ErrorCategory {
    let message = error.message.as_str();
    if message.contains(MISSING_TABLE_MARKER.trim_end()) {
        let table = missing_table(message)
            .or_else(|| context.table.map(str::to_string))
            .unwrap_or_default();
        ErrorCategory::MissingTable(table)
    } else if message.contains(SYNTAX_MARKER) {
        ErrorCategory::SyntaxNearToken(syntax_token(message).unwrap_or_default())
    } else if is_uniqueness_violation(error) {
        let column = conflicting_column(message)
            .or_else(|| context.table.and_then(|table| primary_key_column(engine, table)));
        ErrorCategory::DuplicateKey(column)
    } else {
        ErrorCategory::Unrecognized(message.to_string())
    }
}

pub fn describe(category: &ErrorCategory) -> String {
    match category {
        ErrorCategory::MissingTable(table) => {
            format!("错误：表 {} 不存在。请检查表名是否正确，或者先创建该表。", table)
        }
        ErrorCategory::SyntaxNearToken(token) => format!(
            "错误：在 {} 附近存在语法错误。请检查该位置的语法，可能是关键字拼写错误、缺少逗号或括号不匹配等。",
            token
        ),
        ErrorCategory::DuplicateKey(Some(column)) => {
            format!("插入错误：列 {} 的值重复，请检查输入。", column)
        }
        ErrorCategory::DuplicateKey(None) => "插入错误：主键值重复，请检查输入。".to_string(),
        ErrorCategory::Unrecognized(raw) => format!("执行 SQL 语句时出错: {}", raw),
    }
}

pub fn classify_error<E: Engine + ?Sized>(error: &EngineError, context: &ErrorContext<'_>, engine: &E) -> Diagnosis {
    let category = classify(error, context, engine);
    warn!(?category, statement = context.statement, "engine error");
    Diagnosis { message: describe(&category), category }
}
