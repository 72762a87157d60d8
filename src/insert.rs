//! The interactive multi-row insert.
//!
//! `insert_into <table>` opens a session, every following line is one row
//! of comma-separated values, and the terminator (`;` by default) submits
//! all rows as a single `INSERT ... VALUES (...), (...)` statement. The
//! session is a plain value: each transition consumes it and hands back the
//! next state together with what happened.

use tracing::{debug, info};

use crate::diagnose::{classify_error, Diagnosis, ErrorContext};
use crate::engine::{ColumnInfo, Engine};

pub const DEFAULT_TERMINATOR: &str = ";";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum InsertSession {
    #[default]
    Idle,
    Collecting { table: String, rows: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BeginOutcome {
    Started { table: String, columns: Vec<ColumnInfo> },
    MissingTableName,
    TableNotFound(String),
    AlreadyCollecting(String),
    Failed(Diagnosis),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedOutcome {
    Accepted(String),
    RejectedFormat,
    Committed(usize),
    CommittedWithError(Diagnosis),
    EmptyBatch,
    NotCollecting,
}

/// `INSERT INTO table VALUES (r1), (r2), ...`
pub fn batch_statement(table: &str, rows: &[String]) -> String {
    let values = rows
        .iter()
        .map(|row| format!("({})", row))
        .collect::<Vec<_>>()
        .join(", ");
    format!("INSERT INTO {} VALUES {}", table, values)
}

impl InsertSession {
    pub fn is_collecting(&self) -> bool {
        matches!(self, InsertSession::Collecting { .. })
    }

    pub fn table(&self) -> Option<&str> {
        match self {
            InsertSession::Collecting { table, .. } => Some(table),
            InsertSession::Idle => None,
        }
    }

    pub fn row_count(&self) -> usize {
        match self {
            InsertSession::Collecting { rows, .. } => rows.len(),
            InsertSession::Idle => 0,
        }
    }

    pub fn begin<E: Engine + ?Sized>(self, engine: &E, table: &str) -> (InsertSession, BeginOutcome) {
        if let InsertSession::Collecting { table: active, .. } = &self {
            let outcome = BeginOutcome::AlreadyCollecting(active.clone());
            return (self, outcome);
        }
        let table = table.trim();
        if table.is_empty() {
            return (self, BeginOutcome::MissingTableName);
        }
        let context = ErrorContext::statement("").with_table(table);
        let canonical = match engine.resolve_table(table) {
            Ok(Some(name)) => name,
            Ok(None) => return (self, BeginOutcome::TableNotFound(table.to_string())),
            Err(e) => return (self, BeginOutcome::Failed(classify_error(&e, &context, engine))),
        };
        let columns = match engine.describe_table(&canonical) {
            Ok(columns) => columns,
            Err(e) => return (self, BeginOutcome::Failed(classify_error(&e, &context, engine))),
        };
        debug!(table = %canonical, "insert session started");
        let next = InsertSession::Collecting { table: canonical.clone(), rows: Vec::new() };
        (next, BeginOutcome::Started { table: canonical, columns })
    }

    pub fn feed<E: Engine + ?Sized>(self, engine: &E, line: &str, terminator: &str) -> (InsertSession, FeedOutcome) {
        let (table, mut rows) = match self {
            InsertSession::Idle => return (InsertSession::Idle, FeedOutcome::NotCollecting),
            InsertSession::Collecting { table, rows } => (table, rows),
        };
        if line.trim() == terminator {
            if rows.is_empty() {
                debug!(%table, "insert session closed without rows");
                return (InsertSession::Idle, FeedOutcome::EmptyBatch);
            }
            let sql = batch_statement(&table, &rows);
            info!(%sql, rows = rows.len(), "submitting batched insert");
            let outcome = match engine.execute(&sql) {
                Ok(_) => FeedOutcome::Committed(rows.len()),
                Err(e) => {
                    let context = ErrorContext::statement(&sql).with_table(&table);
                    FeedOutcome::CommittedWithError(classify_error(&e, &context, engine))
                }
            };
            return (InsertSession::Idle, outcome);
        }
        if !line.contains(',') {
            return (InsertSession::Collecting { table, rows }, FeedOutcome::RejectedFormat);
        }
        rows.push(line.to_string());
        (InsertSession::Collecting { table, rows }, FeedOutcome::Accepted(line.to_string()))
    }
}
