//! The relational engine behind the shell.
//!
//! [`Engine`] is the narrow surface the query compiler, the insert session
//! and the diagnostic translator rely on; [`SqliteEngine`] implements it on
//! top of a single owned rusqlite [`Connection`], which is closed when the
//! engine is dropped.

use std::path::Path;

use rusqlite::types::ValueRef;
use rusqlite::{Connection, ErrorCode};
use thiserror::Error;
use tracing::{debug, warn};

/// An engine failure. `message` is the text SQLite reported, the codes are
/// filled in whenever SQLite supplied them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct EngineError {
    pub message: String,
    pub code: Option<ErrorCode>,
    pub extended_code: Option<i32>,
}

impl EngineError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into(), code: None, extended_code: None }
    }
}

impl From<rusqlite::Error> for EngineError {
    fn from(e: rusqlite::Error) -> Self {
        let (code, extended_code) = match e.sqlite_error() {
            Some(ffi) => (Some(ffi.code), Some(ffi.extended_code)),
            None => (None, None),
        };
        // keep SQLite's own text, never the statement rusqlite appends to it
        let message = match e {
            rusqlite::Error::SqlInputError { msg, .. } => msg,
            rusqlite::Error::SqliteFailure(_, Some(msg)) => msg,
            other => other.to_string(),
        };
        Self { message, code, extended_code }
    }
}

/// One row of `PRAGMA table_info`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    pub name: String,
    pub column_type: String,
    pub not_null: bool,
    pub default_value: Option<String>,
    pub primary_key: bool,
}

/// Rows of a query, every value rendered as text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultRows {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Rows(ResultRows),
    Affected(usize),
}

pub trait Engine {
    fn execute(&self, sql: &str) -> Result<Outcome, EngineError>;
    fn list_tables(&self) -> Result<Vec<String>, EngineError>;
    fn describe_table(&self, table: &str) -> Result<Vec<ColumnInfo>, EngineError>;

    /// Canonical stored name of `table`, compared case-insensitively.
    fn resolve_table(&self, table: &str) -> Result<Option<String>, EngineError> {
        let wanted = table.to_lowercase();
        Ok(self
            .list_tables()?
            .into_iter()
            .find(|name| name.to_lowercase() == wanted))
    }
}

pub struct SqliteEngine {
    connection: Connection,
}

impl SqliteEngine {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, EngineError> {
        let connection = Connection::open(path)?;
        Ok(Self { connection })
    }
    pub fn open_in_memory() -> Result<Self, EngineError> {
        let connection = Connection::open_in_memory()?;
        Ok(Self { connection })
    }
    pub fn connection(&self) -> &Connection {
        &self.connection
    }
    /// Runs several statements at once, used for schema scripts.
    pub fn execute_batch(&self, sql: &str) -> Result<(), EngineError> {
        self.connection.execute_batch(sql).map_err(|e| {
            warn!(error = %e, "batch failed");
            EngineError::from(e)
        })
    }
}

fn render(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => "NULL".to_string(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(r) => r.to_string(),
        ValueRef::Text(t) => String::from_utf8_lossy(t).into_owned(),
        ValueRef::Blob(b) => format!("<blob {} bytes>", b.len()),
    }
}

pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

impl Engine for SqliteEngine {
    fn execute(&self, sql: &str) -> Result<Outcome, EngineError> {
        debug!(%sql, "executing");
        let run = || -> rusqlite::Result<Outcome> {
            let mut statement = self.connection.prepare(sql.trim())?;
            if statement.column_count() == 0 {
                return Ok(Outcome::Affected(statement.execute([])?));
            }
            let columns: Vec<String> = statement.column_names().into_iter().map(String::from).collect();
            let width = columns.len();
            let mut rows = Vec::new();
            let mut cursor = statement.query([])?;
            while let Some(row) = cursor.next()? {
                let mut values = Vec::with_capacity(width);
                for i in 0..width {
                    values.push(render(row.get_ref(i)?));
                }
                rows.push(values);
            }
            Ok(Outcome::Rows(ResultRows { columns, rows }))
        };
        run().map_err(|e| {
            warn!(error = %e, %sql, "statement failed");
            EngineError::from(e)
        })
    }

    fn list_tables(&self) -> Result<Vec<String>, EngineError> {
        let mut statement = self
            .connection
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table'")?;
        let names = statement
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(names)
    }

    fn describe_table(&self, table: &str) -> Result<Vec<ColumnInfo>, EngineError> {
        let pragma = format!("PRAGMA table_info({})", quote_identifier(table));
        let mut statement = self.connection.prepare(&pragma)?;
        let columns = statement
            .query_map([], |row| {
                Ok(ColumnInfo {
                    name: row.get(1)?,
                    column_type: row.get(2)?,
                    not_null: row.get::<_, i64>(3)? != 0,
                    default_value: row.get(4)?,
                    primary_key: row.get::<_, i64>(5)? > 0,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(columns)
    }
}
