use crate::error::StorageError;
use async_trait::async_trait;
use rusqlite::types::{Value, ValueRef};
use rusqlite::{params_from_iter, Connection};
use serde_json::{Map, Value as JsonValue};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

pub type DbConnection = Arc<Mutex<Connection>>;

/// One result row, keyed by column name.
pub type Row = Map<String, JsonValue>;

/// Shared handle to the executor that handlers receive as router state.
pub type Db = Arc<dyn Executor>;

/// Runs a single parameterized statement and returns whatever rows it yields.
///
/// Placeholders are positional (`?1`, `?2`, ...) and are always bound from
/// `params`, never spliced into the statement text.
#[async_trait]
pub trait Executor: Send + Sync {
    async fn execute(&self, sql: &str, params: Vec<Value>) -> Result<Vec<Row>, StorageError>;
}

#[derive(Clone)]
pub struct SqliteExecutor {
    conn: DbConnection,
}

impl SqliteExecutor {
    pub fn new(conn: DbConnection) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl Executor for SqliteExecutor {
    async fn execute(&self, sql: &str, params: Vec<Value>) -> Result<Vec<Row>, StorageError> {
        let conn = self.conn.lock().await;
        query_rows(&conn, sql, &params)
    }
}

fn query_rows(conn: &Connection, sql: &str, params: &[Value]) -> Result<Vec<Row>, StorageError> {
    let mut stmt = conn.prepare(sql)?;
    let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

    let mut rows = stmt.query(params_from_iter(params.iter()))?;
    let mut records = Vec::new();
    while let Some(row) = rows.next()? {
        let mut record = Map::with_capacity(columns.len());
        for (idx, column) in columns.iter().enumerate() {
            record.insert(column.clone(), column_value(row.get_ref(idx)?, column)?);
        }
        records.push(record);
    }

    Ok(records)
}

fn column_value(value: ValueRef<'_>, column: &str) -> Result<JsonValue, StorageError> {
    match value {
        ValueRef::Null => Ok(JsonValue::Null),
        ValueRef::Integer(i) => Ok(JsonValue::from(i)),
        ValueRef::Real(f) => Ok(JsonValue::from(f)),
        ValueRef::Text(bytes) => Ok(JsonValue::from(String::from_utf8_lossy(bytes).into_owned())),
        ValueRef::Blob(_) => Err(StorageError::UnsupportedColumn(column.to_owned())),
    }
}

pub fn establish_connection(path: impl AsRef<Path>) -> Result<DbConnection, StorageError> {
    let conn = Connection::open(path)?;
    migrate(&conn)?;
    Ok(Arc::new(Mutex::new(conn)))
}

pub fn establish_in_memory() -> Result<DbConnection, StorageError> {
    let conn = Connection::open_in_memory()?;
    migrate(&conn)?;
    Ok(Arc::new(Mutex::new(conn)))
}

fn migrate(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS videos (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            url TEXT NOT NULL,
            description TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        [],
    )?;

    Ok(())
}
