//! SQLite database client implementation.
//!
//! SQLite values are dynamically typed, so every column is read back through
//! the engine's own text conversion.

use super::stream::{format_query_error, RowStream};
use super::{Cursor, DatabaseClient};
use crate::error::{DumpError, Result};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnection, SqliteRow};
use sqlx::{Column, Connection, Executor, Row, Statement, ValueRef};
use tracing::debug;

/// SQLite database client.
#[derive(Debug)]
pub struct SqliteClient {
    conn: Option<SqliteConnection>,
}

impl SqliteClient {
    /// Opens a `sqlite:` connection string.
    pub async fn connect(conn_str: &str) -> Result<Self> {
        let conn = SqliteConnection::connect(conn_str)
            .await
            .map_err(|e| DumpError::connection(format!("Cannot open {conn_str}: {e}")))?;

        debug!("Opened SQLite database {}", conn_str);
        Ok(Self { conn: Some(conn) })
    }
}

#[async_trait]
impl DatabaseClient for SqliteClient {
    async fn open_cursor<'a>(&'a mut self, sql: &'a str) -> Result<Box<dyn Cursor + 'a>> {
        let conn = self
            .conn
            .as_mut()
            .ok_or_else(|| DumpError::connection("Connection is already closed"))?;

        let statement = Executor::prepare(&mut *conn, sql)
            .await
            .map_err(|e| DumpError::query(format_query_error(e)))?;
        let columns: Vec<String> = statement
            .columns()
            .iter()
            .map(|col| col.name().to_string())
            .collect();

        let rows = sqlx::query(sql).fetch(conn);
        Ok(Box::new(RowStream::new(columns, rows, row_to_text)))
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(conn) = self.conn.take() {
            conn.close()
                .await
                .map_err(|e| DumpError::connection(format!("Failed to close connection: {e}")))?;
        }
        Ok(())
    }
}

fn row_to_text(row: &SqliteRow) -> Vec<String> {
    (0..row.columns().len())
        .map(|i| value_to_text(row, i))
        .collect()
}

fn value_to_text(row: &SqliteRow, index: usize) -> String {
    match row.try_get_raw(index) {
        Ok(raw) if raw.is_null() => return String::new(),
        Err(_) => return String::new(),
        Ok(_) => {}
    }

    row.try_get_unchecked::<String, _>(index)
        .unwrap_or_else(|e| {
            debug!("Column {} cannot be rendered as text ({}); writing empty cell", index, e);
            String::new()
        })
}
