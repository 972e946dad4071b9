//! Cursor implementation shared by the sqlx-backed drivers.

use super::Cursor;
use crate::error::{DumpError, Result};
use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::TryStreamExt;

/// Streams rows from a sqlx query, rendering each one as text.
pub(crate) struct RowStream<'a, R> {
    columns: Vec<String>,
    rows: BoxStream<'a, std::result::Result<R, sqlx::Error>>,
    to_text: fn(&R) -> Vec<String>,
}

impl<'a, R> RowStream<'a, R> {
    pub(crate) fn new(
        columns: Vec<String>,
        rows: BoxStream<'a, std::result::Result<R, sqlx::Error>>,
        to_text: fn(&R) -> Vec<String>,
    ) -> Self {
        Self {
            columns,
            rows,
            to_text,
        }
    }
}

#[async_trait]
impl<'a, R: Send + 'a> Cursor for RowStream<'a, R> {
    fn column_names(&self) -> &[String] {
        &self.columns
    }

    async fn next_row(&mut self) -> Result<Option<Vec<String>>> {
        let row = self
            .rows
            .try_next()
            .await
            .map_err(|e| DumpError::query(format_query_error(e)))?;

        Ok(row.map(|r| (self.to_text)(&r)))
    }
}

/// Formats a query error with hints if available.
pub(crate) fn format_query_error(error: sqlx::Error) -> String {
    let Some(db_error) = error.as_database_error() else {
        return error.to_string();
    };

    let mut result = String::from("ERROR: ");
    result.push_str(db_error.message());

    // PostgreSQL attaches detail and hint fields
    if let Some(pg_error) = db_error.try_downcast_ref::<sqlx::postgres::PgDatabaseError>() {
        if let Some(detail) = pg_error.detail() {
            result.push_str("\n  DETAIL: ");
            result.push_str(detail);
        }

        if let Some(hint) = pg_error.hint() {
            result.push_str("\n  HINT: ");
            result.push_str(hint);
        }

        if let Some(table) = pg_error.table() {
            result.push_str("\n  TABLE: ");
            result.push_str(table);
        }
    }

    result
}
