//! Mock database backend for testing.
//!
//! Provides an in-memory data source with tables and canned query results,
//! plus session accounting so tests can check that every session is released.

use super::{Connector, Cursor, DatabaseClient};
use crate::error::{DumpError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// A predefined result set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MockTable {
    /// Column names in result order.
    pub columns: Vec<String>,

    /// Rows of text values.
    pub rows: Vec<Vec<String>>,

    /// If set, reading the row at this index fails.
    pub fail_at_row: Option<usize>,
}

impl MockTable {
    /// Creates an empty result set with the given columns.
    pub fn new(columns: &[&str]) -> Self {
        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
            fail_at_row: None,
        }
    }

    /// Appends a row.
    pub fn with_row(mut self, values: &[&str]) -> Self {
        self.rows.push(values.iter().map(|v| v.to_string()).collect());
        self
    }

    /// Makes the cursor fail when it reaches row `index`.
    pub fn failing_at_row(mut self, index: usize) -> Self {
        self.fail_at_row = Some(index);
        self
    }
}

/// An in-memory data source.
#[derive(Debug, Default)]
pub struct MockDatabase {
    tables: HashMap<String, MockTable>,
    queries: HashMap<String, MockTable>,
}

impl MockDatabase {
    /// Creates an empty data source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a table or view; names match case-insensitively.
    pub fn with_table(mut self, name: &str, table: MockTable) -> Self {
        self.tables.insert(name.to_uppercase(), table);
        self
    }

    /// Registers the result of an exact query text.
    pub fn with_query(mut self, sql: &str, table: MockTable) -> Self {
        self.queries.insert(sql.trim().to_string(), table);
        self
    }

    /// Resolves SQL to a registered result set.
    fn lookup(&self, sql: &str) -> Result<MockTable> {
        let sql = sql.trim();

        if let Some(result) = self.queries.get(sql) {
            return Ok(result.clone());
        }

        const FULL_SELECT: &str = "SELECT * FROM ";
        if sql.len() > FULL_SELECT.len()
            && sql.is_char_boundary(FULL_SELECT.len())
            && sql[..FULL_SELECT.len()].eq_ignore_ascii_case(FULL_SELECT)
        {
            let name = sql[FULL_SELECT.len()..].trim().to_uppercase();
            if let Some(table) = self.tables.get(&name) {
                return Ok(table.clone());
            }
            return Err(DumpError::query(format!(
                "ERROR: table or view does not exist: {name}"
            )));
        }

        Err(DumpError::query(format!("ERROR: unrecognized query: {sql}")))
    }
}

#[derive(Debug, Default)]
struct SessionStats {
    opened: AtomicUsize,
    closed: AtomicUsize,
}

/// Connector over a shared [`MockDatabase`].
#[derive(Debug, Clone)]
pub struct MockConnector {
    database: Arc<MockDatabase>,
    reachable: bool,
    stats: Arc<SessionStats>,
    connection_strings: Arc<Mutex<Vec<String>>>,
}

impl MockConnector {
    /// Creates a connector that serves the given data source.
    pub fn new(database: MockDatabase) -> Self {
        Self {
            database: Arc::new(database),
            reachable: true,
            stats: Arc::default(),
            connection_strings: Arc::default(),
        }
    }

    /// Creates a connector whose every connection attempt fails.
    pub fn unreachable() -> Self {
        Self {
            reachable: false,
            ..Self::new(MockDatabase::new())
        }
    }

    /// Number of sessions opened so far.
    pub fn sessions_opened(&self) -> usize {
        self.stats.opened.load(Ordering::SeqCst)
    }

    /// Number of sessions closed so far.
    pub fn sessions_closed(&self) -> usize {
        self.stats.closed.load(Ordering::SeqCst)
    }

    /// Connection strings received, in order.
    pub fn connection_strings(&self) -> Vec<String> {
        self.connection_strings
            .lock()
            .map(|v| v.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Connector for MockConnector {
    async fn connect(&self, conn_str: &str) -> Result<Box<dyn DatabaseClient>> {
        if let Ok(mut seen) = self.connection_strings.lock() {
            seen.push(conn_str.to_string());
        }

        if !self.reachable {
            return Err(DumpError::connection(format!(
                "Cannot connect using '{conn_str}'. Check that the server is running."
            )));
        }

        self.stats.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockClient {
            database: Arc::clone(&self.database),
            stats: Arc::clone(&self.stats),
            open: true,
        }))
    }
}

/// A session against the mock data source.
struct MockClient {
    database: Arc<MockDatabase>,
    stats: Arc<SessionStats>,
    open: bool,
}

#[async_trait]
impl DatabaseClient for MockClient {
    async fn open_cursor<'a>(&'a mut self, sql: &'a str) -> Result<Box<dyn Cursor + 'a>> {
        if !self.open {
            return Err(DumpError::connection("Connection is already closed"));
        }

        let table = self.database.lookup(sql)?;
        Ok(Box::new(MockCursor {
            columns: table.columns,
            rows: table.rows.into_iter(),
            fail_at_row: table.fail_at_row,
            position: 0,
        }))
    }

    async fn close(&mut self) -> Result<()> {
        if self.open {
            self.open = false;
            self.stats.closed.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }
}

struct MockCursor {
    columns: Vec<String>,
    rows: std::vec::IntoIter<Vec<String>>,
    fail_at_row: Option<usize>,
    position: usize,
}

#[async_trait]
impl Cursor for MockCursor {
    fn column_names(&self) -> &[String] {
        &self.columns
    }

    async fn next_row(&mut self) -> Result<Option<Vec<String>>> {
        if self.fail_at_row == Some(self.position) {
            return Err(DumpError::query(format!(
                "ERROR: failed to fetch row {}",
                self.position + 1
            )));
        }

        self.position += 1;
        Ok(self.rows.next())
    }
}
