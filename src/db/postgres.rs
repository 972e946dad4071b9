//! PostgreSQL database client implementation.
//!
//! Provides the `PostgresClient` struct that implements the `DatabaseClient` trait
//! for PostgreSQL databases using sqlx. Each client owns exactly one connection.

use super::stream::{format_query_error, RowStream};
use super::{Cursor, DatabaseBackend, DatabaseClient};
use crate::error::{DumpError, Result};
use async_trait::async_trait;
use sqlx::postgres::{PgConnection, PgRow};
use sqlx::{Column, Connection, Executor, Row, Statement, TypeInfo, ValueRef};
use tracing::debug;
use url::Url;

/// PostgreSQL database client.
#[derive(Debug)]
pub struct PostgresClient {
    conn: Option<PgConnection>,
}

impl PostgresClient {
    /// Opens a single connection.
    ///
    /// Accepts a `postgres://` URL or a `user/password@host:port/service`
    /// connect descriptor.
    pub async fn connect(conn_str: &str) -> Result<Self> {
        let url = connect_descriptor_to_url(conn_str)?;

        let conn = PgConnection::connect(&url)
            .await
            .map_err(|e| map_connection_error(e, &url))?;

        debug!("Successfully connected to database");
        Ok(Self { conn: Some(conn) })
    }
}

#[async_trait]
impl DatabaseClient for PostgresClient {
    async fn open_cursor<'a>(&'a mut self, sql: &'a str) -> Result<Box<dyn Cursor + 'a>> {
        let conn = self
            .conn
            .as_mut()
            .ok_or_else(|| DumpError::connection("Connection is already closed"))?;

        // Preparing validates the statement and yields column names even for empty results
        let statement = Executor::prepare(&mut *conn, sql)
            .await
            .map_err(|e| DumpError::query(format_query_error(e)))?;
        let columns: Vec<String> = statement
            .columns()
            .iter()
            .map(|col| col.name().to_string())
            .collect();

        // Simple query protocol, so every value arrives in text format
        let rows = sqlx::raw_sql(sql).fetch(conn);
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

/// Translates a connection string into a PostgreSQL URL.
///
/// URLs pass through untouched. Anything else is read as
/// `user/password@host[:port]/service`, with `service` naming the database;
/// a missing or zero port falls back to 5432.
pub fn connect_descriptor_to_url(conn_str: &str) -> Result<String> {
    if conn_str.starts_with("postgres://") || conn_str.starts_with("postgresql://") {
        return Ok(conn_str.to_string());
    }

    let malformed = |reason: &str| {
        DumpError::connection(format!(
            "Malformed connection string ({reason}). Expected user/password@host:port/service"
        ))
    };

    let (credentials, location) = conn_str
        .rsplit_once('@')
        .ok_or_else(|| malformed("missing '@'"))?;
    let (user, password) = credentials.split_once('/').unwrap_or((credentials, ""));
    let (address, service) = location
        .split_once('/')
        .ok_or_else(|| malformed("missing service name"))?;

    let default_port = DatabaseBackend::Postgres.default_port().unwrap_or(5432);
    let (host, port) = match address.rsplit_once(':') {
        Some((host, port)) => {
            let port: u16 = port
                .parse()
                .map_err(|_| malformed(&format!("invalid port '{port}'")))?;
            (host, if port == 0 { default_port } else { port })
        }
        None => (address, default_port),
    };

    if host.is_empty() {
        return Err(malformed("missing host"));
    }
    if service.is_empty() {
        return Err(malformed("missing service name"));
    }

    let mut url = Url::parse(&format!("postgres://{host}:{port}/"))
        .map_err(|e| malformed(&e.to_string()))?;
    if !user.is_empty() {
        url.set_username(user)
            .map_err(|_| malformed("invalid user name"))?;
    }
    if !password.is_empty() {
        url.set_password(Some(password))
            .map_err(|_| malformed("invalid password"))?;
    }
    url.set_path(service);

    Ok(url.to_string())
}

/// Renders every column of a row as text.
fn row_to_text(row: &PgRow) -> Vec<String> {
    row.columns()
        .iter()
        .enumerate()
        .map(|(i, col)| value_to_text(row, i, col.type_info().name()))
        .collect()
}

/// Returns a column value in the server's own text output format.
///
/// Rows are fetched over the simple query protocol, so every value arrives
/// as text and no type has to be decoded. NULL becomes the empty string.
fn value_to_text(row: &PgRow, index: usize, type_name: &str) -> String {
    let raw = match row.try_get_raw(index) {
        Ok(raw) if raw.is_null() => return String::new(),
        Ok(raw) => raw,
        Err(_) => return String::new(),
    };

    match raw.as_str() {
        Ok(text) => render_text(type_name, text),
        Err(e) => {
            debug!(
                "Column {} of type {} cannot be rendered as text ({}); writing empty cell",
                index, type_name, e
            );
            String::new()
        }
    }
}

/// Normalizes server text output where it differs from the cell rendering.
fn render_text(type_name: &str, text: &str) -> String {
    match (type_name, text) {
        ("BOOL", "t") => "true".to_string(),
        ("BOOL", "f") => "false".to_string(),
        _ => text.to_string(),
    }
}

/// Maps sqlx connection errors to user-friendly messages.
fn map_connection_error(error: sqlx::Error, url: &str) -> DumpError {
    let parsed = Url::parse(url).ok();
    let host = parsed
        .as_ref()
        .and_then(|u| u.host_str().map(String::from))
        .unwrap_or_else(|| "localhost".to_string());
    let port = parsed.as_ref().and_then(|u| u.port()).unwrap_or(5432);
    let user = parsed
        .as_ref()
        .map(|u| u.username().to_string())
        .filter(|u| !u.is_empty())
        .unwrap_or_else(|| "unknown".to_string());
    let database = parsed
        .as_ref()
        .map(|u| u.path().trim_start_matches('/').to_string())
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| "unknown".to_string());

    let error_str = error.to_string().to_lowercase();

    if error_str.contains("connection refused") || error_str.contains("could not connect") {
        DumpError::connection(format!(
            "Cannot connect to {host}:{port}. Check that the server is running."
        ))
    } else if error_str.contains("password authentication failed")
        || error_str.contains("authentication failed")
    {
        DumpError::connection(format!(
            "Authentication failed for user '{user}'. Check your credentials."
        ))
    } else if error_str.contains("does not exist") && error_str.contains("database") {
        DumpError::connection(format!("Database '{database}' does not exist."))
    } else if error_str.contains("ssl") || error_str.contains("tls") {
        DumpError::connection(
            "Server requires SSL. Add '?sslmode=require' to the connection URL.".to_string(),
        )
    } else if error_str.contains("timed out") || error_str.contains("timeout") {
        DumpError::connection(format!(
            "Connection to {host}:{port} timed out. The server may be overloaded or unreachable."
        ))
    } else {
        DumpError::connection(error.to_string())
    }
}
