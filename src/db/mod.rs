//! Database abstraction layer for db-xl-dump.
//!
//! Provides a trait-based interface for opening sessions and streaming query
//! results, allowing different database backends to be used interchangeably.
//! Every value crosses this boundary as text; typing happens later.

mod mock;
mod postgres;
mod sqlite;
mod stream;

pub use mock::{MockConnector, MockDatabase, MockTable};
pub use postgres::{connect_descriptor_to_url, PostgresClient};
pub use sqlite::SqliteClient;

use crate::error::Result;
use async_trait::async_trait;
use tracing::debug;

/// Supported database backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DatabaseBackend {
    #[default]
    Postgres,
    Sqlite,
}

impl DatabaseBackend {
    /// Returns the backend as a string for display.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Postgres => "postgres",
            Self::Sqlite => "sqlite",
        }
    }

    /// Picks the backend that understands the given connection string.
    ///
    /// `sqlite:` strings go to SQLite; driver URLs and
    /// `user/password@host:port/service` descriptors go to PostgreSQL.
    pub fn detect(conn_str: &str) -> Self {
        if conn_str.starts_with("sqlite:") {
            Self::Sqlite
        } else {
            Self::Postgres
        }
    }

    /// Returns the default port for this backend, if it is network based.
    pub fn default_port(&self) -> Option<u16> {
        match self {
            Self::Postgres => Some(5432),
            Self::Sqlite => None,
        }
    }
}

/// A forward-only handle over a query's result rows.
#[async_trait]
pub trait Cursor: Send {
    /// Column names in result order.
    fn column_names(&self) -> &[String];

    /// Fetches the next row as one text value per column, or `None` when exhausted.
    ///
    /// NULL values are returned as empty strings.
    async fn next_row(&mut self) -> Result<Option<Vec<String>>>;
}

/// A live database session.
#[async_trait]
pub trait DatabaseClient: Send {
    /// Executes `sql` and returns a cursor over its rows.
    async fn open_cursor<'a>(&'a mut self, sql: &'a str) -> Result<Box<dyn Cursor + 'a>>;

    /// Closes the session. Further calls are no-ops.
    async fn close(&mut self) -> Result<()>;
}

/// Opens database sessions from a resolved connection string.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Establishes a new session.
    async fn connect(&self, conn_str: &str) -> Result<Box<dyn DatabaseClient>>;
}

/// Connector that dispatches to the real sqlx-backed drivers.
#[derive(Debug, Clone, Copy, Default)]
pub struct DriverConnector;

#[async_trait]
impl Connector for DriverConnector {
    async fn connect(&self, conn_str: &str) -> Result<Box<dyn DatabaseClient>> {
        let backend = DatabaseBackend::detect(conn_str);
        debug!("Opening session with the {} driver", backend.as_str());

        match backend {
            DatabaseBackend::Postgres => {
                let client = PostgresClient::connect(conn_str).await?;
                Ok(Box::new(client))
            }
            DatabaseBackend::Sqlite => {
                let client = SqliteClient::connect(conn_str).await?;
                Ok(Box::new(client))
            }
        }
    }
}
