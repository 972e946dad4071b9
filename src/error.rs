//! Error types for db-xl-dump.
//!
//! Defines the main error enum used throughout the application. Per-target
//! variants (connection, query, sheet creation) are recovered by the export
//! orchestrator; serialization and configuration errors end the run.

use thiserror::Error;

/// Main error type for db-xl-dump operations.
#[derive(Error, Debug)]
pub enum DumpError {
    /// A session could not be established (host unreachable, auth failed, malformed string).
    #[error("Connection error: {0}")]
    Connection(String),

    /// The query failed to execute or a row could not be read from the cursor.
    #[error("Query error: {0}")]
    Query(String),

    /// The sheet could not be added to the workbook (duplicate or invalid name).
    #[error("Sheet creation error: {0}")]
    SheetCreation(String),

    /// The finished workbook could not be written to storage.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration errors (invalid config file, missing required inputs, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal application errors (broken invariants, bugs, etc.)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DumpError {
    /// Creates a connection error with the given message.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Creates a query error with the given message.
    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }

    /// Creates a sheet creation error with the given message.
    pub fn sheet_creation(msg: impl Into<String>) -> Self {
        Self::SheetCreation(msg.into())
    }

    /// Creates a serialization error with the given message.
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates an internal error with the given message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Connection(_) => "Connection Error",
            Self::Query(_) => "Query Error",
            Self::SheetCreation(_) => "Sheet Creation Error",
            Self::Serialization(_) => "Serialization Error",
            Self::Config(_) => "Configuration Error",
            Self::Internal(_) => "Internal Error",
        }
    }
}

impl From<zip::result::ZipError> for DumpError {
    fn from(e: zip::result::ZipError) -> Self {
        Self::Serialization(e.to_string())
    }
}

/// Result type alias using DumpError.
pub type Result<T> = std::result::Result<T, DumpError>;
