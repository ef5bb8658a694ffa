//! Error types for the PostgreSQL driver adapter.
//!
//! This module defines all error types using `thiserror`. Execution errors
//! keep the engine-reported SQLSTATE code so callers can branch on
//! engine-specific conditions (constraint violations, undefined relations).

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DriverError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Connection failed: {message}")]
    Connection { message: String },

    #[error("Database error: {message}")]
    Database {
        message: String,
        /// e.g., "42P01" for undefined table, "23505" for unique violation
        sql_state: Option<String>,
    },

    #[error("Invalid transaction isolation level [{code}]")]
    InvalidIsolationLevel { code: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DriverError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a connection error.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create a database error with optional SQLSTATE code.
    pub fn database(message: impl Into<String>, sql_state: Option<String>) -> Self {
        Self::Database {
            message: message.into(),
            sql_state,
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Get the engine-reported SQLSTATE code, if this is an execution error.
    pub fn sql_state(&self) -> Option<&str> {
        match self {
            Self::Database { sql_state, .. } => sql_state.as_deref(),
            _ => None,
        }
    }
}

/// Convert sqlx errors to DriverError.
impl From<sqlx::Error> for DriverError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Configuration(msg) => DriverError::config(msg.to_string()),
            sqlx::Error::Database(db_err) => {
                let code = db_err.code().map(|c| c.to_string());
                DriverError::database(db_err.message(), code)
            }
            sqlx::Error::PoolTimedOut => {
                DriverError::connection("timed out waiting for a pooled connection")
            }
            sqlx::Error::PoolClosed => DriverError::connection("connection pool is closed"),
            sqlx::Error::Io(io_err) => DriverError::connection(format!("I/O error: {}", io_err)),
            sqlx::Error::Tls(tls_err) => DriverError::connection(format!("TLS error: {}", tls_err)),
            sqlx::Error::Protocol(msg) => {
                DriverError::connection(format!("protocol error: {}", msg))
            }
            sqlx::Error::ColumnNotFound(col) => {
                DriverError::internal(format!("column not found: {}", col))
            }
            sqlx::Error::ColumnIndexOutOfBounds { index, len } => DriverError::internal(format!(
                "column index {} out of bounds (len: {})",
                index, len
            )),
            sqlx::Error::ColumnDecode { index, source } => {
                DriverError::internal(format!("failed to decode column {}: {}", index, source))
            }
            sqlx::Error::Decode(source) => {
                DriverError::internal(format!("decode error: {}", source))
            }
            sqlx::Error::WorkerCrashed => DriverError::internal("database worker crashed"),
            _ => DriverError::internal(format!("unknown database error: {}", err)),
        }
    }
}

/// Result type alias for driver operations.
pub type DriverResult<T> = Result<T, DriverError>;
