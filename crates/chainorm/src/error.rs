//! Error types for chainorm

use std::sync::Arc;
use thiserror::Error;

/// Result type alias for chainorm operations
pub type OrmResult<T> = Result<T, OrmError>;

/// Error types for database operations
#[derive(Debug, Error)]
pub enum OrmError {
    /// Database connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Query execution error
    #[cfg(feature = "mysql")]
    #[error("Query error: {0}")]
    Query(#[from] mysql_async::Error),

    /// Row not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// A record operation ran without a model bound to the statement
    #[error("Model not set")]
    ModelNotSet,

    /// A field type has no column mapping
    #[error("Unsupported SQL type for column '{column}': {message}")]
    UnsupportedType { column: String, message: String },

    /// Unique constraint violation
    #[error("Unique constraint violation: {0}")]
    UniqueViolation(String),

    /// Foreign key constraint violation
    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),

    /// Check constraint violation
    #[error("Check constraint violation: {0}")]
    CheckViolation(String),

    /// Row decode/mapping error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl OrmError {
    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Create an unsupported type error for a specific column
    pub fn unsupported_type(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::UnsupportedType {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Check if this is a unique violation error
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, Self::UniqueViolation(_))
    }

    /// Check if this error was raised before anything reached the driver
    pub fn is_mapping_error(&self) -> bool {
        matches!(self, Self::ModelNotSet | Self::UnsupportedType { .. })
    }

    /// Parse a mysql_async error into a more specific OrmError
    #[cfg(feature = "mysql")]
    pub fn from_db_error(err: mysql_async::Error) -> Self {
        if let mysql_async::Error::Server(server) = &err {
            match server.code {
                1062 => return Self::UniqueViolation(server.message.clone()),
                1451 | 1452 => return Self::ForeignKeyViolation(server.message.clone()),
                3819 => return Self::CheckViolation(server.message.clone()),
                _ => {}
            }
        }
        Self::Query(err)
    }
}

/// Errors collected over the lifetime of a [`Chain`](crate::Chain).
///
/// Entries are shared with the statement that raised them, so both keep the
/// same error without requiring `OrmError: Clone`.
#[derive(Debug, Default, Clone)]
pub struct ErrorLog {
    errors: Vec<Arc<OrmError>>,
}

impl ErrorLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, err: Arc<OrmError>) {
        self.errors.push(err);
    }

    /// The most recent error.
    pub fn last(&self) -> Option<&OrmError> {
        self.errors.last().map(|e| e.as_ref())
    }

    /// All errors, oldest first.
    pub fn all(&self) -> &[Arc<OrmError>] {
        &self.errors
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }
}
