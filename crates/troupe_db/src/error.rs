//! Error types for the persistence layer.

use miette::Diagnostic;
use thiserror::Error;

/// Result type alias for database operations.
pub type DbResult<T> = Result<T, DbError>;

/// Database error types.
#[derive(Debug, Error, Diagnostic)]
pub enum DbError {
    /// SQLite/sqlx error
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Migration error
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Entity not found
    #[error("{entity_type} not found: {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// Invalid data
    #[error("Invalid data: {message}")]
    InvalidData { message: String },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error (for filesystem operations if needed)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Constraint violation
    #[error("Constraint violation: {message}")]
    ConstraintViolation { message: String },
}

impl DbError {
    /// Create a not found error.
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Create an invalid data error.
    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData {
            message: message.into(),
        }
    }

    /// Create a constraint violation error.
    pub fn constraint_violation(message: impl Into<String>) -> Self {
        Self::ConstraintViolation {
            message: message.into(),
        }
    }

    /// True when the underlying driver rejected a write because a foreign
    /// key still has (or lacks) referents - e.g. deleting a session whose
    /// transcript messages still point at it.
    pub fn is_foreign_key_violation(&self) -> bool {
        matches!(
            self,
            Self::Sqlx(sqlx::Error::Database(db))
                if db.kind() == sqlx::error::ErrorKind::ForeignKeyViolation
        )
    }

    /// True when a CHECK constraint rejected a value, such as an
    /// out-of-enum status string.
    pub fn is_check_violation(&self) -> bool {
        matches!(
            self,
            Self::Sqlx(sqlx::Error::Database(db))
                if db.kind() == sqlx::error::ErrorKind::CheckViolation
        )
    }
}
