//! Database errors

use thiserror::Error;

/// Database errors
#[derive(Error, Debug)]
pub enum DbError {
    /// SQLx error
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Record not found
    #[error("record not found")]
    NotFound,

    /// Unique constraint violated (raised directly by non-SQL test stores)
    #[error("unique constraint violated")]
    UniqueViolation,
}

impl DbError {
    /// Whether this error is a store-level unique-constraint violation
    ///
    /// The duplicate-referral and IP-lock paths rely on unique indexes
    /// instead of check-then-act, so callers need to recognize the
    /// violation and map it to a domain error.
    pub fn is_unique_violation(&self) -> bool {
        match self {
            Self::UniqueViolation => true,
            Self::Sqlx(sqlx::Error::Database(db)) => {
                matches!(db.kind(), sqlx::error::ErrorKind::UniqueViolation)
            }
            _ => false,
        }
    }
}

/// Result type for database operations
pub type DbResult<T> = Result<T, DbError>;
