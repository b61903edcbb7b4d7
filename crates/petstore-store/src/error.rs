//! Storage error type and classification helpers.

use thiserror::Error;

/// Result type alias using [`StoreError`].
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors from the storage layer.
///
/// Missing rows discovered *during a write* (update/delete affecting zero
/// rows) surface as [`StoreError::RowNotFound`] so the service layer can map
/// them to a typed not-found error instead of an internal one.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The targeted row does not exist.
    #[error("row not found")]
    RowNotFound,

    /// Any other database error, including constraint violations.
    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl StoreError {
    /// Returns `true` if this error is a unique-constraint violation.
    #[must_use]
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, Self::Database(sqlx::Error::Database(db)) if db.is_unique_violation())
    }

    /// Returns `true` if this error is a foreign-key-constraint violation.
    #[must_use]
    pub fn is_foreign_key_violation(&self) -> bool {
        matches!(self, Self::Database(sqlx::Error::Database(db)) if db.is_foreign_key_violation())
    }

    /// Returns `true` if the targeted row was missing.
    #[must_use]
    pub fn is_row_not_found(&self) -> bool {
        matches!(self, Self::RowNotFound)
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Self::RowNotFound,
            other => Self::Database(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_not_found_classification() {
        let err: StoreError = sqlx::Error::RowNotFound.into();
        assert!(err.is_row_not_found());
        assert!(!err.is_unique_violation());
    }

    #[test]
    fn test_other_errors_are_database() {
        let err: StoreError = sqlx::Error::PoolClosed.into();
        assert!(!err.is_row_not_found());
        assert!(!err.is_unique_violation());
        assert!(err.to_string().contains("database error"));
    }
}
