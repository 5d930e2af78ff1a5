//! Store error types
//!
//! Defines all errors that can occur in the persistence layer.

use thiserror::Error;

/// Errors that can occur in the store
#[derive(Error, Debug)]
pub enum StoreError {
    /// SQLite operation failed
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// I/O operation failed (creating the database directory)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Requested row does not exist
    #[error("{0} not found")]
    NotFound(String),

    /// Unique constraint would be violated
    #[error("{0}")]
    Conflict(String),

    /// Input rejected by a store-level rule
    #[error("{0}")]
    Invalid(String),

    /// Connection mutex was poisoned by a panicking writer
    #[error("Lock error: {0}")]
    Lock(String),
}

impl StoreError {
    /// Map a unique-constraint failure to `Conflict`, leaving other errors intact
    pub(crate) fn on_unique(err: rusqlite::Error, message: impl Into<String>) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _)
                if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
            {
                StoreError::Conflict(message.into())
            }
            _ => StoreError::Sqlite(err),
        }
    }
}

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StoreError::NotFound("Book".to_string());
        assert_eq!(err.to_string(), "Book not found");

        let err = StoreError::Conflict("ISBN already exists".to_string());
        assert_eq!(err.to_string(), "ISBN already exists");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let store_err: StoreError = io_err.into();
        assert!(matches!(store_err, StoreError::Io(_)));
    }

    #[test]
    fn test_non_unique_failure_is_not_conflict() {
        let err = StoreError::on_unique(rusqlite::Error::QueryReturnedNoRows, "dup");
        assert!(matches!(err, StoreError::Sqlite(_)));
    }
}
