//! Error handling utilities for repositories
//!
//! Raw `sqlx` errors never leave this crate; they are classified here.

use messenger_core::error::DomainError;
use sqlx::Error as SqlxError;

/// Convert SQLx error to DomainError
pub fn map_db_error(e: SqlxError) -> DomainError {
    match &e {
        SqlxError::PoolTimedOut | SqlxError::PoolClosed | SqlxError::WorkerCrashed => {
            DomainError::StorageUnavailable(e.to_string())
        }
        SqlxError::Io(_) | SqlxError::Tls(_) => DomainError::StorageUnavailable(e.to_string()),
        SqlxError::Database(db_err) if db_err.is_unique_violation() => {
            DomainError::UniqueViolation(db_err.constraint().unwrap_or("unique").to_string())
        }
        _ => DomainError::DatabaseError(e.to_string()),
    }
}

/// Check for unique violation and return appropriate error or fallback
pub fn map_unique_violation<F>(e: SqlxError, on_unique: F) -> DomainError
where
    F: FnOnce() -> DomainError,
{
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            return on_unique();
        }
    }
    map_db_error(e)
}

#[cfg(test)]
mod tests {
    use super::*;
    use messenger_core::ErrorKind;

    #[test]
    fn test_pool_errors_are_transient() {
        assert_eq!(map_db_error(SqlxError::PoolTimedOut).kind(), ErrorKind::Transient);
        assert_eq!(map_db_error(SqlxError::PoolClosed).kind(), ErrorKind::Transient);
    }

    #[test]
    fn test_other_errors_are_internal() {
        assert_eq!(map_db_error(SqlxError::RowNotFound).kind(), ErrorKind::Internal);
    }

    #[test]
    fn test_unique_fallback_passes_through_non_db_errors() {
        let err = map_unique_violation(SqlxError::PoolTimedOut, || DomainError::AlreadyMember);
        assert!(err.is_transient());
    }
}
