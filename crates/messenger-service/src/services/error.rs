//! Service layer error types
//!
//! Provides a unified error type for all service operations.

use messenger_common::AppError;
use messenger_core::{DomainError, ErrorKind};
use validator::ValidationErrors;

/// Service layer error type
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Domain rule violation or classified storage failure
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Application error (auth, config)
    #[error(transparent)]
    App(#[from] AppError),

    /// Request body failed field validation
    #[error("Validation failed")]
    Fields(#[from] ValidationErrors),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Domain(DomainError::ValidationError(msg.into()))
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Domain(e) => e.kind(),
            Self::App(e) => e.kind(),
            Self::Fields(_) => ErrorKind::InvalidArgument,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::App(e) => e.status_code(),
            other => other.kind().http_status(),
        }
    }

    /// Get the error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Domain(e) => e.code(),
            Self::App(e) => e.error_code(),
            Self::Fields(_) => "VALIDATION_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

/// Result type for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;
