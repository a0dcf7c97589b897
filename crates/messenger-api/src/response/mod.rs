//! Response types and error handling for API endpoints
//!
//! Provides unified error handling and JSON response formatting.

use axum::{
    body::{to_bytes, Body},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use messenger_common::AppError;
use messenger_core::{DomainError, ErrorKind};
use messenger_service::ServiceError;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};
use validator::ValidationErrors;

/// API error type for consistent error responses
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    App(#[from] AppError),

    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Validation failed")]
    Validation(#[from] ValidationErrors),

    #[error("Invalid path parameter: {0}")]
    InvalidPath(String),

    #[error("Invalid query parameter: {0}")]
    InvalidQuery(String),

    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    #[error("Missing authentication")]
    MissingAuth,

    #[error("Internal server error")]
    Internal(#[source] anyhow::Error),
}

impl ApiError {
    /// Failure category; the HTTP status follows from it
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::App(e) => e.kind(),
            Self::Service(e) => e.kind(),
            Self::Domain(e) => e.kind(),
            Self::Validation(_)
            | Self::InvalidPath(_)
            | Self::InvalidQuery(_)
            | Self::InvalidBody(_) => ErrorKind::InvalidArgument,
            Self::MissingAuth => ErrorKind::Unauthenticated,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Get HTTP status code for this error
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        let code = match self {
            Self::App(e) => e.status_code(),
            Self::Service(e) => e.status_code(),
            other => other.kind().http_status(),
        };
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Get error code for API responses
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::App(e) => e.error_code(),
            Self::Service(e) => e.error_code(),
            Self::Domain(e) => e.code(),
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::InvalidPath(_) => "INVALID_PATH_PARAMETER",
            Self::InvalidQuery(_) => "INVALID_QUERY_PARAMETER",
            Self::InvalidBody(_) => "INVALID_BODY",
            Self::MissingAuth => "UNAUTHENTICATED",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Create an internal error from any error
    pub fn internal(err: impl Into<anyhow::Error>) -> Self {
        Self::Internal(err.into())
    }

    pub fn invalid_path(msg: impl Into<String>) -> Self {
        Self::InvalidPath(msg.into())
    }

    pub fn invalid_query(msg: impl Into<String>) -> Self {
        Self::InvalidQuery(msg.into())
    }

    pub fn invalid_body(msg: impl Into<String>) -> Self {
        Self::InvalidBody(msg.into())
    }

    /// Short client-facing message; internal failures never echo their cause
    fn public_message(&self) -> String {
        match self.kind() {
            ErrorKind::Internal => "Internal server error".to_string(),
            ErrorKind::Transient => "Service temporarily unavailable".to_string(),
            _ => self.to_string(),
        }
    }

    /// Field errors, wherever in the chain they were raised
    fn field_errors(&self) -> Option<&ValidationErrors> {
        match self {
            Self::Validation(errors) | Self::Service(ServiceError::Fields(errors)) => Some(errors),
            _ => None,
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Error detail for API responses
#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Debug rendering of a failure, carried in response extensions until the
/// development-mode layer decides whether to expose it
#[derive(Debug, Clone)]
pub struct ErrorDebug(pub String);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            error!(error = ?self, code = self.error_code(), "Server error occurred");
        } else {
            warn!(error = %self, code = self.error_code(), "Request failed");
        }

        let details = self
            .field_errors()
            .map(|errors| serde_json::to_value(errors).unwrap_or_default());

        let body = ErrorBody {
            error: ErrorDetail {
                code: self.error_code().to_string(),
                message: self.public_message(),
                details,
            },
        };

        let mut response = (status, Json(body)).into_response();
        response
            .extensions_mut()
            .insert(ErrorDebug(format!("{self:?}")));
        response
    }
}

/// Largest error body the debug layer will rewrite
const MAX_ERROR_BODY: usize = 64 * 1024;

/// Copy the failure's debug rendering into `error.details.debug`
///
/// Only installed in development mode.
pub async fn attach_error_debug(response: Response) -> Response {
    let Some(ErrorDebug(debug)) = response.extensions().get::<ErrorDebug>().cloned() else {
        return response;
    };

    let (mut parts, body) = response.into_parts();
    let bytes = match to_bytes(body, MAX_ERROR_BODY).await {
        Ok(bytes) => bytes,
        Err(_) => return Response::from_parts(parts, Body::empty()),
    };

    let mut value: serde_json::Value = match serde_json::from_slice(&bytes) {
        Ok(value) => value,
        Err(_) => return Response::from_parts(parts, Body::from(bytes)),
    };

    if let Some(error) = value.get_mut("error").and_then(|e| e.as_object_mut()) {
        let details = error.entry("details").or_insert(serde_json::Value::Null);
        if !details.is_object() {
            let fields = details.take();
            *details = if fields.is_null() {
                serde_json::json!({})
            } else {
                serde_json::json!({ "fields": fields })
            };
        }
        if let Some(details) = details.as_object_mut() {
            details.insert("debug".to_string(), serde_json::Value::String(debug));
        }
    }

    parts.headers.remove(axum::http::header::CONTENT_LENGTH);
    let body = serde_json::to_vec(&value).unwrap_or_else(|_| bytes.to_vec());
    Response::from_parts(parts, Body::from(body))
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;

/// Created response (201) with JSON body
pub struct Created<T>(pub T);

impl<T: IntoResponse> IntoResponse for Created<T> {
    fn into_response(self) -> Response {
        let mut response = self.0.into_response();
        *response.status_mut() = StatusCode::CREATED;
        response
    }
}

/// No content response (204)
pub struct NoContent;

impl IntoResponse for NoContent {
    fn into_response(self) -> Response {
        StatusCode::NO_CONTENT.into_response()
    }
}
