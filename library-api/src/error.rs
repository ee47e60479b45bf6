//! Error types and HTTP response conversion

use std::any::Any;
use std::fmt;
use std::time::Duration;

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::repository::{RepositoryError, RepositoryErrorKind};
use crate::responses::ValidationError;

/// Body text of every 500 answer; details only go to the log
pub const GENERIC_FAILURE_MESSAGE: &str = "An unexpected error happened. Try again later.";

/// Result type alias using the crate error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type of the service
///
/// Large error variants are boxed to reduce stack size
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(Box<figment::Error>),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serializing a response body failed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The data-access layer failed
    #[error("{0}")]
    Persistence(#[from] RepositoryError),

    /// Malformed request: unknown sort or shape field, missing or unreadable body
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Well-formed request breaking a field or cross-field rule (422)
    #[error("Validation error: {} field error(s)", .0.error_count())]
    Validation(ValidationError),

    /// Resource or its declared parent does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Resource conflict (409)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// No supported representation for the Accept header (406)
    #[error("Not acceptable: {0}")]
    NotAcceptable(String),

    /// No payload schema for the Content-Type header (415)
    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    /// Rate limit exceeded (429)
    #[error("Rate limit exceeded, retry after {}s", .retry_after.as_secs())]
    RateLimited {
        /// Time until the client may try again
        retry_after: Duration,
    },

    /// Internal server error
    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,

    /// Optional error code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    /// HTTP status code
    pub status: u16,
}

impl ErrorResponse {
    /// Create a new error response
    pub fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: None,
            status: status.as_u16(),
        }
    }

    /// Create error response with a code
    pub fn with_code(
        status: StatusCode,
        code: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            error: error.into(),
            code: Some(code.into()),
            status: status.as_u16(),
        }
    }

    /// The generic 500 body
    pub fn internal() -> Self {
        Self::with_code(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_ERROR",
            GENERIC_FAILURE_MESSAGE,
        )
    }
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)
    }
}

fn internal_error_response() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorResponse::internal())).into_response()
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, error_response) = match self {
            Error::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::with_code(StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ),

            Error::Validation(errors) => return errors.into_response(),

            // Missing resources and duplicate-creation probes answer without a body
            Error::NotFound(msg) => {
                tracing::debug!("Not found: {}", msg);
                return StatusCode::NOT_FOUND.into_response();
            }

            Error::Conflict(msg) => {
                tracing::debug!("Conflict: {}", msg);
                return StatusCode::CONFLICT.into_response();
            }

            Error::NotAcceptable(msg) => (
                StatusCode::NOT_ACCEPTABLE,
                ErrorResponse::with_code(StatusCode::NOT_ACCEPTABLE, "NOT_ACCEPTABLE", msg),
            ),

            Error::UnsupportedMediaType(msg) => (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                ErrorResponse::with_code(
                    StatusCode::UNSUPPORTED_MEDIA_TYPE,
                    "UNSUPPORTED_MEDIA_TYPE",
                    msg,
                ),
            ),

            Error::RateLimited { retry_after } => {
                let body = ErrorResponse::with_code(
                    StatusCode::TOO_MANY_REQUESTS,
                    "RATE_LIMIT_EXCEEDED",
                    "Too many requests",
                );
                let mut response = (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();
                // Round up so clients never retry a moment too early
                let secs = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
                response
                    .headers_mut()
                    .insert(header::RETRY_AFTER, HeaderValue::from(secs.max(1)));
                return response;
            }

            Error::Persistence(e) => {
                match e.kind {
                    RepositoryErrorKind::NotFound => {
                        tracing::debug!("{}", e);
                        return StatusCode::NOT_FOUND.into_response();
                    }
                    RepositoryErrorKind::AlreadyExists => {
                        tracing::warn!("{}", e);
                        return StatusCode::CONFLICT.into_response();
                    }
                    _ => {
                        tracing::error!(
                            operation = %e.operation,
                            kind = %e.kind,
                            entity_type = ?e.entity_type,
                            entity_id = ?e.entity_id,
                            "Persistence failure: {}", e.message
                        );
                    }
                }
                (StatusCode::INTERNAL_SERVER_ERROR, ErrorResponse::internal())
            }

            Error::Config(e) => {
                tracing::error!("Configuration error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, ErrorResponse::internal())
            }

            Error::Io(e) => {
                tracing::error!("I/O error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, ErrorResponse::internal())
            }

            Error::Serialization(msg) => {
                tracing::error!("Serialization error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, ErrorResponse::internal())
            }

            Error::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, ErrorResponse::internal())
            }
        };

        (status, Json(error_response)).into_response()
    }
}

/// Panic handler for `CatchPanicLayer::custom`
///
/// Logs the panic payload and answers with the generic 500 body.
pub fn handle_panic(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "unknown panic payload".to_string()
    };

    tracing::error!(panic = %detail, "Request handler panicked");
    internal_error_response()
}

// Manual From implementations for boxed errors
impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Error::Config(Box::new(err))
    }
}

impl From<ValidationError> for Error {
    fn from(err: ValidationError) -> Self {
        Error::Validation(err)
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(err: validator::ValidationErrors) -> Self {
        Error::Validation(err.into())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<axum::http::header::InvalidHeaderValue> for Error {
    fn from(err: axum::http::header::InvalidHeaderValue) -> Self {
        Error::Internal(format!("Invalid header value: {}", err))
    }
}
