//! HTTP response builders with correct status codes
//!
//! - **204 No Content** ([`NoContent`])
//! - **422 Unprocessable Entity** with field-level errors ([`ValidationError`])
//! - negotiated bodies that already carry their media type ([`Representation`])

use axum::{
    http::{header, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};

// ============================================================================
// 204 No Content
// ============================================================================

/// HTTP 204 No Content response
#[derive(Debug, Clone, Copy)]
pub struct NoContent;

impl IntoResponse for NoContent {
    fn into_response(self) -> Response {
        StatusCode::NO_CONTENT.into_response()
    }
}

// ============================================================================
// Negotiated representation
// ============================================================================

/// A body already serialized for the negotiated media type
#[derive(Debug)]
pub struct Representation {
    status: StatusCode,
    content_type: &'static str,
    body: Bytes,
    headers: Vec<(HeaderName, HeaderValue)>,
}

impl Representation {
    pub fn new(content_type: &'static str, body: impl Into<Bytes>) -> Self {
        Self {
            status: StatusCode::OK,
            content_type,
            body: body.into(),
            headers: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.push((name, value));
        self
    }

    /// Set `Location`; values that are not valid header text are dropped
    #[must_use]
    pub fn with_location(self, location: &str) -> Self {
        match HeaderValue::from_str(location) {
            Ok(value) => self.with_header(header::LOCATION, value),
            Err(_) => self,
        }
    }
}

impl IntoResponse for Representation {
    fn into_response(self) -> Response {
        let mut response = (self.status, self.body).into_response();
        let headers = response.headers_mut();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static(self.content_type),
        );
        for (name, value) in self.headers {
            headers.insert(name, value);
        }
        response
    }
}

// ============================================================================
// 422 Unprocessable Entity (Validation Errors)
// ============================================================================

/// Field-level validation error
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Field name
    pub field: String,
    /// Error code (e.g., "REQUIRED", "LENGTH", "TITLE_EQUALS_DESCRIPTION")
    pub code: String,
    /// Human-readable error message
    pub message: String,
}

/// HTTP 422 Unprocessable Entity response
///
/// ```rust
/// use library_api::responses::ValidationError;
///
/// let mut errors = ValidationError::new("Validation failed");
/// errors.add_field_error(
///     "description",
///     "TITLE_EQUALS_DESCRIPTION",
///     "The provided description should be different from the title.",
/// );
/// assert!(errors.has_errors());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    error: String,
    status: u16,
    /// Field-level validation errors, in the order they were found
    pub errors: Vec<FieldError>,
}

impl ValidationError {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            status: StatusCode::UNPROCESSABLE_ENTITY.as_u16(),
            errors: Vec::new(),
        }
    }

    /// Add a field-level error
    pub fn add_field_error(
        &mut self,
        field: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.errors.push(FieldError {
            field: field.into(),
            code: code.into(),
            message: message.into(),
        });
    }

    /// Check if there are any validation errors
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Get the number of field errors
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// `Ok(())` when empty, the collected errors otherwise
    pub fn into_result(self) -> Result<(), Self> {
        if self.has_errors() {
            Err(self)
        } else {
            Ok(())
        }
    }

    fn collect(&mut self, prefix: &str, errors: &validator::ValidationErrors) {
        use validator::ValidationErrorsKind;

        let mut entries: Vec<_> = errors.errors().iter().collect();
        entries.sort_by_key(|(field, _)| field.to_string());

        for (field, kind) in entries {
            let path = format!("{prefix}{field}");
            match kind {
                ValidationErrorsKind::Field(field_errors) => {
                    for error in field_errors {
                        let message = error
                            .message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| format!("Validation failed for field '{path}'"));
                        self.add_field_error(path.clone(), error.code.to_uppercase(), message);
                    }
                }
                ValidationErrorsKind::Struct(nested) => {
                    self.collect(&format!("{path}."), nested);
                }
                ValidationErrorsKind::List(items) => {
                    for (index, nested) in items {
                        self.collect(&format!("{path}[{index}]."), nested);
                    }
                }
            }
        }
    }
}

impl Default for ValidationError {
    fn default() -> Self {
        Self::new("Validation failed")
    }
}

impl From<validator::ValidationErrors> for ValidationError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut result = Self::default();
        result.collect("", &errors);
        result
    }
}

impl IntoResponse for ValidationError {
    fn into_response(self) -> Response {
        (StatusCode::UNPROCESSABLE_ENTITY, Json(self)).into_response()
    }
}
