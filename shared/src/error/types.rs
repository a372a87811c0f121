//! Error types and their JSON:API rendering

use super::codes::ErrorCode;
use crate::jsonapi::{ErrorDocument, ErrorObject, ErrorSource, MEDIA_TYPE};
use http::StatusCode;
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// A field-level problem, rendered as its own JSON:API error object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// JSON pointer into the request document, e.g. `/data/attributes/email`
    pub pointer: String,
    /// Human-readable message for this field
    pub detail: String,
}

impl FieldError {
    /// Build a field error pointing at `/data/attributes/<field>`
    ///
    /// Rust field names are snake_case, wire attributes camelCase.
    pub fn attribute(field: &str, detail: impl Into<String>) -> Self {
        Self {
            pointer: format!("/data/attributes/{}", camel_case(field)),
            detail: detail.into(),
        }
    }
}

fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Application error with structured error code and details
///
/// This is the primary error type of the CMS, providing:
/// - Standardized error codes via [`ErrorCode`]
/// - Human-readable messages (the JSON:API `detail`)
/// - Optional structured details for debugging
/// - Optional per-field sources for validation failures
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct AppError {
    /// The error code identifying the type of error
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details (context for logs and `meta`)
    pub details: Option<HashMap<String, Value>>,
    /// Field-level errors; empty for non-validation errors
    pub sources: Vec<FieldError>,
}

impl AppError {
    /// Create a new error with the default message for the error code
    pub fn new(code: ErrorCode) -> Self {
        Self {
            message: code.message().to_string(),
            code,
            details: None,
            sources: Vec::new(),
        }
    }

    /// Create a new error with a custom message
    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
            sources: Vec::new(),
        }
    }

    /// Add a detail entry to this error
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Attach a field-level error
    pub fn with_source(mut self, source: FieldError) -> Self {
        self.sources.push(source);
        self
    }

    /// Get the HTTP status code for this error
    pub fn http_status(&self) -> StatusCode {
        self.code.http_status()
    }

    // ==================== Convenience constructors ====================

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::ValidationFailed, msg)
    }

    /// Create a validation error attached to one attribute
    pub fn invalid_attribute(field: &str, msg: impl Into<String>) -> Self {
        let msg = msg.into();
        Self::with_message(ErrorCode::ValidationFailed, msg.clone())
            .with_source(FieldError::attribute(field, msg))
    }

    /// Create a not found error
    pub fn not_found(resource: impl Into<String>) -> Self {
        let r = resource.into();
        Self::with_message(ErrorCode::NotFound, format!("{} not found", r))
            .with_detail("resource", r)
    }

    /// Create a not authenticated error
    pub fn not_authenticated() -> Self {
        Self::new(ErrorCode::NotAuthenticated)
    }

    /// Create a permission denied error
    pub fn permission_denied(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::PermissionDenied, msg)
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::InternalError, msg)
    }

    /// Create a database error
    pub fn database(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::DatabaseError, msg)
    }

    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::StorageError, msg)
    }

    /// Create an invalid request error
    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::InvalidRequest, msg)
    }

    /// Create a forbidden/permission denied error (alias for permission_denied)
    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::PermissionDenied, msg)
    }

    /// Create an invalid token error
    pub fn invalid_token(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::TokenInvalid, msg)
    }

    /// Create a token expired error
    pub fn token_expired() -> Self {
        Self::new(ErrorCode::TokenExpired)
    }

    /// Create an unauthorized error (alias for not_authenticated)
    pub fn unauthorized() -> Self {
        Self::new(ErrorCode::NotAuthenticated)
    }

    /// Create an invalid credentials error
    pub fn invalid_credentials() -> Self {
        Self::new(ErrorCode::InvalidCredentials)
    }

    /// Create a conflict error
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::AlreadyExists, msg)
    }

    /// Create a document type/id mismatch error (JSON:API requires 409)
    pub fn type_mismatch(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::ResourceTypeMismatch, msg)
    }

    /// Convert into the JSON:API error objects for the response body
    pub fn to_error_objects(&self) -> Vec<ErrorObject> {
        let status = self.http_status();
        let base = ErrorObject {
            status: status.as_u16().to_string(),
            title: status
                .canonical_reason()
                .unwrap_or("Error")
                .to_string(),
            detail: Some(self.message.clone()),
            code: Some(self.code.to_string()),
            source: None,
        };

        if self.sources.is_empty() {
            return vec![base];
        }

        self.sources
            .iter()
            .map(|s| ErrorObject {
                detail: Some(s.detail.clone()),
                source: Some(ErrorSource {
                    pointer: s.pointer.clone(),
                }),
                ..base.clone()
            })
            .collect()
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<(String, String)> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter()
                    .map(|e| {
                        let field = attribute_of(&field, e);
                        let msg = validation_message(&field, e);
                        (field, msg)
                    })
                    .collect::<Vec<_>>()
            })
            .collect();
        fields.sort();

        let message = fields
            .first()
            .map(|(_, msg)| msg.clone())
            .unwrap_or_else(|| ErrorCode::ValidationFailed.message().to_string());

        fields.into_iter().fold(
            AppError::with_message(ErrorCode::ValidationFailed, message),
            |err, (field, msg)| err.with_source(FieldError::attribute(&field, msg)),
        )
    }
}

/// 结构级 (schema) 错误通过 `field` 参数指明所属属性
fn attribute_of(field: &str, error: &validator::ValidationError) -> String {
    if field == "__all__" {
        if let Some(name) = error.params.get("field").and_then(|v| v.as_str()) {
            return name.to_string();
        }
    }
    field.to_string()
}

fn validation_message(field: &str, error: &validator::ValidationError) -> String {
    if let Some(msg) = &error.message {
        return msg.to_string();
    }
    let name = field.replace('_', " ");
    match error.code.as_ref() {
        "email" => format!("The {name} must be a valid email address."),
        "length" => format!("The {name} field has an invalid length."),
        "required" => format!("The {name} field is required."),
        "must_match" => format!("The {name} confirmation does not match."),
        "url" => format!("The {name} must be a valid URL."),
        _ => format!("The {name} field is invalid."),
    }
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;

// ===== Axum Integration =====

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = self.http_status();

        // Log system errors
        if matches!(self.code.category(), super::category::ErrorCategory::System) {
            tracing::error!(
                code = %self.code,
                message = %self.message,
                "System error occurred"
            );
        }

        let mut body = ErrorDocument {
            errors: self.to_error_objects(),
        };

        // 系统错误不向客户端暴露内部细节
        if status.is_server_error() {
            for e in &mut body.errors {
                e.detail = Some(self.code.message().to_string());
            }
        }

        let bytes = serde_json::to_vec(&body).unwrap_or_default();
        (
            status,
            [(http::header::CONTENT_TYPE, MEDIA_TYPE)],
            bytes,
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn test_app_error_new() {
        let err = AppError::new(ErrorCode::NotFound);
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.message, "Resource not found");
        assert!(err.details.is_none());
        assert!(err.sources.is_empty());
    }

    #[test]
    fn test_app_error_with_detail() {
        let err = AppError::validation("Missing required field").with_detail("field", "email");
        let details = err.details.unwrap();
        assert_eq!(details.get("field").unwrap(), "email");
    }

    #[test]
    fn test_forbidden_renders_json_api_error_object() {
        let err = AppError::forbidden("You cannot delete yourself.");
        let objects = err.to_error_objects();

        assert_eq!(objects.len(), 1);
        assert_eq!(objects[0].status, "403");
        assert_eq!(objects[0].title, "Forbidden");
        assert_eq!(
            objects[0].detail.as_deref(),
            Some("You cannot delete yourself.")
        );
        assert_eq!(objects[0].code.as_deref(), Some("2001"));
        assert!(objects[0].source.is_none());
    }

    #[test]
    fn test_conflict_title() {
        let err = AppError::new(ErrorCode::RoleInUse);
        let objects = err.to_error_objects();
        assert_eq!(objects[0].status, "409");
        assert_eq!(objects[0].title, "Conflict");
    }

    #[derive(Validate)]
    struct Signup {
        #[validate(email)]
        email: String,
        #[validate(length(min = 8, message = "The password must be at least 8 characters."))]
        password: String,
    }

    #[test]
    fn test_validation_errors_become_one_object_per_field() {
        let input = Signup {
            email: "not-an-email".into(),
            password: "short".into(),
        };
        let err: AppError = input.validate().unwrap_err().into();

        assert_eq!(err.code, ErrorCode::ValidationFailed);
        let objects = err.to_error_objects();
        assert_eq!(objects.len(), 2);
        assert!(objects.iter().all(|o| o.status == "422"));

        // sorted by field name
        let email = objects[0].source.as_ref().unwrap();
        assert_eq!(email.pointer, "/data/attributes/email");
        assert_eq!(
            objects[0].detail.as_deref(),
            Some("The email must be a valid email address.")
        );
        assert_eq!(
            objects[1].detail.as_deref(),
            Some("The password must be at least 8 characters.")
        );
    }

    #[test]
    fn test_pointer_uses_wire_attribute_name() {
        let err = AppError::invalid_attribute("is_on_homepage", "The is on homepage field must be true or false.");
        assert_eq!(err.sources[0].pointer, "/data/attributes/isOnHomepage");
    }

    #[test]
    fn test_invalid_attribute_points_at_field() {
        let err = AppError::invalid_attribute("status", "The selected status is invalid.");
        let objects = err.to_error_objects();
        assert_eq!(
            objects[0].source.as_ref().unwrap().pointer,
            "/data/attributes/status"
        );
    }
}
