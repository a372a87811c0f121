//! Unified error system for the CMS
//!
//! This module provides the error handling system shared by the server and
//! its tests:
//! - [`ErrorCode`]: Standardized error codes for all error types
//! - [`ErrorCategory`]: Classification of errors by domain
//! - [`AppError`]: Rich error type with codes, messages, details and field sources
//!
//! # Error Code Ranges
//!
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 6xxx: Content errors
//! - 7xxx: Site errors
//! - 8xxx: Account errors
//! - 9xxx: System errors
//!
//! # Example
//!
//! ```
//! use shared::error::{AppError, ErrorCode};
//!
//! // Create a simple error
//! let err = AppError::new(ErrorCode::NotFound);
//!
//! // Create an error with custom message
//! let err = AppError::with_message(ErrorCode::CannotDeleteSelf, "You cannot delete yourself.");
//!
//! // Create an error bound to a request attribute
//! let err = AppError::invalid_attribute("email", "The email must be a valid email address.");
//! assert_eq!(err.to_error_objects()[0].status, "422");
//! ```

mod category;
mod codes;
mod http;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{AppError, AppResult, FieldError};
