//! Unified error codes for the CMS
//!
//! This module defines all error codes used by the server and surfaced to the
//! admin frontend in the `code` member of JSON:API error objects.
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 6xxx: Content errors (items, categories, tags, media)
//! - 7xxx: Site errors (contact messages, subscriptions, settings)
//! - 8xxx: Account errors (users, roles, permissions)
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility (Rust, TypeScript, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format
    InvalidFormat = 6,
    /// JSON:API document `type`/`id` does not match the endpoint
    ResourceTypeMismatch = 9,
    /// Request body too large
    PayloadTooLarge = 10,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Invalid credentials (email/password)
    InvalidCredentials = 1002,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,

    // ==================== 2xxx: Permission ====================
    /// Permission denied by a policy
    PermissionDenied = 2001,
    /// An actor tried to delete their own account
    CannotDeleteSelf = 2006,

    // ==================== 6xxx: Content ====================
    /// Item not found
    ItemNotFound = 6001,
    /// Category not found
    CategoryNotFound = 6101,
    /// Category still has items
    CategoryHasItems = 6102,
    /// Category name already taken
    CategoryNameExists = 6103,
    /// Tag not found
    TagNotFound = 6201,
    /// Tag name already taken
    TagNameExists = 6202,
    /// Uploaded media type is not supported
    UnsupportedMedia = 6301,

    // ==================== 7xxx: Site ====================
    /// Contact message not found
    ContactMessageNotFound = 7001,
    /// Subscription not found
    SubscriptionNotFound = 7101,
    /// E-mail already subscribed
    AlreadySubscribed = 7102,
    /// Setting key is not known
    UnknownSetting = 7201,

    // ==================== 8xxx: Account ====================
    /// User not found
    UserNotFound = 8001,
    /// E-mail already taken by another user
    EmailTaken = 8002,
    /// Role not found
    RoleNotFound = 8101,
    /// Role name already taken
    RoleNameExists = 8102,
    /// Role still has users assigned
    RoleInUse = 8103,
    /// Permission name is not known
    UnknownPermission = 8104,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Configuration error
    ConfigError = 9003,
    /// File storage error
    StorageError = 9004,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::ResourceTypeMismatch => "Resource type or id does not match the endpoint",
            ErrorCode::PayloadTooLarge => "Payload too large",

            // Auth
            ErrorCode::NotAuthenticated => "Unauthenticated.",
            ErrorCode::InvalidCredentials => "These credentials do not match our records.",
            ErrorCode::TokenExpired => "Token has expired",
            ErrorCode::TokenInvalid => "Token is invalid",

            // Permission
            ErrorCode::PermissionDenied => "This action is unauthorized.",
            ErrorCode::CannotDeleteSelf => "You cannot delete yourself.",

            // Content
            ErrorCode::ItemNotFound => "Item not found",
            ErrorCode::CategoryNotFound => "Category not found",
            ErrorCode::CategoryHasItems => "Category has associated items",
            ErrorCode::CategoryNameExists => "The name has already been taken.",
            ErrorCode::TagNotFound => "Tag not found",
            ErrorCode::TagNameExists => "The name has already been taken.",
            ErrorCode::UnsupportedMedia => "Unsupported media type",

            // Site
            ErrorCode::ContactMessageNotFound => "Contact message not found",
            ErrorCode::SubscriptionNotFound => "Subscription not found",
            ErrorCode::AlreadySubscribed => "The email has already been subscribed.",
            ErrorCode::UnknownSetting => "Unknown setting",

            // Account
            ErrorCode::UserNotFound => "User not found",
            ErrorCode::EmailTaken => "The email has already been taken.",
            ErrorCode::RoleNotFound => "Role not found",
            ErrorCode::RoleNameExists => "The name has already been taken.",
            ErrorCode::RoleInUse => "Role has associated users",
            ErrorCode::UnknownPermission => "Unknown permission",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::ConfigError => "Configuration error",
            ErrorCode::StorageError => "Storage error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            6 => Ok(ErrorCode::InvalidFormat),
            9 => Ok(ErrorCode::ResourceTypeMismatch),
            10 => Ok(ErrorCode::PayloadTooLarge),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::InvalidCredentials),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),
            2006 => Ok(ErrorCode::CannotDeleteSelf),

            // Content
            6001 => Ok(ErrorCode::ItemNotFound),
            6101 => Ok(ErrorCode::CategoryNotFound),
            6102 => Ok(ErrorCode::CategoryHasItems),
            6103 => Ok(ErrorCode::CategoryNameExists),
            6201 => Ok(ErrorCode::TagNotFound),
            6202 => Ok(ErrorCode::TagNameExists),
            6301 => Ok(ErrorCode::UnsupportedMedia),

            // Site
            7001 => Ok(ErrorCode::ContactMessageNotFound),
            7101 => Ok(ErrorCode::SubscriptionNotFound),
            7102 => Ok(ErrorCode::AlreadySubscribed),
            7201 => Ok(ErrorCode::UnknownSetting),

            // Account
            8001 => Ok(ErrorCode::UserNotFound),
            8002 => Ok(ErrorCode::EmailTaken),
            8101 => Ok(ErrorCode::RoleNotFound),
            8102 => Ok(ErrorCode::RoleNameExists),
            8103 => Ok(ErrorCode::RoleInUse),
            8104 => Ok(ErrorCode::UnknownPermission),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9003 => Ok(ErrorCode::ConfigError),
            9004 => Ok(ErrorCode::StorageError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
