//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            // Success
            Self::Success => StatusCode::OK,

            // 404 Not Found
            Self::NotFound
            | Self::ItemNotFound
            | Self::CategoryNotFound
            | Self::TagNotFound
            | Self::ContactMessageNotFound
            | Self::SubscriptionNotFound
            | Self::UserNotFound
            | Self::RoleNotFound => StatusCode::NOT_FOUND,

            // 409 Conflict
            Self::AlreadyExists
            | Self::ResourceTypeMismatch
            | Self::CategoryHasItems
            | Self::RoleInUse => StatusCode::CONFLICT,

            // 422 Unprocessable Entity (field-level validation, uniqueness)
            Self::ValidationFailed
            | Self::CategoryNameExists
            | Self::TagNameExists
            | Self::UnsupportedMedia
            | Self::AlreadySubscribed
            | Self::UnknownSetting
            | Self::EmailTaken
            | Self::RoleNameExists
            | Self::UnknownPermission => StatusCode::UNPROCESSABLE_ENTITY,

            // 401 Unauthorized
            Self::NotAuthenticated
            | Self::InvalidCredentials
            | Self::TokenExpired
            | Self::TokenInvalid => StatusCode::UNAUTHORIZED,

            // 403 Forbidden
            Self::PermissionDenied | Self::CannotDeleteSelf => StatusCode::FORBIDDEN,

            // 413 Payload Too Large
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,

            // 500 Internal Server Error
            Self::Unknown
            | Self::InternalError
            | Self::DatabaseError
            | Self::ConfigError
            | Self::StorageError => StatusCode::INTERNAL_SERVER_ERROR,

            // 400 Bad Request
            Self::InvalidRequest | Self::InvalidFormat => StatusCode::BAD_REQUEST,
        }
    }
}
