//! User Model

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// User entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    /// argon2 PHC string
    #[serde(skip_serializing, default)]
    pub password: String,
    pub profile_image: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,

    // -- Relations (populated by application code, skipped by FromRow) --

    /// Role IDs (junction table)
    #[cfg_attr(feature = "db", sqlx(skip))]
    #[serde(default)]
    pub role_ids: Vec<i64>,
}

/// Wire attributes of a `users` resource (never carries the password)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAttributes {
    pub name: String,
    pub email: String,
    pub profile_image: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Create user payload
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_create_confirmation"))]
pub struct UserCreate {
    #[validate(
        required(message = "The name field is required."),
        length(min = 1, max = 255, message = "The name must be between 1 and 255 characters.")
    )]
    pub name: Option<String>,
    #[validate(
        required(message = "The email field is required."),
        email(message = "The email must be a valid email address.")
    )]
    pub email: Option<String>,
    #[validate(
        required(message = "The password field is required."),
        length(min = 8, message = "The password must be at least 8 characters."),
    )]
    pub password: Option<String>,
    pub password_confirmation: Option<String>,
}

/// Update user payload
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_update_confirmation"))]
pub struct UserUpdate {
    #[validate(length(min = 1, max = 255, message = "The name must be between 1 and 255 characters."))]
    pub name: Option<String>,
    #[validate(email(message = "The email must be a valid email address."))]
    pub email: Option<String>,
    #[validate(length(min = 8, message = "The password must be at least 8 characters."))]
    pub password: Option<String>,
    pub password_confirmation: Option<String>,
}

/// `password` 与 `passwordConfirmation` 必须一致；错误挂在 `password` 上
fn confirm_password(
    password: Option<&String>,
    confirmation: Option<&String>,
) -> Result<(), ValidationError> {
    match password {
        Some(p) if confirmation != Some(p) => {
            let mut err = ValidationError::new("must_match")
                .with_message("The password confirmation does not match.".into());
            err.add_param("field".into(), &"password");
            Err(err)
        }
        _ => Ok(()),
    }
}

fn validate_create_confirmation(payload: &UserCreate) -> Result<(), ValidationError> {
    confirm_password(payload.password.as_ref(), payload.password_confirmation.as_ref())
}

/// 未修改密码时不要求确认字段
fn validate_update_confirmation(payload: &UserUpdate) -> Result<(), ValidationError> {
    confirm_password(payload.password.as_ref(), payload.password_confirmation.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_is_never_serialized() {
        let user = User {
            id: 1,
            name: "Admin".into(),
            email: "admin@example.com".into(),
            password: "$argon2id$v=19$...".into(),
            profile_image: None,
            created_at: 0,
            updated_at: 0,
            role_ids: vec![1],
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password").is_none());
    }

    #[test]
    fn test_create_checks_confirmation() {
        let payload = UserCreate {
            name: Some("Jane".into()),
            email: Some("jane@example.com".into()),
            password: Some("secret-password".into()),
            password_confirmation: Some("other-password".into()),
        };
        let errors = payload.validate().unwrap_err();
        let err: crate::error::AppError = errors.into();
        assert_eq!(err.sources.len(), 1);
        assert_eq!(err.sources[0].pointer, "/data/attributes/password");
        assert_eq!(err.sources[0].detail, "The password confirmation does not match.");
    }

    #[test]
    fn test_update_without_password_skips_confirmation() {
        let payload = UserUpdate {
            name: Some("Jane".into()),
            ..Default::default()
        };
        assert!(payload.validate().is_ok());

        let payload = UserUpdate {
            password: Some("secret-password".into()),
            password_confirmation: None,
            ..Default::default()
        };
        assert!(payload.validate().is_err());

        let payload = UserUpdate {
            password: Some("secret-password".into()),
            password_confirmation: Some("secret-password".into()),
            ..Default::default()
        };
        assert!(payload.validate().is_ok());
    }
}
