//! Contact Message Model (public contact form)

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Contact message entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ContactMessage {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub message: String,
    pub created_at: i64,
}

/// Wire attributes of a `contact-messages` resource
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactMessageAttributes {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub message: String,
    pub created_at: String,
}

/// Contact form payload
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ContactMessageCreate {
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
    #[validate(length(max = 50, message = "The phone may not be greater than 50 characters."))]
    pub phone: Option<String>,
    #[validate(
        required(message = "The message field is required."),
        length(min = 1, max = 5000, message = "The message must be between 1 and 5000 characters.")
    )]
    pub message: Option<String>,
}
