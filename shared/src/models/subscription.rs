//! Newsletter Subscription Model

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Subscription entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Subscription {
    pub id: i64,
    pub email: String,
    pub created_at: i64,
}

/// Wire attributes of a `subscriptions` resource
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionAttributes {
    pub email: String,
    pub created_at: String,
}

/// Subscribe payload
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct SubscriptionCreate {
    #[validate(
        required(message = "The email field is required."),
        email(message = "The email must be a valid email address.")
    )]
    pub email: Option<String>,
}
