//! Item Model (posts / menu entries shown on the public site)

use super::validate_date;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

/// Publication status of an item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum ItemStatus {
    Published,
    Draft,
    Archive,
}

impl ItemStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Published => "published",
            Self::Draft => "draft",
            Self::Archive => "archive",
        }
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "published" => Ok(Self::Published),
            "draft" => Ok(Self::Draft),
            "archive" => Ok(Self::Archive),
            _ => Err(()),
        }
    }
}

fn validate_status(value: &str) -> Result<(), validator::ValidationError> {
    value.parse::<ItemStatus>().map(|_| ()).map_err(|_| {
        validator::ValidationError::new("in")
            .with_message("The selected status is invalid.".into())
    })
}

/// Item entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Item {
    pub id: i64,
    pub name: String,
    pub excerpt: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub status: ItemStatus,
    pub is_on_homepage: bool,
    /// `YYYY-MM-DD`
    pub date_at: Option<String>,
    pub category_id: Option<i64>,
    /// Owner
    pub user_id: i64,
    pub created_at: i64,
    pub updated_at: i64,

    // -- Relations (populated by application code, skipped by FromRow) --

    /// Tag IDs (junction table)
    #[cfg_attr(feature = "db", sqlx(skip))]
    #[serde(default)]
    pub tag_ids: Vec<i64>,
}

impl Item {
    pub fn is_published(&self) -> bool {
        self.status == ItemStatus::Published
    }
}

/// Wire attributes of an `items` resource
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemAttributes {
    pub name: String,
    pub excerpt: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub status: String,
    pub is_on_homepage: bool,
    pub date_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Create item payload
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ItemCreate {
    #[validate(
        required(message = "The name field is required."),
        length(min = 1, max = 255, message = "The name must be between 1 and 255 characters.")
    )]
    pub name: Option<String>,
    #[validate(length(max = 500, message = "The excerpt may not be greater than 500 characters."))]
    pub excerpt: Option<String>,
    pub description: Option<String>,
    #[validate(
        required(message = "The status field is required."),
        custom(function = "validate_status")
    )]
    pub status: Option<String>,
    pub is_on_homepage: Option<bool>,
    #[validate(custom(function = "validate_date"))]
    pub date_at: Option<String>,
}

/// Update item payload
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ItemUpdate {
    #[validate(length(min = 1, max = 255, message = "The name must be between 1 and 255 characters."))]
    pub name: Option<String>,
    #[validate(length(max = 500, message = "The excerpt may not be greater than 500 characters."))]
    pub excerpt: Option<String>,
    pub description: Option<String>,
    #[validate(custom(function = "validate_status"))]
    pub status: Option<String>,
    pub is_on_homepage: Option<bool>,
    #[validate(custom(function = "validate_date"))]
    pub date_at: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip_through_str() {
        for status in [ItemStatus::Published, ItemStatus::Draft, ItemStatus::Archive] {
            assert_eq!(status.as_str().parse::<ItemStatus>(), Ok(status));
        }
        assert!("deleted".parse::<ItemStatus>().is_err());
    }

    #[test]
    fn test_create_requires_name_and_status() {
        let errors = ItemCreate::default().validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("status"));
    }

    #[test]
    fn test_create_rejects_unknown_status() {
        let payload = ItemCreate {
            name: Some("Latte".into()),
            status: Some("hidden".into()),
            ..Default::default()
        };
        let errors = payload.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("status"));
    }

    #[test]
    fn test_update_accepts_partial_payload() {
        let payload = ItemUpdate {
            status: Some("archive".into()),
            ..Default::default()
        };
        assert!(payload.validate().is_ok());
    }
}
