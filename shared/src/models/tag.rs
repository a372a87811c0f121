//! Tag Model

use super::validate_color;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Colour given to tags created without one
pub const DEFAULT_TAG_COLOR: &str = "#6b7280";

/// Tag entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Tag {
    pub id: i64,
    pub name: String,
    pub color: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Wire attributes of a `tags` resource
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagAttributes {
    pub name: String,
    pub color: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Create tag payload
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TagCreate {
    #[validate(
        required(message = "The name field is required."),
        length(min = 1, max = 255, message = "The name must be between 1 and 255 characters.")
    )]
    pub name: Option<String>,
    #[validate(custom(function = "validate_color"))]
    pub color: Option<String>,
}

/// Update tag payload
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TagUpdate {
    #[validate(length(min = 1, max = 255, message = "The name must be between 1 and 255 characters."))]
    pub name: Option<String>,
    #[validate(custom(function = "validate_color"))]
    pub color: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_color_is_validated() {
        let payload = TagCreate {
            name: Some("Vegan".into()),
            color: Some("green".into()),
        };
        let errors = payload.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("color"));
    }
}
