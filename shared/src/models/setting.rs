//! Site Settings Model
//!
//! Settings are stored as key/value rows and exposed as one singleton
//! `settings` resource whose attributes are the known keys.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use validator::{Validate, ValidateEmail, ValidationError};

/// Key/value row
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Setting {
    pub key: String,
    pub value: Option<String>,
    pub updated_at: i64,
}

/// Every key the settings resource knows about
pub const SETTING_KEYS: &[&str] = &[
    "site_name",
    "site_description",
    "contact_email",
    "contact_phone",
    "address",
    "opening_hours",
    "facebook_url",
    "instagram_url",
];

fn validate_http_url(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() || value.starts_with("https://") || value.starts_with("http://") {
        Ok(())
    } else {
        Err(ValidationError::new("url").with_message(Cow::Borrowed("The link must be a valid URL.")))
    }
}

/// 空字符串表示清空，不做格式校验
fn validate_contact_email(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() || value.validate_email() {
        Ok(())
    } else {
        Err(ValidationError::new("email")
            .with_message(Cow::Borrowed("The contact email must be a valid email address.")))
    }
}

/// The settings resource; also the PATCH payload (absent keys stay unchanged)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SiteSettings {
    #[validate(length(max = 255, message = "The site name may not be greater than 255 characters."))]
    pub site_name: Option<String>,
    pub site_description: Option<String>,
    #[validate(custom(function = "validate_contact_email"))]
    pub contact_email: Option<String>,
    #[validate(length(max = 50, message = "The contact phone may not be greater than 50 characters."))]
    pub contact_phone: Option<String>,
    pub address: Option<String>,
    pub opening_hours: Option<String>,
    #[validate(custom(function = "validate_http_url"))]
    pub facebook_url: Option<String>,
    #[validate(custom(function = "validate_http_url"))]
    pub instagram_url: Option<String>,
}

impl SiteSettings {
    fn slot(&mut self, key: &str) -> Option<&mut Option<String>> {
        Some(match key {
            "site_name" => &mut self.site_name,
            "site_description" => &mut self.site_description,
            "contact_email" => &mut self.contact_email,
            "contact_phone" => &mut self.contact_phone,
            "address" => &mut self.address,
            "opening_hours" => &mut self.opening_hours,
            "facebook_url" => &mut self.facebook_url,
            "instagram_url" => &mut self.instagram_url,
            _ => return None,
        })
    }

    /// Build from stored rows; unknown keys are ignored
    pub fn from_rows(rows: &[Setting]) -> Self {
        let mut settings = Self::default();
        for row in rows {
            if let Some(slot) = settings.slot(&row.key) {
                *slot = row.value.clone();
            }
        }
        settings
    }

    /// The `(key, value)` pairs present in this payload
    pub fn provided(&self) -> Vec<(&'static str, String)> {
        let mut copy = self.clone();
        SETTING_KEYS
            .iter()
            .filter_map(|key| {
                copy.slot(key)
                    .and_then(|slot| slot.take())
                    .map(|value| (*key, value))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(key: &str, value: &str) -> Setting {
        Setting {
            key: key.into(),
            value: Some(value.into()),
            updated_at: 1,
        }
    }

    #[test]
    fn test_from_rows_ignores_unknown_keys() {
        let rows = vec![row("site_name", "Bakery"), row("legacy_key", "x")];
        let settings = SiteSettings::from_rows(&rows);
        assert_eq!(settings.site_name.as_deref(), Some("Bakery"));
        assert!(settings.address.is_none());
    }

    #[test]
    fn test_provided_lists_only_present_keys() {
        let payload = SiteSettings {
            address: Some("Main St 1".into()),
            instagram_url: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(
            payload.provided(),
            vec![("address", "Main St 1".to_string()), ("instagram_url", String::new())]
        );
    }

    #[test]
    fn test_empty_contact_email_clears() {
        let clear = SiteSettings {
            contact_email: Some(String::new()),
            ..Default::default()
        };
        assert!(clear.validate().is_ok());

        let bad = SiteSettings {
            contact_email: Some("not-an-email".into()),
            ..Default::default()
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_urls_must_be_http() {
        let payload = SiteSettings {
            facebook_url: Some("javascript:alert(1)".into()),
            ..Default::default()
        };
        assert!(payload.validate().is_err());
    }
}
