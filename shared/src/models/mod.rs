//! Data models
//!
//! Shared between cms-server and the admin frontend (via API).
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` (SQLite INTEGER PRIMARY KEY), timestamps are Unix millis.
//!
//! Each resource has three shapes:
//! - the row (`Item`), loaded by the repositories
//! - the wire attributes (`ItemAttributes`), camelCase, no ids or foreign keys
//! - the request payloads (`ItemCreate` / `ItemUpdate`), validated with `validator`

pub mod category;
pub mod contact_message;
pub mod item;
pub mod permission;
pub mod role;
pub mod setting;
pub mod subscription;
pub mod tag;
pub mod user;

// Re-exports
pub use category::*;
pub use contact_message::*;
pub use item::*;
pub use permission::*;
pub use role::*;
pub use setting::*;
pub use subscription::*;
pub use tag::*;
pub use user::*;

use std::borrow::Cow;
use validator::ValidationError;

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}

/// `#RGB` or `#RRGGBB`
pub fn validate_color(value: &str) -> Result<(), ValidationError> {
    let hex = value.strip_prefix('#').unwrap_or("");
    if matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit()) {
        Ok(())
    } else {
        Err(invalid("color", "The color must be a valid hex color."))
    }
}

/// Calendar date `YYYY-MM-DD`
pub fn validate_date(value: &str) -> Result<(), ValidationError> {
    chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|_| ())
        .map_err(|_| invalid("date", "The date at is not a valid date."))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_color() {
        assert!(validate_color("#fff").is_ok());
        assert!(validate_color("#1A2b3C").is_ok());
        assert!(validate_color("fff").is_err());
        assert!(validate_color("#ggg").is_err());
        assert!(validate_color("#12345").is_err());
    }

    #[test]
    fn test_validate_date() {
        assert!(validate_date("2024-02-29").is_ok());
        assert!(validate_date("2023-02-29").is_err());
        assert!(validate_date("29/02/2024").is_err());
    }
}
