//! Repository Module
//!
//! Free-function CRUD operations over the SQLite tables. Every function takes
//! the pool (or a transaction) explicitly; multi-table writes run inside one
//! transaction.

// Identity
pub mod permission;
pub mod role;
pub mod user;

// Content
pub mod category;
pub mod item;
pub mod tag;

// Site
pub mod contact_message;
pub mod setting;
pub mod subscription;

use crate::policy::guards::GuardError;
use shared::error::{AppError, ErrorCode, FieldError};
use sqlx::SqliteConnection;
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    /// Domain rule violation carrying its own error code
    #[error("{1}")]
    Business(ErrorCode, String),

    /// Deletion invariant tripped
    #[error(transparent)]
    Guard(#[from] GuardError),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => RepoError::NotFound("Row not found".into()),
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                RepoError::Duplicate(db.message().to_string())
            }
            _ => RepoError::Database(err.to_string()),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => AppError::with_message(ErrorCode::NotFound, msg),
            RepoError::Duplicate(msg) => AppError::conflict(msg),
            RepoError::Database(msg) => AppError::database(msg),
            RepoError::Business(code, msg) => match attribute_of(code) {
                Some(field) => AppError::with_message(code, msg.clone())
                    .with_source(FieldError::attribute(field, msg)),
                None => AppError::with_message(code, msg),
            },
            RepoError::Guard(guard) => guard.into(),
        }
    }
}

/// 唯一性类错误对应的属性 (422 需要 source.pointer)
fn attribute_of(code: ErrorCode) -> Option<&'static str> {
    match code {
        ErrorCode::EmailTaken | ErrorCode::AlreadySubscribed => Some("email"),
        ErrorCode::CategoryNameExists | ErrorCode::TagNameExists | ErrorCode::RoleNameExists => {
            Some("name")
        }
        ErrorCode::UnknownPermission => Some("permissions"),
        _ => None,
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

// =============================================================================
// Listing helpers
// =============================================================================

/// `page[number]` / `page[size]`, already clamped by the API layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub number: u32,
    pub size: u32,
}

impl Page {
    pub fn limit(&self) -> i64 {
        self.size as i64
    }

    pub fn offset(&self) -> i64 {
        self.number.saturating_sub(1) as i64 * self.size as i64
    }
}

impl Default for Page {
    fn default() -> Self {
        Self {
            number: 1,
            size: shared::jsonapi::DEFAULT_PAGE_SIZE,
        }
    }
}

/// One sort key; `column` always comes from a per-resource whitelist
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort {
    pub column: &'static str,
    pub descending: bool,
}

/// `ORDER BY` clause, `id` appended as tiebreaker for stable paging
pub(crate) fn order_by(sort: &[Sort], default: &'static str) -> String {
    let mut keys: Vec<String> = sort
        .iter()
        .map(|s| format!("{} {}", s.column, if s.descending { "DESC" } else { "ASC" }))
        .collect();
    if keys.is_empty() {
        keys.push(default.to_string());
    }
    keys.push("id ASC".to_string());
    format!("ORDER BY {}", keys.join(", "))
}

/// `%term%` for LIKE filters, with wildcard characters escaped (`ESCAPE '\'`)
pub(crate) fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

/// One page of rows plus the unpaged total
#[derive(Debug, Clone)]
pub struct Paged<T> {
    pub rows: Vec<T>,
    pub total: u64,
}

impl<T> Paged<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paged<U> {
        Paged {
            rows: self.rows.into_iter().map(f).collect(),
            total: self.total,
        }
    }
}

/// Common collection parameters: paging, sorting and `filter[name]`
#[derive(Debug, Clone, Default)]
pub struct ListParams {
    pub page: Page,
    pub sort: Vec<Sort>,
    pub name: Option<String>,
}

impl ListParams {
    /// `filter[name]` as a LIKE pattern
    pub(crate) fn name_pattern(&self) -> Option<String> {
        self.name.as_deref().map(like_pattern)
    }
}

/// Every id must exist in `table`, otherwise `code` (a *NotFound code)
pub(crate) async fn ensure_exist(
    conn: &mut SqliteConnection,
    table: &'static str,
    ids: &[i64],
    code: ErrorCode,
) -> RepoResult<()> {
    let sql = format!("SELECT EXISTS(SELECT 1 FROM {table} WHERE id = ?)");
    for id in ids {
        let (exists,): (bool,) = sqlx::query_as(&sql).bind(id).fetch_one(&mut *conn).await?;
        if !exists {
            return Err(RepoError::Business(
                code,
                format!("{} (id {id})", code.message()),
            ));
        }
    }
    Ok(())
}

/// Rewrite a unique violation into a field-level business error
pub(crate) fn on_duplicate(code: ErrorCode) -> impl FnOnce(sqlx::Error) -> RepoError {
    move |err| match RepoError::from(err) {
        RepoError::Duplicate(_) => RepoError::Business(code, code.message().to_string()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_offset() {
        let page = Page { number: 3, size: 15 };
        assert_eq!(page.offset(), 30);
        assert_eq!(page.limit(), 15);
        assert_eq!(Page { number: 0, size: 10 }.offset(), 0);
    }

    #[test]
    fn test_order_by() {
        assert_eq!(order_by(&[], "name ASC"), "ORDER BY name ASC, id ASC");
        let sort = [
            Sort { column: "created_at", descending: true },
            Sort { column: "name", descending: false },
        ];
        assert_eq!(
            order_by(&sort, "name ASC"),
            "ORDER BY created_at DESC, name ASC, id ASC"
        );
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    }

    #[test]
    fn test_repo_error_into_app_error() {
        let err: AppError = RepoError::Business(ErrorCode::RoleInUse, "Role has associated users".into()).into();
        assert_eq!(err.code, ErrorCode::RoleInUse);
        assert_eq!(err.http_status(), http::StatusCode::CONFLICT);

        let err: AppError = RepoError::Database("disk I/O error".into()).into();
        assert_eq!(err.code, ErrorCode::DatabaseError);
    }

    #[test]
    fn test_uniqueness_errors_point_at_attribute() {
        let err: AppError =
            RepoError::Business(ErrorCode::EmailTaken, "The email has already been taken.".into()).into();
        assert_eq!(err.http_status(), http::StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.sources[0].pointer, "/data/attributes/email");
    }
}
