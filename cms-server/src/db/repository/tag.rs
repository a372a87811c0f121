//! Tag Repository

use super::{ListParams, Paged, RepoError, RepoResult, on_duplicate, order_by};
use shared::error::ErrorCode;
use shared::models::{DEFAULT_TAG_COLOR, Tag};
use shared::util::now_millis;
use sqlx::SqlitePool;

const COLUMNS: &str = "id, name, color, created_at, updated_at";
const FILTER: &str = "(?1 IS NULL OR name LIKE ?1 ESCAPE '\\')";

fn not_found(id: i64) -> RepoError {
    RepoError::Business(ErrorCode::TagNotFound, format!("Tag {id} not found"))
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Tag>> {
    let tag = sqlx::query_as(&format!("SELECT {COLUMNS} FROM tags WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(tag)
}

pub async fn list(pool: &SqlitePool, params: &ListParams) -> RepoResult<Paged<Tag>> {
    let pattern = params.name_pattern();
    let sql = format!(
        "SELECT {COLUMNS} FROM tags WHERE {FILTER} {} LIMIT ?2 OFFSET ?3",
        order_by(&params.sort, "name ASC")
    );
    let rows = sqlx::query_as(&sql)
        .bind(&pattern)
        .bind(params.page.limit())
        .bind(params.page.offset())
        .fetch_all(pool)
        .await?;
    let (total,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM tags WHERE {FILTER}"))
        .bind(&pattern)
        .fetch_one(pool)
        .await?;
    Ok(Paged {
        rows,
        total: total as u64,
    })
}

/// 未指定颜色时使用 [`DEFAULT_TAG_COLOR`]
pub async fn create(pool: &SqlitePool, name: &str, color: Option<&str>) -> RepoResult<Tag> {
    let now = now_millis();
    let tag = sqlx::query_as(&format!(
        "INSERT INTO tags (name, color, created_at, updated_at)
         VALUES (?, ?, ?, ?) RETURNING {COLUMNS}"
    ))
    .bind(name)
    .bind(color.unwrap_or(DEFAULT_TAG_COLOR))
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await
    .map_err(on_duplicate(ErrorCode::TagNameExists))?;
    Ok(tag)
}

pub async fn update(pool: &SqlitePool, id: i64, name: Option<&str>, color: Option<&str>) -> RepoResult<Tag> {
    sqlx::query_as(&format!(
        "UPDATE tags SET
            name = COALESCE(?, name),
            color = COALESCE(?, color),
            updated_at = ?
         WHERE id = ? RETURNING {COLUMNS}"
    ))
    .bind(name)
    .bind(color)
    .bind(now_millis())
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(on_duplicate(ErrorCode::TagNameExists))?
    .ok_or_else(|| not_found(id))
}

/// 删除标签 (item_tags 级联删除)
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<()> {
    let result = sqlx::query("DELETE FROM tags WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(not_found(id));
    }
    Ok(())
}
