//! Category Repository

use super::{ListParams, Paged, RepoError, RepoResult, on_duplicate, order_by};
use crate::policy::guards;
use shared::error::ErrorCode;
use shared::models::Category;
use shared::util::now_millis;
use sqlx::{SqliteConnection, SqlitePool};

const COLUMNS: &str = "id, name, description, created_at, updated_at";
const FILTER: &str = "(?1 IS NULL OR name LIKE ?1 ESCAPE '\\')";

fn not_found(id: i64) -> RepoError {
    RepoError::Business(ErrorCode::CategoryNotFound, format!("Category {id} not found"))
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Category>> {
    let category = sqlx::query_as(&format!("SELECT {COLUMNS} FROM categories WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(category)
}

pub async fn list(pool: &SqlitePool, params: &ListParams) -> RepoResult<Paged<Category>> {
    let pattern = params.name_pattern();
    let sql = format!(
        "SELECT {COLUMNS} FROM categories WHERE {FILTER} {} LIMIT ?2 OFFSET ?3",
        order_by(&params.sort, "name ASC")
    );
    let rows = sqlx::query_as(&sql)
        .bind(&pattern)
        .bind(params.page.limit())
        .bind(params.page.offset())
        .fetch_all(pool)
        .await?;
    let (total,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM categories WHERE {FILTER}"))
        .bind(&pattern)
        .fetch_one(pool)
        .await?;
    Ok(Paged {
        rows,
        total: total as u64,
    })
}

pub async fn create(pool: &SqlitePool, name: &str, description: Option<&str>) -> RepoResult<Category> {
    let now = now_millis();
    let category = sqlx::query_as(&format!(
        "INSERT INTO categories (name, description, created_at, updated_at)
         VALUES (?, ?, ?, ?) RETURNING {COLUMNS}"
    ))
    .bind(name)
    .bind(description)
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await
    .map_err(on_duplicate(ErrorCode::CategoryNameExists))?;
    Ok(category)
}

pub async fn update(
    pool: &SqlitePool,
    id: i64,
    name: Option<&str>,
    description: Option<&str>,
) -> RepoResult<Category> {
    sqlx::query_as(&format!(
        "UPDATE categories SET
            name = COALESCE(?, name),
            description = COALESCE(?, description),
            updated_at = ?
         WHERE id = ? RETURNING {COLUMNS}"
    ))
    .bind(name)
    .bind(description)
    .bind(now_millis())
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(on_duplicate(ErrorCode::CategoryNameExists))?
    .ok_or_else(|| not_found(id))
}

/// Items still filed under the category
pub async fn count_items(conn: &mut SqliteConnection, category_id: i64) -> RepoResult<i64> {
    let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM items WHERE category_id = ?")
        .bind(category_id)
        .fetch_one(&mut *conn)
        .await?;
    Ok(n)
}

/// 删除分类：仍有内容时拒绝 (409)
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<()> {
    let mut tx = pool.begin().await?;

    let items = count_items(&mut tx, id).await?;
    guards::ensure_category_empty(items)?;

    let result = sqlx::query("DELETE FROM categories WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    if result.rows_affected() == 0 {
        return Err(not_found(id));
    }

    tx.commit().await?;
    Ok(())
}
