//! Item Repository
//!
//! 列表查询接受显式的 [`ItemVisibility`]：`PublishedOnly` 时无论客户端
//! 传入什么 status 过滤，都只返回已发布内容。

use super::{Page, Paged, RepoError, RepoResult, Sort, ensure_exist, like_pattern, order_by};
use crate::policy::ItemVisibility;
use shared::error::ErrorCode;
use shared::models::{Item, ItemStatus};
use shared::util::now_millis;
use sqlx::{SqliteConnection, SqlitePool};

const COLUMNS: &str = "id, name, excerpt, description, image, status, is_on_homepage, date_at, \
                       category_id, user_id, created_at, updated_at";

const FILTER: &str = "(?1 IS NULL OR name LIKE ?1 ESCAPE '\\')
    AND (?2 IS NULL OR status = ?2)
    AND (?3 IS NULL OR category_id = ?3)
    AND (?4 IS NULL OR id IN (SELECT item_id FROM item_tags WHERE tag_id = ?4))
    AND (?5 = 0 OR status = 'published')";

fn not_found(id: i64) -> RepoError {
    RepoError::Business(ErrorCode::ItemNotFound, format!("Item {id} not found"))
}

/// `filter[...]` for items
#[derive(Debug, Clone, Default)]
pub struct ItemFilter {
    pub name: Option<String>,
    pub status: Option<ItemStatus>,
    pub category_id: Option<i64>,
    pub tag_id: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct NewItem {
    pub name: String,
    pub excerpt: Option<String>,
    pub description: Option<String>,
    pub status: ItemStatus,
    pub is_on_homepage: bool,
    pub date_at: Option<String>,
    pub category_id: Option<i64>,
    pub tag_ids: Vec<i64>,
}

/// `None` = 不修改；`category_id: Some(None)` 清空分类
#[derive(Debug, Clone, Default)]
pub struct ItemChanges {
    pub name: Option<String>,
    pub excerpt: Option<String>,
    pub description: Option<String>,
    pub status: Option<ItemStatus>,
    pub is_on_homepage: Option<bool>,
    pub date_at: Option<String>,
    pub category_id: Option<Option<i64>>,
    pub tag_ids: Option<Vec<i64>>,
}

async fn tag_ids(conn: &mut SqliteConnection, item_id: i64) -> RepoResult<Vec<i64>> {
    let rows: Vec<(i64,)> =
        sqlx::query_as("SELECT tag_id FROM item_tags WHERE item_id = ? ORDER BY tag_id")
            .bind(item_id)
            .fetch_all(&mut *conn)
            .await?;
    Ok(rows.into_iter().map(|(id,)| id).collect())
}

async fn find_with(conn: &mut SqliteConnection, id: i64) -> RepoResult<Option<Item>> {
    let item: Option<Item> = sqlx::query_as(&format!("SELECT {COLUMNS} FROM items WHERE id = ?"))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    match item {
        Some(mut item) => {
            item.tag_ids = tag_ids(conn, item.id).await?;
            Ok(Some(item))
        }
        None => Ok(None),
    }
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Item>> {
    let mut conn = pool.acquire().await?;
    find_with(&mut conn, id).await
}

pub async fn list(
    pool: &SqlitePool,
    page: Page,
    sort: &[Sort],
    filter: &ItemFilter,
    visibility: ItemVisibility,
) -> RepoResult<Paged<Item>> {
    let pattern = filter.name.as_deref().map(like_pattern);
    let status = filter.status.map(|s| s.as_str());
    let published_only = visibility == ItemVisibility::PublishedOnly;

    let sql = format!(
        "SELECT {COLUMNS} FROM items WHERE {FILTER} {} LIMIT ?6 OFFSET ?7",
        order_by(sort, "created_at DESC")
    );

    let mut conn = pool.acquire().await?;
    let mut rows: Vec<Item> = sqlx::query_as(&sql)
        .bind(&pattern)
        .bind(status)
        .bind(filter.category_id)
        .bind(filter.tag_id)
        .bind(published_only)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&mut *conn)
        .await?;
    for item in &mut rows {
        item.tag_ids = tag_ids(&mut conn, item.id).await?;
    }

    let (total,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM items WHERE {FILTER}"))
        .bind(&pattern)
        .bind(status)
        .bind(filter.category_id)
        .bind(filter.tag_id)
        .bind(published_only)
        .fetch_one(&mut *conn)
        .await?;

    Ok(Paged {
        rows,
        total: total as u64,
    })
}

async fn replace_tags(conn: &mut SqliteConnection, item_id: i64, tag_ids: &[i64]) -> RepoResult<()> {
    ensure_exist(conn, "tags", tag_ids, ErrorCode::TagNotFound).await?;
    sqlx::query("DELETE FROM item_tags WHERE item_id = ?")
        .bind(item_id)
        .execute(&mut *conn)
        .await?;
    for tag_id in tag_ids {
        sqlx::query("INSERT OR IGNORE INTO item_tags (item_id, tag_id) VALUES (?, ?)")
            .bind(item_id)
            .bind(tag_id)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

/// 创建内容，`owner_id` 为作者
pub async fn create(pool: &SqlitePool, owner_id: i64, data: NewItem) -> RepoResult<Item> {
    let now = now_millis();
    let mut tx = pool.begin().await?;

    if let Some(category_id) = data.category_id {
        ensure_exist(&mut tx, "categories", &[category_id], ErrorCode::CategoryNotFound).await?;
    }

    let (id,): (i64,) = sqlx::query_as(
        "INSERT INTO items (name, excerpt, description, status, is_on_homepage, date_at,
                            category_id, user_id, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(&data.name)
    .bind(&data.excerpt)
    .bind(&data.description)
    .bind(data.status)
    .bind(data.is_on_homepage)
    .bind(&data.date_at)
    .bind(data.category_id)
    .bind(owner_id)
    .bind(now)
    .bind(now)
    .fetch_one(&mut *tx)
    .await?;

    replace_tags(&mut tx, id, &data.tag_ids).await?;
    let item = find_with(&mut tx, id).await?.ok_or_else(|| not_found(id))?;
    tx.commit().await?;

    tracing::info!(item_id = id, user_id = owner_id, "Item created");
    Ok(item)
}

pub async fn update(pool: &SqlitePool, id: i64, changes: ItemChanges) -> RepoResult<Item> {
    let mut tx = pool.begin().await?;

    if let Some(Some(category_id)) = changes.category_id {
        ensure_exist(&mut tx, "categories", &[category_id], ErrorCode::CategoryNotFound).await?;
    }

    let result = sqlx::query(
        "UPDATE items SET
            name = COALESCE(?1, name),
            excerpt = COALESCE(?2, excerpt),
            description = COALESCE(?3, description),
            status = COALESCE(?4, status),
            is_on_homepage = COALESCE(?5, is_on_homepage),
            date_at = COALESCE(?6, date_at),
            category_id = CASE WHEN ?7 THEN ?8 ELSE category_id END,
            updated_at = ?9
         WHERE id = ?10",
    )
    .bind(&changes.name)
    .bind(&changes.excerpt)
    .bind(&changes.description)
    .bind(changes.status)
    .bind(changes.is_on_homepage)
    .bind(&changes.date_at)
    .bind(changes.category_id.is_some())
    .bind(changes.category_id.flatten())
    .bind(now_millis())
    .bind(id)
    .execute(&mut *tx)
    .await?;
    if result.rows_affected() == 0 {
        return Err(not_found(id));
    }

    if let Some(tag_ids) = &changes.tag_ids {
        replace_tags(&mut tx, id, tag_ids).await?;
    }

    let item = find_with(&mut tx, id).await?.ok_or_else(|| not_found(id))?;
    tx.commit().await?;
    Ok(item)
}

pub async fn set_image(pool: &SqlitePool, id: i64, url: &str) -> RepoResult<()> {
    let result = sqlx::query("UPDATE items SET image = ?, updated_at = ? WHERE id = ?")
        .bind(url)
        .bind(now_millis())
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(not_found(id));
    }
    Ok(())
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<()> {
    let result = sqlx::query("DELETE FROM items WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(not_found(id));
    }
    tracing::info!(item_id = id, "Item deleted");
    Ok(())
}
