//! Subscription Repository

use super::{ListParams, Paged, RepoError, RepoResult, on_duplicate, order_by};
use shared::error::ErrorCode;
use shared::models::Subscription;
use shared::util::now_millis;
use sqlx::SqlitePool;

const COLUMNS: &str = "id, email, created_at";
const FILTER: &str = "(?1 IS NULL OR email LIKE ?1 ESCAPE '\\')";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Subscription>> {
    let subscription = sqlx::query_as(&format!("SELECT {COLUMNS} FROM subscriptions WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(subscription)
}

/// `filter[name]` 匹配邮箱
pub async fn list(pool: &SqlitePool, params: &ListParams) -> RepoResult<Paged<Subscription>> {
    let pattern = params.name_pattern();
    let sql = format!(
        "SELECT {COLUMNS} FROM subscriptions WHERE {FILTER} {} LIMIT ?2 OFFSET ?3",
        order_by(&params.sort, "created_at DESC")
    );
    let rows = sqlx::query_as(&sql)
        .bind(&pattern)
        .bind(params.page.limit())
        .bind(params.page.offset())
        .fetch_all(pool)
        .await?;
    let (total,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM subscriptions WHERE {FILTER}"))
        .bind(&pattern)
        .fetch_one(pool)
        .await?;
    Ok(Paged {
        rows,
        total: total as u64,
    })
}

/// 同一邮箱 (大小写不敏感) 只能订阅一次，重复返回 422
pub async fn create(pool: &SqlitePool, email: &str) -> RepoResult<Subscription> {
    let subscription = sqlx::query_as(&format!(
        "INSERT INTO subscriptions (email, created_at) VALUES (?, ?) RETURNING {COLUMNS}"
    ))
    .bind(email)
    .bind(now_millis())
    .fetch_one(pool)
    .await
    .map_err(on_duplicate(ErrorCode::AlreadySubscribed))?;
    Ok(subscription)
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<()> {
    let result = sqlx::query("DELETE FROM subscriptions WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(RepoError::Business(
            ErrorCode::SubscriptionNotFound,
            format!("Subscription {id} not found"),
        ));
    }
    Ok(())
}
