//! Setting Repository (key/value)

use super::RepoResult;
use shared::models::{SETTING_KEYS, Setting, SiteSettings};
use shared::util::now_millis;
use sqlx::SqlitePool;

pub async fn all(pool: &SqlitePool) -> RepoResult<Vec<Setting>> {
    let rows = sqlx::query_as("SELECT key, value, updated_at FROM settings ORDER BY key")
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// 当前站点设置
pub async fn load(pool: &SqlitePool) -> RepoResult<SiteSettings> {
    Ok(SiteSettings::from_rows(&all(pool).await?))
}

/// 写入 payload 中出现的键，其余保持不变；空字符串存为 NULL
pub async fn upsert(pool: &SqlitePool, changes: &SiteSettings) -> RepoResult<SiteSettings> {
    let now = now_millis();
    let mut tx = pool.begin().await?;
    for (key, value) in changes.provided() {
        debug_assert!(SETTING_KEYS.contains(&key));
        let value = (!value.is_empty()).then_some(value);
        sqlx::query(
            "INSERT INTO settings (key, value, updated_at) VALUES (?, ?, ?)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        )
        .bind(key)
        .bind(value)
        .bind(now)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;
    load(pool).await
}

/// Insert a default if the key has never been set (seed)
pub async fn ensure_default(pool: &SqlitePool, key: &str, value: &str) -> RepoResult<()> {
    sqlx::query("INSERT OR IGNORE INTO settings (key, value, updated_at) VALUES (?, ?, ?)")
        .bind(key)
        .bind(value)
        .bind(now_millis())
        .execute(pool)
        .await?;
    Ok(())
}
