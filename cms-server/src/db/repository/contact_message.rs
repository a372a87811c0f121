//! Contact Message Repository

use super::{ListParams, Paged, RepoError, RepoResult, order_by};
use shared::error::ErrorCode;
use shared::models::ContactMessage;
use shared::util::now_millis;
use sqlx::SqlitePool;

const COLUMNS: &str = "id, name, email, phone, message, created_at";
const FILTER: &str = "(?1 IS NULL OR name LIKE ?1 ESCAPE '\\' OR email LIKE ?1 ESCAPE '\\')";

#[derive(Debug, Clone)]
pub struct NewContactMessage {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub message: String,
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<ContactMessage>> {
    let message = sqlx::query_as(&format!("SELECT {COLUMNS} FROM contact_messages WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(message)
}

pub async fn list(pool: &SqlitePool, params: &ListParams) -> RepoResult<Paged<ContactMessage>> {
    let pattern = params.name_pattern();
    let sql = format!(
        "SELECT {COLUMNS} FROM contact_messages WHERE {FILTER} {} LIMIT ?2 OFFSET ?3",
        order_by(&params.sort, "created_at DESC")
    );
    let rows = sqlx::query_as(&sql)
        .bind(&pattern)
        .bind(params.page.limit())
        .bind(params.page.offset())
        .fetch_all(pool)
        .await?;
    let (total,): (i64,) =
        sqlx::query_as(&format!("SELECT COUNT(*) FROM contact_messages WHERE {FILTER}"))
            .bind(&pattern)
            .fetch_one(pool)
            .await?;
    Ok(Paged {
        rows,
        total: total as u64,
    })
}

pub async fn create(pool: &SqlitePool, data: NewContactMessage) -> RepoResult<ContactMessage> {
    let message = sqlx::query_as(&format!(
        "INSERT INTO contact_messages (name, email, phone, message, created_at)
         VALUES (?, ?, ?, ?, ?) RETURNING {COLUMNS}"
    ))
    .bind(&data.name)
    .bind(&data.email)
    .bind(&data.phone)
    .bind(&data.message)
    .bind(now_millis())
    .fetch_one(pool)
    .await?;
    Ok(message)
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<()> {
    let result = sqlx::query("DELETE FROM contact_messages WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(RepoError::Business(
            ErrorCode::ContactMessageNotFound,
            format!("Contact message {id} not found"),
        ));
    }
    Ok(())
}
