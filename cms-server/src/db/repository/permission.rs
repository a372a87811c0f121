//! Permission Repository

use super::{ListParams, Paged, RepoError, RepoResult, order_by};
use shared::error::ErrorCode;
use shared::models::Permission;
use sqlx::{SqliteConnection, SqlitePool};

pub async fn list(pool: &SqlitePool, params: &ListParams) -> RepoResult<Paged<Permission>> {
    let pattern = params.name_pattern();
    let sql = format!(
        "SELECT id, name FROM permissions WHERE (?1 IS NULL OR name LIKE ?1 ESCAPE '\\') {} LIMIT ?2 OFFSET ?3",
        order_by(&params.sort, "name ASC")
    );
    let rows: Vec<Permission> = sqlx::query_as(&sql)
        .bind(&pattern)
        .bind(params.page.limit())
        .bind(params.page.offset())
        .fetch_all(pool)
        .await?;

    let (total,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM permissions WHERE (?1 IS NULL OR name LIKE ?1 ESCAPE '\\')")
            .bind(&pattern)
            .fetch_one(pool)
            .await?;

    Ok(Paged {
        rows,
        total: total as u64,
    })
}

/// Insert if missing (seed)
pub async fn ensure(pool: &SqlitePool, name: &str) -> RepoResult<()> {
    sqlx::query("INSERT OR IGNORE INTO permissions (name) VALUES (?)")
        .bind(name)
        .execute(pool)
        .await?;
    Ok(())
}

/// Resolve permission names to ids; any unknown name fails the whole call
pub(crate) async fn ids_by_names(
    conn: &mut SqliteConnection,
    names: &[String],
) -> RepoResult<Vec<i64>> {
    let mut ids = Vec::with_capacity(names.len());
    for name in names {
        let row: Option<(i64,)> = sqlx::query_as("SELECT id FROM permissions WHERE name = ?")
            .bind(name)
            .fetch_optional(&mut *conn)
            .await?;
        match row {
            Some((id,)) => ids.push(id),
            None => {
                return Err(RepoError::Business(
                    ErrorCode::UnknownPermission,
                    format!("The permission '{name}' does not exist."),
                ));
            }
        }
    }
    Ok(ids)
}
