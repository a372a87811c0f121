//! Role Repository
//!
//! 角色与权限通过 `role_permissions` 关联，写入在同一事务内完成。
//! 删除前检查是否仍有用户持有该角色。

use super::{ListParams, Paged, RepoError, RepoResult, on_duplicate, order_by, permission};
use crate::policy::guards;
use shared::error::ErrorCode;
use shared::models::Role;
use shared::util::now_millis;
use sqlx::{SqliteConnection, SqlitePool};

const COLUMNS: &str = "id, name, created_at, updated_at";

fn not_found(id: i64) -> RepoError {
    RepoError::Business(ErrorCode::RoleNotFound, format!("Role {id} not found"))
}

/// Permission names granted by one role
pub async fn permission_names(
    conn: &mut SqliteConnection,
    role_id: i64,
) -> RepoResult<Vec<String>> {
    let rows: Vec<(String,)> = sqlx::query_as(
        "SELECT p.name FROM permissions p
         JOIN role_permissions rp ON rp.permission_id = p.id
         WHERE rp.role_id = ? ORDER BY p.name",
    )
    .bind(role_id)
    .fetch_all(&mut *conn)
    .await?;
    Ok(rows.into_iter().map(|(name,)| name).collect())
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Role>> {
    let mut conn = pool.acquire().await?;
    find_with(&mut conn, id).await
}

async fn find_with(conn: &mut SqliteConnection, id: i64) -> RepoResult<Option<Role>> {
    let role: Option<Role> = sqlx::query_as(&format!("SELECT {COLUMNS} FROM roles WHERE id = ?"))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    match role {
        Some(mut role) => {
            role.permissions = permission_names(conn, role.id).await?;
            Ok(Some(role))
        }
        None => Ok(None),
    }
}

pub async fn find_by_name(pool: &SqlitePool, name: &str) -> RepoResult<Option<Role>> {
    let id: Option<(i64,)> = sqlx::query_as("SELECT id FROM roles WHERE name = ?")
        .bind(name)
        .fetch_optional(pool)
        .await?;
    match id {
        Some((id,)) => find_by_id(pool, id).await,
        None => Ok(None),
    }
}

pub async fn list(pool: &SqlitePool, params: &ListParams) -> RepoResult<Paged<Role>> {
    let pattern = params.name_pattern();
    let sql = format!(
        "SELECT {COLUMNS} FROM roles WHERE (?1 IS NULL OR name LIKE ?1 ESCAPE '\\') {} LIMIT ?2 OFFSET ?3",
        order_by(&params.sort, "name ASC")
    );

    let mut conn = pool.acquire().await?;
    let mut rows: Vec<Role> = sqlx::query_as(&sql)
        .bind(&pattern)
        .bind(params.page.limit())
        .bind(params.page.offset())
        .fetch_all(&mut *conn)
        .await?;
    for role in &mut rows {
        role.permissions = permission_names(&mut conn, role.id).await?;
    }

    let (total,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM roles WHERE (?1 IS NULL OR name LIKE ?1 ESCAPE '\\')")
            .bind(&pattern)
            .fetch_one(&mut *conn)
            .await?;

    Ok(Paged {
        rows,
        total: total as u64,
    })
}

async fn replace_permissions(
    conn: &mut SqliteConnection,
    role_id: i64,
    names: &[String],
) -> RepoResult<()> {
    let ids = permission::ids_by_names(conn, names).await?;
    sqlx::query("DELETE FROM role_permissions WHERE role_id = ?")
        .bind(role_id)
        .execute(&mut *conn)
        .await?;
    for permission_id in ids {
        sqlx::query("INSERT OR IGNORE INTO role_permissions (role_id, permission_id) VALUES (?, ?)")
            .bind(role_id)
            .bind(permission_id)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

pub async fn create(pool: &SqlitePool, name: &str, permissions: &[String]) -> RepoResult<Role> {
    let now = now_millis();
    let mut tx = pool.begin().await?;

    let (id,): (i64,) = sqlx::query_as(
        "INSERT INTO roles (name, created_at, updated_at) VALUES (?, ?, ?) RETURNING id",
    )
    .bind(name)
    .bind(now)
    .bind(now)
    .fetch_one(&mut *tx)
    .await
    .map_err(on_duplicate(ErrorCode::RoleNameExists))?;

    replace_permissions(&mut tx, id, permissions).await?;
    let role = find_with(&mut tx, id).await?.ok_or_else(|| not_found(id))?;
    tx.commit().await?;
    Ok(role)
}

/// `None` fields stay unchanged; `permissions` replaces the whole set
pub async fn update(
    pool: &SqlitePool,
    id: i64,
    name: Option<&str>,
    permissions: Option<&[String]>,
) -> RepoResult<Role> {
    let mut tx = pool.begin().await?;

    let result = sqlx::query("UPDATE roles SET name = COALESCE(?, name), updated_at = ? WHERE id = ?")
        .bind(name)
        .bind(now_millis())
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(on_duplicate(ErrorCode::RoleNameExists))?;
    if result.rows_affected() == 0 {
        return Err(not_found(id));
    }

    if let Some(names) = permissions {
        replace_permissions(&mut tx, id, names).await?;
    }

    let role = find_with(&mut tx, id).await?.ok_or_else(|| not_found(id))?;
    tx.commit().await?;
    Ok(role)
}

/// Number of users holding the role
pub async fn count_users(conn: &mut SqliteConnection, role_id: i64) -> RepoResult<i64> {
    let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM user_roles WHERE role_id = ?")
        .bind(role_id)
        .fetch_one(&mut *conn)
        .await?;
    Ok(n)
}

/// 删除角色：仍有用户持有时拒绝 (409)
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<()> {
    let mut tx = pool.begin().await?;

    let users = count_users(&mut tx, id).await?;
    guards::ensure_role_unassigned(users)?;

    let result = sqlx::query("DELETE FROM roles WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    if result.rows_affected() == 0 {
        return Err(not_found(id));
    }

    tx.commit().await?;
    tracing::info!(role_id = id, "Role deleted");
    Ok(())
}
