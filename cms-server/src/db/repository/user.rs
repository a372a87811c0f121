//! User Repository
//!
//! 用户与角色通过 `user_roles` 关联。删除必须经过 [`delete`]，
//! 它需要执行者作为参数，并在接触数据库之前运行自删除检查。

use super::{ListParams, Paged, RepoError, RepoResult, ensure_exist, on_duplicate, order_by};
use crate::auth::Actor;
use crate::policy::guards;
use shared::error::ErrorCode;
use shared::models::User;
use shared::util::now_millis;
use sqlx::{SqliteConnection, SqlitePool};

const COLUMNS: &str = "id, name, email, password, profile_image, created_at, updated_at";

fn not_found(id: i64) -> RepoError {
    RepoError::Business(ErrorCode::UserNotFound, format!("User {id} not found"))
}

/// 新用户 (密码已哈希)
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role_ids: Vec<i64>,
}

/// 用户变更；`None` 表示不修改
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub role_ids: Option<Vec<i64>>,
}

async fn role_ids(conn: &mut SqliteConnection, user_id: i64) -> RepoResult<Vec<i64>> {
    let rows: Vec<(i64,)> =
        sqlx::query_as("SELECT role_id FROM user_roles WHERE user_id = ? ORDER BY role_id")
            .bind(user_id)
            .fetch_all(&mut *conn)
            .await?;
    Ok(rows.into_iter().map(|(id,)| id).collect())
}

async fn find_with(conn: &mut SqliteConnection, id: i64) -> RepoResult<Option<User>> {
    let user: Option<User> = sqlx::query_as(&format!("SELECT {COLUMNS} FROM users WHERE id = ?"))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    match user {
        Some(mut user) => {
            user.role_ids = role_ids(conn, user.id).await?;
            Ok(Some(user))
        }
        None => Ok(None),
    }
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<User>> {
    let mut conn = pool.acquire().await?;
    find_with(&mut conn, id).await
}

/// 登录用 (大小写不敏感)
pub async fn find_by_email(pool: &SqlitePool, email: &str) -> RepoResult<Option<User>> {
    let mut conn = pool.acquire().await?;
    let user: Option<User> =
        sqlx::query_as(&format!("SELECT {COLUMNS} FROM users WHERE email = ? COLLATE NOCASE"))
            .bind(email)
            .fetch_optional(&mut *conn)
            .await?;
    match user {
        Some(mut user) => {
            user.role_ids = role_ids(&mut conn, user.id).await?;
            Ok(Some(user))
        }
        None => Ok(None),
    }
}

pub async fn count(pool: &SqlitePool) -> RepoResult<i64> {
    let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?;
    Ok(n)
}

/// 用户所属角色名
pub async fn role_names(pool: &SqlitePool, user_id: i64) -> RepoResult<Vec<String>> {
    let rows: Vec<(String,)> = sqlx::query_as(
        "SELECT r.name FROM roles r
         JOIN user_roles ur ON ur.role_id = r.id
         WHERE ur.user_id = ? ORDER BY r.name",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(|(name,)| name).collect())
}

/// 所有角色权限的并集
pub async fn permission_names(pool: &SqlitePool, user_id: i64) -> RepoResult<Vec<String>> {
    let rows: Vec<(String,)> = sqlx::query_as(
        "SELECT DISTINCT p.name FROM permissions p
         JOIN role_permissions rp ON rp.permission_id = p.id
         JOIN user_roles ur ON ur.role_id = rp.role_id
         WHERE ur.user_id = ?",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(|(name,)| name).collect())
}

/// `filter[name]` 同时匹配姓名和邮箱
pub async fn list(pool: &SqlitePool, params: &ListParams) -> RepoResult<Paged<User>> {
    let pattern = params.name_pattern();
    let filter = "(?1 IS NULL OR name LIKE ?1 ESCAPE '\\' OR email LIKE ?1 ESCAPE '\\')";
    let sql = format!(
        "SELECT {COLUMNS} FROM users WHERE {filter} {} LIMIT ?2 OFFSET ?3",
        order_by(&params.sort, "name ASC")
    );

    let mut conn = pool.acquire().await?;
    let mut rows: Vec<User> = sqlx::query_as(&sql)
        .bind(&pattern)
        .bind(params.page.limit())
        .bind(params.page.offset())
        .fetch_all(&mut *conn)
        .await?;
    for user in &mut rows {
        user.role_ids = role_ids(&mut conn, user.id).await?;
    }

    let (total,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM users WHERE {filter}"))
        .bind(&pattern)
        .fetch_one(&mut *conn)
        .await?;

    Ok(Paged {
        rows,
        total: total as u64,
    })
}

async fn replace_roles(conn: &mut SqliteConnection, user_id: i64, role_ids: &[i64]) -> RepoResult<()> {
    ensure_exist(conn, "roles", role_ids, ErrorCode::RoleNotFound).await?;
    sqlx::query("DELETE FROM user_roles WHERE user_id = ?")
        .bind(user_id)
        .execute(&mut *conn)
        .await?;
    for role_id in role_ids {
        sqlx::query("INSERT OR IGNORE INTO user_roles (user_id, role_id) VALUES (?, ?)")
            .bind(user_id)
            .bind(role_id)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

pub async fn create(pool: &SqlitePool, data: NewUser) -> RepoResult<User> {
    let now = now_millis();
    let mut tx = pool.begin().await?;

    let (id,): (i64,) = sqlx::query_as(
        "INSERT INTO users (name, email, password, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(&data.name)
    .bind(&data.email)
    .bind(&data.password_hash)
    .bind(now)
    .bind(now)
    .fetch_one(&mut *tx)
    .await
    .map_err(on_duplicate(ErrorCode::EmailTaken))?;

    replace_roles(&mut tx, id, &data.role_ids).await?;
    let user = find_with(&mut tx, id).await?.ok_or_else(|| not_found(id))?;
    tx.commit().await?;

    tracing::info!(user_id = id, "User created");
    Ok(user)
}

pub async fn update(pool: &SqlitePool, id: i64, changes: UserChanges) -> RepoResult<User> {
    let mut tx = pool.begin().await?;

    let result = sqlx::query(
        "UPDATE users SET
            name = COALESCE(?, name),
            email = COALESCE(?, email),
            password = COALESCE(?, password),
            updated_at = ?
         WHERE id = ?",
    )
    .bind(&changes.name)
    .bind(&changes.email)
    .bind(&changes.password_hash)
    .bind(now_millis())
    .bind(id)
    .execute(&mut *tx)
    .await
    .map_err(on_duplicate(ErrorCode::EmailTaken))?;
    if result.rows_affected() == 0 {
        return Err(not_found(id));
    }

    if let Some(role_ids) = &changes.role_ids {
        replace_roles(&mut tx, id, role_ids).await?;
    }

    let user = find_with(&mut tx, id).await?.ok_or_else(|| not_found(id))?;
    tx.commit().await?;
    Ok(user)
}

pub async fn set_profile_image(pool: &SqlitePool, id: i64, url: &str) -> RepoResult<()> {
    let result = sqlx::query("UPDATE users SET profile_image = ?, updated_at = ? WHERE id = ?")
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

/// 删除用户
///
/// 自删除检查在任何数据库操作之前执行；此路径是删除用户的唯一入口。
/// 用户拥有的 items (及其标签关联) 由外键 `ON DELETE CASCADE` 一并删除。
pub async fn delete(pool: &SqlitePool, actor: &Actor, id: i64) -> RepoResult<()> {
    guards::ensure_not_self(actor, id)?;

    let result = sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(not_found(id));
    }

    tracing::info!(user_id = id, deleted_by = actor.id, "User deleted");
    Ok(())
}
