//! 种子数据
//!
//! 幂等，每次启动执行：
//! 1. 全部权限
//! 2. 默认角色 (仅在角色不存在时创建，不覆盖后台的修改)
//! 3. 用户表为空且配置了管理员时，创建管理员账号
//! 4. 站点名称默认值

use sqlx::SqlitePool;

use crate::auth::password::hash_password;
use crate::auth::permissions::{DEFAULT_ROLES, all_permissions, get_default_permissions};
use crate::core::AdminSeed;
use crate::db::repository::{RepoError, RepoResult, permission, role, setting, user};

const DEFAULT_SITE_NAME: &str = "My Business";

pub async fn run(pool: &SqlitePool, admin: Option<&AdminSeed>) -> RepoResult<()> {
    for name in all_permissions() {
        permission::ensure(pool, &name).await?;
    }

    for role_name in DEFAULT_ROLES {
        if role::find_by_name(pool, role_name).await?.is_none() {
            role::create(pool, role_name, &get_default_permissions(role_name)).await?;
            tracing::info!(role = role_name, "Seeded role");
        }
    }

    if let Some(admin) = admin
        && user::count(pool).await? == 0
    {
        let admin_role = role::find_by_name(pool, "admin")
            .await?
            .ok_or_else(|| RepoError::NotFound("admin role".into()))?;
        let password_hash = hash_password(&admin.password)
            .map_err(|e| RepoError::Database(format!("Failed to hash admin password: {e}")))?;

        user::create(
            pool,
            user::NewUser {
                name: admin.name.clone(),
                email: admin.email.clone(),
                password_hash,
                role_ids: vec![admin_role.id],
            },
        )
        .await?;
        tracing::info!(email = %admin.email, "Seeded administrator account");
    }

    setting::ensure_default(pool, "site_name", DEFAULT_SITE_NAME).await?;
    Ok(())
}
