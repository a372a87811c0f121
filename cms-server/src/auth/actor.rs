//! 请求主体 (Actor)
//!
//! 每个已认证请求从数据库重新加载一次：用户行 + 角色名 + 权限并集。
//! 令牌只用来确定是谁，能做什么永远以数据库为准。

use sqlx::SqlitePool;

use super::PermissionSet;
use crate::db::repository::{RepoResult, user};

#[derive(Debug, Clone)]
pub struct Actor {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub roles: Vec<String>,
    pub permissions: PermissionSet,
}

impl Actor {
    /// 加载 Actor；用户已被删除时返回 `None`
    pub async fn load(pool: &SqlitePool, user_id: i64) -> RepoResult<Option<Self>> {
        let Some(user) = user::find_by_id(pool, user_id).await? else {
            return Ok(None);
        };
        let roles = user::role_names(pool, user_id).await?;
        let permissions = PermissionSet::new(user::permission_names(pool, user_id).await?);

        Ok(Some(Self {
            id: user.id,
            name: user.name,
            email: user.email,
            roles,
            permissions,
        }))
    }

    /// 是否为该记录的所有者
    pub fn owns(&self, owner_id: i64) -> bool {
        self.id == owner_id
    }

    pub fn has_permission(&self, name: &str) -> bool {
        self.permissions.has(name)
    }
}
