//! Deletion guards
//!
//! Invariants checked inside the repositories' own delete paths, independent
//! of the policy engine. They are pure comparisons over the current state and
//! are never retried.

use crate::auth::Actor;
use shared::error::{AppError, ErrorCode};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GuardError {
    /// The actor targeted their own account
    #[error("You cannot delete yourself.")]
    SelfDeletion,

    /// The role is still assigned to users
    #[error("Role has associated users")]
    RoleInUse { users: i64 },

    /// The category is still referenced by items
    #[error("Category has associated items")]
    CategoryHasItems { items: i64 },
}

impl GuardError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::SelfDeletion => ErrorCode::CannotDeleteSelf,
            Self::RoleInUse { .. } => ErrorCode::RoleInUse,
            Self::CategoryHasItems { .. } => ErrorCode::CategoryHasItems,
        }
    }
}

impl From<GuardError> for AppError {
    fn from(err: GuardError) -> Self {
        let app = AppError::with_message(err.code(), err.to_string());
        match err {
            GuardError::SelfDeletion => app,
            GuardError::RoleInUse { users } => app.with_detail("users", users),
            GuardError::CategoryHasItems { items } => app.with_detail("items", items),
        }
    }
}

/// 用户不能删除自己，无论拥有什么权限
pub fn ensure_not_self(actor: &Actor, target_user_id: i64) -> Result<(), GuardError> {
    if actor.id == target_user_id {
        return Err(GuardError::SelfDeletion);
    }
    Ok(())
}

/// 仍有用户的角色不能删除
pub fn ensure_role_unassigned(assigned_users: i64) -> Result<(), GuardError> {
    if assigned_users > 0 {
        return Err(GuardError::RoleInUse {
            users: assigned_users,
        });
    }
    Ok(())
}

/// 仍有内容的分类不能删除
pub fn ensure_category_empty(items: i64) -> Result<(), GuardError> {
    if items > 0 {
        return Err(GuardError::CategoryHasItems { items });
    }
    Ok(())
}
