//! Authorization policy engine
//!
//! One small policy struct per resource type implements [`Policy`]. Policies
//! are pure functions of (actor, target): they read the actor's
//! [`PermissionSet`](crate::auth::PermissionSet) and the target's fields,
//! never the database, never global state.
//!
//! Controllers call [`authorize`], which runs [`check`] and turns a denied
//! [`Decision`] into a 403 JSON:API error.

pub mod category;
pub mod guards;
pub mod item;
pub mod role;
pub mod tag;
pub mod user;

pub use category::CategoryPolicy;
pub use item::{ItemPolicy, ItemVisibility};
pub use role::RolePolicy;
pub use tag::TagPolicy;
pub use user::UserPolicy;

use crate::auth::{Actor, Verb};
use crate::security_log;
use shared::error::{AppError, AppResult, ErrorCode};

/// 对某类资源的一个动作
#[derive(Debug)]
pub enum Ability<'a, T> {
    ViewAny,
    View(&'a T),
    Create,
    Update(&'a T),
    Delete(&'a T),
}

impl<T> Ability<'_, T> {
    pub fn name(&self) -> &'static str {
        match self {
            Self::ViewAny => "viewAny",
            Self::View(_) => "view",
            Self::Create => "create",
            Self::Update(_) => "update",
            Self::Delete(_) => "delete",
        }
    }
}

/// 授权结果 (不持久化)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub allowed: bool,
    pub reason: Option<String>,
}

impl Decision {
    pub fn allow() -> Self {
        Self {
            allowed: true,
            reason: None,
        }
    }

    pub fn deny(reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            reason: Some(reason.into()),
        }
    }

    /// Denied → 403 with the reason as detail
    pub fn into_result(self) -> AppResult<()> {
        if self.allowed {
            return Ok(());
        }
        Err(AppError::with_message(
            ErrorCode::PermissionDenied,
            self.reason
                .unwrap_or_else(|| ErrorCode::PermissionDenied.message().to_string()),
        ))
    }
}

/// 资源类型的授权规则
///
/// 默认实现是纯权限规则：`"{verb} {RESOURCE}"`，匿名一律拒绝。
/// 各资源只覆盖与之不同的规则。
pub trait Policy<T> {
    /// JSON:API type / permission plural, e.g. `"items"`
    const RESOURCE: &'static str;

    fn view_any(&self, actor: Option<&Actor>) -> bool {
        permits(actor, Verb::View, Self::RESOURCE)
    }

    fn view(&self, actor: Option<&Actor>, _target: &T) -> bool {
        permits(actor, Verb::View, Self::RESOURCE)
    }

    fn create(&self, actor: Option<&Actor>) -> bool {
        permits(actor, Verb::Create, Self::RESOURCE)
    }

    fn update(&self, actor: Option<&Actor>, _target: &T) -> bool {
        permits(actor, Verb::Edit, Self::RESOURCE)
    }

    fn delete(&self, actor: Option<&Actor>, _target: &T) -> bool {
        permits(actor, Verb::Delete, Self::RESOURCE)
    }
}

/// Permission-only rule shared by every policy
pub(crate) fn permits(actor: Option<&Actor>, verb: Verb, resource: &str) -> bool {
    actor.is_some_and(|a| a.permissions.can(verb, resource))
}

/// Evaluate one ability
pub fn check<T, P: Policy<T>>(policy: &P, actor: Option<&Actor>, ability: Ability<'_, T>) -> Decision {
    let allowed = match ability {
        Ability::ViewAny => policy.view_any(actor),
        Ability::View(target) => policy.view(actor, target),
        Ability::Create => policy.create(actor),
        Ability::Update(target) => policy.update(actor, target),
        Ability::Delete(target) => policy.delete(actor, target),
    };

    if allowed {
        Decision::allow()
    } else {
        Decision::deny(ErrorCode::PermissionDenied.message())
    }
}

/// [`check`] + 403 on denial, with a security log entry
pub fn authorize<T, P: Policy<T>>(
    policy: &P,
    actor: Option<&Actor>,
    ability: Ability<'_, T>,
) -> AppResult<()> {
    let action = ability.name();
    let decision = check(policy, actor, ability);
    if !decision.allowed {
        security_log!(
            "WARN",
            "policy_denied",
            resource = P::RESOURCE,
            action = action,
            user_id = actor.map(|a| a.id).unwrap_or_default()
        );
    }
    decision.into_result()
}


#[cfg(test)]
mod tests {
    use super::test_support::actor;
    use super::*;
    use shared::models::Category;

    fn category() -> Category {
        Category {
            id: 1,
            name: "News".into(),
            description: None,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_check_dispatch() {
        let editor = actor(1, &["view categories", "edit categories"]);
        let c = category();

        assert!(check(&CategoryPolicy, Some(&editor), Ability::ViewAny).allowed);
        assert!(check(&CategoryPolicy, Some(&editor), Ability::Update(&c)).allowed);
        assert!(!check(&CategoryPolicy, Some(&editor), Ability::Create).allowed);
        assert!(!check(&CategoryPolicy, Some(&editor), Ability::Delete(&c)).allowed);
    }

    #[test]
    fn test_denied_decision_becomes_forbidden() {
        let decision = check::<Category, _>(&CategoryPolicy, None, Ability::Create);
        assert!(!decision.allowed);
        assert_eq!(decision.reason.as_deref(), Some("This action is unauthorized."));

        let err = decision.into_result().unwrap_err();
        assert_eq!(err.http_status(), http::StatusCode::FORBIDDEN);
        assert_eq!(err.code, ErrorCode::PermissionDenied);
    }

    #[test]
    fn test_authorize() {
        let viewer = actor(1, &["view categories"]);
        let c = category();
        assert!(authorize(&CategoryPolicy, Some(&viewer), Ability::View(&c)).is_ok());
        assert!(authorize(&CategoryPolicy, Some(&viewer), Ability::Delete(&c)).is_err());
    }
}
