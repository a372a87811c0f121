//! User policy
//!
//! 删除自己永远不被允许，即便持有 `"delete users"`。

use super::{Policy, permits};
use crate::auth::{Actor, Verb};
use shared::models::User;

pub struct UserPolicy;

impl Policy<User> for UserPolicy {
    const RESOURCE: &'static str = "users";

    fn delete(&self, actor: Option<&Actor>, target: &User) -> bool {
        match actor {
            Some(a) if a.owns(target.id) => false,
            _ => permits(actor, Verb::Delete, Self::RESOURCE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::test_support::actor;

    fn user(id: i64) -> User {
        User {
            id,
            name: format!("user{id}"),
            email: format!("user{id}@example.com"),
            password: String::new(),
            profile_image: None,
            created_at: 0,
            updated_at: 0,
            role_ids: vec![],
        }
    }

    #[test]
    fn test_cannot_delete_self_even_with_permission() {
        let admin = actor(1, &["delete users"]);
        assert!(!UserPolicy.delete(Some(&admin), &user(1)));
        assert!(UserPolicy.delete(Some(&admin), &user(2)));
    }

    #[test]
    fn test_permission_rules() {
        let viewer = actor(3, &["view users"]);
        assert!(UserPolicy.view_any(Some(&viewer)));
        assert!(UserPolicy.view(Some(&viewer), &user(4)));
        assert!(!UserPolicy.update(Some(&viewer), &user(3)));
        assert!(!UserPolicy.delete(Some(&viewer), &user(4)));
        assert!(!UserPolicy.view_any(None));
    }
}
