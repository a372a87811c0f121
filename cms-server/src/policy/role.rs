//! Role policy: permission-only rules
//!
//! Deleting a role additionally runs the role-in-use guard inside the
//! repository.

use super::Policy;
use shared::models::Role;

pub struct RolePolicy;

impl Policy<Role> for RolePolicy {
    const RESOURCE: &'static str = "roles";
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::test_support::actor;

    #[test]
    fn test_role_permissions() {
        let role = Role {
            id: 3,
            name: "editor".into(),
            created_at: 0,
            updated_at: 0,
            permissions: vec![],
        };
        let admin = actor(1, &["view roles", "edit roles", "delete roles"]);
        let creator = actor(2, &["view items", "edit items", "view users"]);

        assert!(RolePolicy.update(Some(&admin), &role));
        assert!(RolePolicy.delete(Some(&admin), &role));
        assert!(!RolePolicy.create(Some(&admin)));
        assert!(!RolePolicy.view(Some(&creator), &role));
    }
}
