//! Permission Definitions
//!
//! Flat RBAC permission namespace.
//!
//! ## 命名规则
//! - 资源权限: `"{verb} {plural}"`, verb ∈ view/create/edit/delete,
//!   plural ∈ items/categories/tags/users/roles
//! - 站点权限: 设置、联系留言、订阅
//! - 没有通配符、没有层级，也没有 "admin 拥有一切" 的隐式规则：
//!   admin 角色只是被授予了全部权限

use std::collections::HashSet;

/// 资源权限动词
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    View,
    Create,
    Edit,
    Delete,
}

impl Verb {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Create => "create",
            Self::Edit => "edit",
            Self::Delete => "delete",
        }
    }
}

/// 受权限控制的资源类型 (JSON:API type 名即复数形式)
pub const RESOURCES: &[&str] = &["items", "categories", "tags", "users", "roles"];

/// 站点级权限
pub const EDIT_SETTINGS: &str = "edit settings";
pub const VIEW_CONTACT_MESSAGES: &str = "view contact messages";
pub const DELETE_CONTACT_MESSAGES: &str = "delete contact messages";
pub const VIEW_SUBSCRIPTIONS: &str = "view subscriptions";
pub const DELETE_SUBSCRIPTIONS: &str = "delete subscriptions";

const SITE_PERMISSIONS: &[&str] = &[
    EDIT_SETTINGS,
    VIEW_CONTACT_MESSAGES,
    DELETE_CONTACT_MESSAGES,
    VIEW_SUBSCRIPTIONS,
    DELETE_SUBSCRIPTIONS,
];

/// `"{verb} {resource}"`
pub fn permission_name(verb: Verb, resource: &str) -> String {
    format!("{} {}", verb.as_str(), resource)
}

/// 全部权限名 (种子数据 + 角色校验)
pub fn all_permissions() -> Vec<String> {
    let verbs = [Verb::View, Verb::Create, Verb::Edit, Verb::Delete];
    RESOURCES
        .iter()
        .flat_map(|r| verbs.iter().map(move |v| permission_name(*v, r)))
        .chain(SITE_PERMISSIONS.iter().map(|p| p.to_string()))
        .collect()
}

/// 是否为已知权限名
pub fn is_known_permission(name: &str) -> bool {
    all_permissions().iter().any(|p| p == name)
}

/// Default role permissions
pub fn get_default_permissions(role_name: &str) -> Vec<String> {
    match role_name {
        "admin" => all_permissions(),
        "creator" => {
            let verbs = [Verb::View, Verb::Create, Verb::Edit, Verb::Delete];
            ["items", "categories", "tags"]
                .iter()
                .flat_map(|r| verbs.iter().map(move |v| permission_name(*v, r)))
                .chain(std::iter::once(permission_name(Verb::View, "users")))
                .collect()
        }
        "member" => vec![permission_name(Verb::View, "items")],
        _ => vec![],
    }
}

/// 默认角色 (按创建顺序)
pub const DEFAULT_ROLES: &[&str] = &["admin", "creator", "member"];

/// 自助注册用户获得的角色
pub const REGISTRATION_ROLE: &str = "member";

/// 一个请求内的有效权限集合 (所有角色权限的并集)
///
/// 每次请求从数据库重新计算，从不跨请求缓存。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionSet(HashSet<String>);

impl PermissionSet {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(names.into_iter().map(Into::into).collect())
    }

    /// 能力检查
    pub fn has(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    pub fn can(&self, verb: Verb, resource: &str) -> bool {
        self.has(&permission_name(verb, resource))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// 排序后的权限名 (用于 /me 响应)
    pub fn sorted(&self) -> Vec<String> {
        let mut names: Vec<String> = self.0.iter().cloned().collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_permissions() {
        let all = all_permissions();
        assert_eq!(all.len(), RESOURCES.len() * 4 + SITE_PERMISSIONS.len());
        assert!(all.contains(&"view items".to_string()));
        assert!(all.contains(&"delete roles".to_string()));
        assert!(all.contains(&"edit settings".to_string()));
    }

    #[test]
    fn test_default_roles() {
        let creator = get_default_permissions("creator");
        assert!(creator.contains(&"edit items".to_string()));
        assert!(creator.contains(&"view users".to_string()));
        assert!(!creator.contains(&"delete users".to_string()));

        assert_eq!(get_default_permissions("member"), vec!["view items"]);
        assert_eq!(get_default_permissions("admin"), all_permissions());
        assert!(get_default_permissions("unknown").is_empty());
    }

    #[test]
    fn test_permission_set_is_exact_match() {
        let set = PermissionSet::new(["view items", "edit items"]);
        assert!(set.has("view items"));
        assert!(set.can(Verb::Edit, "items"));
        assert!(!set.has("view"));
        assert!(!set.can(Verb::Delete, "items"));
        assert_eq!(set.sorted(), vec!["edit items", "view items"]);
    }

    #[test]
    fn test_unknown_permission() {
        assert!(is_known_permission("view subscriptions"));
        assert!(!is_known_permission("all"));
        assert!(!is_known_permission("items:*"));
    }
}
