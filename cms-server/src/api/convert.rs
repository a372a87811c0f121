//! 类型转换模块
//!
//! 将数据库模型 (shared::models 行结构) 转换为 JSON:API 资源对象。
//! 时间戳 (毫秒) 在这里统一格式化为 RFC 3339。

use shared::jsonapi::{Relationship, ResourceObject};
use shared::models::{
    Category, CategoryAttributes, ContactMessage, ContactMessageAttributes, Item, ItemAttributes,
    Permission, PermissionAttributes, Role, RoleAttributes, SiteSettings, Subscription,
    SubscriptionAttributes, Tag, TagAttributes, User, UserAttributes,
};
use shared::util::millis_to_rfc3339;

// ============ Content ============

pub fn item_resource(item: &Item) -> ResourceObject<ItemAttributes> {
    ResourceObject::new(
        "items",
        item.id,
        ItemAttributes {
            name: item.name.clone(),
            excerpt: item.excerpt.clone(),
            description: item.description.clone(),
            image: item.image.clone(),
            status: item.status.to_string(),
            is_on_homepage: item.is_on_homepage,
            date_at: item.date_at.clone(),
            created_at: millis_to_rfc3339(item.created_at),
            updated_at: millis_to_rfc3339(item.updated_at),
        },
    )
    .with_relationship("author", Relationship::to_one("users", Some(item.user_id)))
    .with_relationship("category", Relationship::to_one("categories", item.category_id))
    .with_relationship("tags", Relationship::to_many("tags", &item.tag_ids))
}

pub fn category_resource(category: &Category) -> ResourceObject<CategoryAttributes> {
    ResourceObject::new(
        "categories",
        category.id,
        CategoryAttributes {
            name: category.name.clone(),
            description: category.description.clone(),
            created_at: millis_to_rfc3339(category.created_at),
            updated_at: millis_to_rfc3339(category.updated_at),
        },
    )
}

pub fn tag_resource(tag: &Tag) -> ResourceObject<TagAttributes> {
    ResourceObject::new(
        "tags",
        tag.id,
        TagAttributes {
            name: tag.name.clone(),
            color: tag.color.clone(),
            created_at: millis_to_rfc3339(tag.created_at),
            updated_at: millis_to_rfc3339(tag.updated_at),
        },
    )
}

// ============ Identity ============

/// 密码永远不会出现在响应中
pub fn user_resource(user: &User) -> ResourceObject<UserAttributes> {
    ResourceObject::new(
        "users",
        user.id,
        UserAttributes {
            name: user.name.clone(),
            email: user.email.clone(),
            profile_image: user.profile_image.clone(),
            created_at: millis_to_rfc3339(user.created_at),
            updated_at: millis_to_rfc3339(user.updated_at),
        },
    )
    .with_relationship("roles", Relationship::to_many("roles", &user.role_ids))
}

pub fn role_resource(role: &Role) -> ResourceObject<RoleAttributes> {
    ResourceObject::new(
        "roles",
        role.id,
        RoleAttributes {
            name: role.name.clone(),
            permissions: role.permissions.clone(),
            created_at: millis_to_rfc3339(role.created_at),
            updated_at: millis_to_rfc3339(role.updated_at),
        },
    )
}

pub fn permission_resource(permission: &Permission) -> ResourceObject<PermissionAttributes> {
    ResourceObject::new(
        "permissions",
        permission.id,
        PermissionAttributes {
            name: permission.name.clone(),
        },
    )
}

// ============ Site ============

pub fn contact_message_resource(message: &ContactMessage) -> ResourceObject<ContactMessageAttributes> {
    ResourceObject::new(
        "contact-messages",
        message.id,
        ContactMessageAttributes {
            name: message.name.clone(),
            email: message.email.clone(),
            phone: message.phone.clone(),
            message: message.message.clone(),
            created_at: millis_to_rfc3339(message.created_at),
        },
    )
}

pub fn subscription_resource(subscription: &Subscription) -> ResourceObject<SubscriptionAttributes> {
    ResourceObject::new(
        "subscriptions",
        subscription.id,
        SubscriptionAttributes {
            email: subscription.email.clone(),
            created_at: millis_to_rfc3339(subscription.created_at),
        },
    )
}

/// 单例资源：id 固定为 1
pub fn settings_resource(settings: SiteSettings) -> ResourceObject<SiteSettings> {
    let mut resource = ResourceObject::new("settings", 1, settings);
    resource.links = Some(shared::jsonapi::Links::self_link("/api/v2/settings"));
    resource
}
