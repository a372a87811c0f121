//! Item policy
//!
//! - 列表对所有人开放，草稿的隐藏在查询层完成 ([`ItemVisibility`])
//! - 单条查看：匿名只能看已发布的；登录用户看 `"view items"`，不看归属
//! - 修改/删除：作者本人，或持有对应权限

use super::{Policy, permits};
use crate::auth::{Actor, Verb};
use shared::models::Item;

pub struct ItemPolicy;

impl Policy<Item> for ItemPolicy {
    const RESOURCE: &'static str = "items";

    fn view_any(&self, _actor: Option<&Actor>) -> bool {
        true
    }

    fn view(&self, actor: Option<&Actor>, target: &Item) -> bool {
        match actor {
            None => target.is_published(),
            Some(actor) => actor.permissions.can(Verb::View, Self::RESOURCE),
        }
    }

    fn update(&self, actor: Option<&Actor>, target: &Item) -> bool {
        actor.is_some_and(|a| a.owns(target.user_id)) || permits(actor, Verb::Edit, Self::RESOURCE)
    }

    fn delete(&self, actor: Option<&Actor>, target: &Item) -> bool {
        actor.is_some_and(|a| a.owns(target.user_id))
            || permits(actor, Verb::Delete, Self::RESOURCE)
    }
}

/// 列表查询的可见范围
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemVisibility {
    All,
    /// 强制 `status = 'published'`，忽略客户端的 status 过滤
    PublishedOnly,
}

impl ItemVisibility {
    pub fn for_actor(actor: Option<&Actor>) -> Self {
        if permits(actor, Verb::View, ItemPolicy::RESOURCE) {
            Self::All
        } else {
            Self::PublishedOnly
        }
    }
}
