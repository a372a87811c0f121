//! Item API Handlers

use axum::extract::{Path, State};
use http::StatusCode;
use validator::Validate;

use crate::api::convert::item_resource;
use crate::api::document::{Resource, collection, created, single};
use crate::api::query::ListQuery;
use crate::auth::{Actor, MaybeActor};
use crate::core::ServerState;
use crate::db::repository::item::{self, ItemChanges, ItemFilter, NewItem};
use crate::policy::{Ability, ItemPolicy, ItemVisibility, authorize};
use shared::error::{AppError, AppResult, ErrorCode};
use shared::jsonapi::{CollectionDocument, JsonApi, ResourceDocument, ResourceObject};
use shared::models::{Item, ItemAttributes, ItemCreate, ItemStatus, ItemUpdate};

const RESOURCE: &str = "items";

const SORT: &[(&str, &str)] = &[
    ("name", "name"),
    ("status", "status"),
    ("dateAt", "date_at"),
    ("isOnHomepage", "is_on_homepage"),
    ("createdAt", "created_at"),
    ("updatedAt", "updated_at"),
];

async fn load(state: &ServerState, id: i64) -> AppResult<Item> {
    item::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::with_message(ErrorCode::ItemNotFound, format!("Item {id} not found")))
}

fn parse_status(value: &str) -> AppResult<ItemStatus> {
    value
        .parse()
        .map_err(|_| AppError::invalid_attribute("status", "The selected status is invalid."))
}

fn parse_filter_id(query: &ListQuery, key: &str) -> AppResult<Option<i64>> {
    query
        .filter(key)
        .map(|v| {
            v.parse()
                .map_err(|_| AppError::invalid_request(format!("filter[{key}] must be an id")))
        })
        .transpose()
}

/// 关系: category (to-one), tags (to-many)
fn relationships(body: &ResourceObject<impl Sized>) -> AppResult<(Option<Option<i64>>, Option<Vec<i64>>)> {
    let category = body
        .relationship("category")
        .map(|r| r.one_id("category", "categories"))
        .transpose()?;
    let tags = body
        .relationship("tags")
        .map(|r| r.many_ids("tags", "tags"))
        .transpose()?;
    Ok((category, tags))
}

/// GET /api/v2/items
///
/// 没有 "view items" 的请求 (含匿名) 只能看到已发布内容。
pub async fn list(
    State(state): State<ServerState>,
    actor: MaybeActor,
    query: ListQuery,
) -> AppResult<JsonApi<CollectionDocument<ItemAttributes>>> {
    let actor = actor.as_ref();
    authorize::<Item, _>(&ItemPolicy, actor, Ability::ViewAny)?;

    let filter = ItemFilter {
        name: query.filter("name").map(str::to_string),
        status: query
            .filter("status")
            .map(|s| {
                s.parse::<ItemStatus>()
                    .map_err(|_| AppError::invalid_request(format!("Unknown status filter: {s}")))
            })
            .transpose()?,
        category_id: parse_filter_id(&query, "category")?,
        tag_id: parse_filter_id(&query, "tag")?,
    };

    let paged = item::list(
        &state.pool,
        query.page,
        &query.sort_by(SORT)?,
        &filter,
        ItemVisibility::for_actor(actor),
    )
    .await?;

    Ok(collection(paged.map(|i| item_resource(&i)), query.page, &query.base))
}

/// GET /api/v2/items/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    actor: MaybeActor,
    Path(id): Path<i64>,
) -> AppResult<JsonApi<ResourceDocument<ItemAttributes>>> {
    let item = load(&state, id).await?;
    authorize(&ItemPolicy, actor.as_ref(), Ability::View(&item))?;
    Ok(single(item_resource(&item)))
}

/// POST /api/v2/items - 作者为当前用户
pub async fn create(
    State(state): State<ServerState>,
    actor: Actor,
    Resource(body): Resource<ItemCreate>,
) -> AppResult<JsonApi<ResourceDocument<ItemAttributes>>> {
    authorize::<Item, _>(&ItemPolicy, Some(&actor), Ability::Create)?;
    body.ensure_type(RESOURCE)?;
    body.attributes.validate()?;
    let (category, tags) = relationships(&body)?;

    let attrs = body.attributes;
    let data = NewItem {
        name: attrs.name.unwrap_or_default(),
        excerpt: attrs.excerpt,
        description: attrs.description,
        status: parse_status(attrs.status.as_deref().unwrap_or_default())?,
        is_on_homepage: attrs.is_on_homepage.unwrap_or(false),
        date_at: attrs.date_at,
        category_id: category.flatten(),
        tag_ids: tags.unwrap_or_default(),
    };

    let item = item::create(&state.pool, actor.id, data).await?;
    Ok(created(item_resource(&item)))
}

/// PATCH /api/v2/items/{id}
pub async fn update(
    State(state): State<ServerState>,
    actor: Actor,
    Path(id): Path<i64>,
    Resource(body): Resource<ItemUpdate>,
) -> AppResult<JsonApi<ResourceDocument<ItemAttributes>>> {
    let existing = load(&state, id).await?;
    authorize(&ItemPolicy, Some(&actor), Ability::Update(&existing))?;
    body.ensure_type(RESOURCE)?;
    body.ensure_id(id)?;
    body.attributes.validate()?;
    let (category_id, tag_ids) = relationships(&body)?;

    let attrs = body.attributes;
    let changes = ItemChanges {
        name: attrs.name,
        excerpt: attrs.excerpt,
        description: attrs.description,
        status: attrs.status.as_deref().map(parse_status).transpose()?,
        is_on_homepage: attrs.is_on_homepage,
        date_at: attrs.date_at,
        category_id,
        tag_ids,
    };

    let item = item::update(&state.pool, id, changes).await?;
    tracing::info!(item_id = id, user_id = actor.id, "Item updated");
    Ok(single(item_resource(&item)))
}

/// DELETE /api/v2/items/{id}
pub async fn delete(
    State(state): State<ServerState>,
    actor: Actor,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    let existing = load(&state, id).await?;
    authorize(&ItemPolicy, Some(&actor), Ability::Delete(&existing))?;
    item::delete(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
