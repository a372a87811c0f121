//! Tag API Handlers

use axum::extract::{Path, State};
use http::StatusCode;
use validator::Validate;

use crate::api::convert::tag_resource;
use crate::api::document::{Resource, collection, created, single};
use crate::api::query::ListQuery;
use crate::auth::{Actor, MaybeActor};
use crate::core::ServerState;
use crate::db::repository::tag;
use crate::policy::{Ability, TagPolicy, authorize};
use shared::error::{AppError, AppResult, ErrorCode};
use shared::jsonapi::{CollectionDocument, JsonApi, ResourceDocument};
use shared::models::{Tag, TagAttributes, TagCreate, TagUpdate};

const RESOURCE: &str = "tags";

const SORT: &[(&str, &str)] = &[
    ("name", "name"),
    ("color", "color"),
    ("createdAt", "created_at"),
    ("updatedAt", "updated_at"),
];

async fn load(state: &ServerState, id: i64) -> AppResult<Tag> {
    tag::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::with_message(ErrorCode::TagNotFound, format!("Tag {id} not found")))
}

/// GET /api/v2/tags
pub async fn list(
    State(state): State<ServerState>,
    actor: MaybeActor,
    query: ListQuery,
) -> AppResult<JsonApi<CollectionDocument<TagAttributes>>> {
    authorize::<Tag, _>(&TagPolicy, actor.as_ref(), Ability::ViewAny)?;
    let paged = tag::list(&state.pool, &query.params(SORT)?).await?;
    Ok(collection(paged.map(|t| tag_resource(&t)), query.page, &query.base))
}

/// GET /api/v2/tags/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    actor: MaybeActor,
    Path(id): Path<i64>,
) -> AppResult<JsonApi<ResourceDocument<TagAttributes>>> {
    let tag = load(&state, id).await?;
    authorize(&TagPolicy, actor.as_ref(), Ability::View(&tag))?;
    Ok(single(tag_resource(&tag)))
}

/// POST /api/v2/tags
pub async fn create(
    State(state): State<ServerState>,
    actor: Actor,
    Resource(body): Resource<TagCreate>,
) -> AppResult<JsonApi<ResourceDocument<TagAttributes>>> {
    authorize::<Tag, _>(&TagPolicy, Some(&actor), Ability::Create)?;
    body.ensure_type(RESOURCE)?;
    body.attributes.validate()?;

    let attrs = body.attributes;
    let tag = tag::create(
        &state.pool,
        attrs.name.as_deref().unwrap_or_default(),
        attrs.color.as_deref(),
    )
    .await?;
    Ok(created(tag_resource(&tag)))
}

/// PATCH /api/v2/tags/{id}
pub async fn update(
    State(state): State<ServerState>,
    actor: Actor,
    Path(id): Path<i64>,
    Resource(body): Resource<TagUpdate>,
) -> AppResult<JsonApi<ResourceDocument<TagAttributes>>> {
    let existing = load(&state, id).await?;
    authorize(&TagPolicy, Some(&actor), Ability::Update(&existing))?;
    body.ensure_type(RESOURCE)?;
    body.ensure_id(id)?;
    body.attributes.validate()?;

    let attrs = body.attributes;
    let tag = tag::update(&state.pool, id, attrs.name.as_deref(), attrs.color.as_deref()).await?;
    Ok(single(tag_resource(&tag)))
}

/// DELETE /api/v2/tags/{id}
pub async fn delete(
    State(state): State<ServerState>,
    actor: Actor,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    let existing = load(&state, id).await?;
    authorize(&TagPolicy, Some(&actor), Ability::Delete(&existing))?;
    tag::delete(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
