//! Category API Handlers

use axum::extract::{Path, State};
use http::StatusCode;
use validator::Validate;

use crate::api::convert::category_resource;
use crate::api::document::{Resource, collection, created, single};
use crate::api::query::ListQuery;
use crate::auth::{Actor, MaybeActor};
use crate::core::ServerState;
use crate::db::repository::category;
use crate::policy::{Ability, CategoryPolicy, authorize};
use shared::error::{AppError, AppResult, ErrorCode};
use shared::jsonapi::{CollectionDocument, JsonApi, ResourceDocument};
use shared::models::{Category, CategoryAttributes, CategoryCreate, CategoryUpdate};

const RESOURCE: &str = "categories";

const SORT: &[(&str, &str)] = &[
    ("name", "name"),
    ("createdAt", "created_at"),
    ("updatedAt", "updated_at"),
];

async fn load(state: &ServerState, id: i64) -> AppResult<Category> {
    category::find_by_id(&state.pool, id).await?.ok_or_else(|| {
        AppError::with_message(ErrorCode::CategoryNotFound, format!("Category {id} not found"))
    })
}

/// GET /api/v2/categories
pub async fn list(
    State(state): State<ServerState>,
    actor: MaybeActor,
    query: ListQuery,
) -> AppResult<JsonApi<CollectionDocument<CategoryAttributes>>> {
    authorize::<Category, _>(&CategoryPolicy, actor.as_ref(), Ability::ViewAny)?;
    let paged = category::list(&state.pool, &query.params(SORT)?).await?;
    Ok(collection(paged.map(|c| category_resource(&c)), query.page, &query.base))
}

/// GET /api/v2/categories/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    actor: MaybeActor,
    Path(id): Path<i64>,
) -> AppResult<JsonApi<ResourceDocument<CategoryAttributes>>> {
    let category = load(&state, id).await?;
    authorize(&CategoryPolicy, actor.as_ref(), Ability::View(&category))?;
    Ok(single(category_resource(&category)))
}

/// POST /api/v2/categories
pub async fn create(
    State(state): State<ServerState>,
    actor: Actor,
    Resource(body): Resource<CategoryCreate>,
) -> AppResult<JsonApi<ResourceDocument<CategoryAttributes>>> {
    authorize::<Category, _>(&CategoryPolicy, Some(&actor), Ability::Create)?;
    body.ensure_type(RESOURCE)?;
    body.attributes.validate()?;

    let attrs = body.attributes;
    let category = category::create(
        &state.pool,
        attrs.name.as_deref().unwrap_or_default(),
        attrs.description.as_deref(),
    )
    .await?;
    tracing::info!(category_id = category.id, user_id = actor.id, "Category created");
    Ok(created(category_resource(&category)))
}

/// PATCH /api/v2/categories/{id}
pub async fn update(
    State(state): State<ServerState>,
    actor: Actor,
    Path(id): Path<i64>,
    Resource(body): Resource<CategoryUpdate>,
) -> AppResult<JsonApi<ResourceDocument<CategoryAttributes>>> {
    let existing = load(&state, id).await?;
    authorize(&CategoryPolicy, Some(&actor), Ability::Update(&existing))?;
    body.ensure_type(RESOURCE)?;
    body.ensure_id(id)?;
    body.attributes.validate()?;

    let attrs = body.attributes;
    let category =
        category::update(&state.pool, id, attrs.name.as_deref(), attrs.description.as_deref()).await?;
    Ok(single(category_resource(&category)))
}

/// DELETE /api/v2/categories/{id} - 仍有内容时返回 409
pub async fn delete(
    State(state): State<ServerState>,
    actor: Actor,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    let existing = load(&state, id).await?;
    authorize(&CategoryPolicy, Some(&actor), Ability::Delete(&existing))?;
    category::delete(&state.pool, id).await?;
    tracing::info!(category_id = id, user_id = actor.id, "Category deleted");
    Ok(StatusCode::NO_CONTENT)
}
