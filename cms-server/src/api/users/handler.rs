//! User API Handlers

use axum::extract::{Path, State};
use http::StatusCode;
use validator::Validate;

use crate::api::convert::user_resource;
use crate::api::document::{Resource, collection, created, single};
use crate::api::query::ListQuery;
use crate::api::roles::check_assignable;
use crate::auth::password::hash_for_storage;
use crate::auth::{Actor, MaybeActor};
use crate::core::ServerState;
use crate::db::repository::user::{self, NewUser, UserChanges};
use crate::policy::guards;
use crate::policy::{Ability, UserPolicy, authorize};
use crate::security_log;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::jsonapi::{CollectionDocument, JsonApi, ResourceDocument, ResourceObject};
use shared::models::{User, UserAttributes, UserCreate, UserUpdate};

const RESOURCE: &str = "users";

const SORT: &[(&str, &str)] = &[
    ("name", "name"),
    ("email", "email"),
    ("createdAt", "created_at"),
    ("updatedAt", "updated_at"),
];

async fn load(state: &ServerState, id: i64) -> AppResult<User> {
    user::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::with_message(ErrorCode::UserNotFound, format!("User {id} not found")))
}

fn role_ids(body: &ResourceObject<impl Sized>) -> AppResult<Option<Vec<i64>>> {
    body.relationship("roles")
        .map(|r| r.many_ids("roles", "roles"))
        .transpose()
}

/// GET /api/v2/users
pub async fn list(
    State(state): State<ServerState>,
    actor: MaybeActor,
    query: ListQuery,
) -> AppResult<JsonApi<CollectionDocument<UserAttributes>>> {
    authorize::<User, _>(&UserPolicy, actor.as_ref(), Ability::ViewAny)?;
    let paged = user::list(&state.pool, &query.params(SORT)?).await?;
    Ok(collection(paged.map(|u| user_resource(&u)), query.page, &query.base))
}

/// GET /api/v2/users/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    actor: MaybeActor,
    Path(id): Path<i64>,
) -> AppResult<JsonApi<ResourceDocument<UserAttributes>>> {
    let user = load(&state, id).await?;
    authorize(&UserPolicy, actor.as_ref(), Ability::View(&user))?;
    Ok(single(user_resource(&user)))
}

/// POST /api/v2/users
pub async fn create(
    State(state): State<ServerState>,
    actor: Actor,
    Resource(body): Resource<UserCreate>,
) -> AppResult<JsonApi<ResourceDocument<UserAttributes>>> {
    authorize::<User, _>(&UserPolicy, Some(&actor), Ability::Create)?;
    body.ensure_type(RESOURCE)?;
    body.attributes.validate()?;
    let roles = role_ids(&body)?;
    if let Some(ids) = &roles {
        check_assignable(&state, &actor, ids).await?;
    }

    let attrs = body.attributes;
    let data = NewUser {
        name: attrs.name.unwrap_or_default(),
        email: attrs.email.unwrap_or_default(),
        password_hash: hash_for_storage(attrs.password.as_deref().unwrap_or_default())?,
        role_ids: roles.unwrap_or_default(),
    };

    let user = user::create(&state.pool, data).await?;
    Ok(created(user_resource(&user)))
}

/// PATCH /api/v2/users/{id}
pub async fn update(
    State(state): State<ServerState>,
    actor: Actor,
    Path(id): Path<i64>,
    Resource(body): Resource<UserUpdate>,
) -> AppResult<JsonApi<ResourceDocument<UserAttributes>>> {
    let existing = load(&state, id).await?;
    authorize(&UserPolicy, Some(&actor), Ability::Update(&existing))?;
    body.ensure_type(RESOURCE)?;
    body.ensure_id(id)?;
    body.attributes.validate()?;
    let roles = role_ids(&body)?;
    if let Some(ids) = &roles {
        check_assignable(&state, &actor, ids).await?;
    }

    let attrs = body.attributes;
    let changes = UserChanges {
        name: attrs.name,
        email: attrs.email,
        password_hash: attrs.password.as_deref().map(hash_for_storage).transpose()?,
        role_ids: roles,
    };

    let user = user::update(&state.pool, id, changes).await?;
    tracing::info!(user_id = id, updated_by = actor.id, "User updated");
    Ok(single(user_resource(&user)))
}

/// DELETE /api/v2/users/{id}
///
/// 顺序：加载目标 (404) → 自删除检查 (403) → 策略 (403) → 仓储删除
pub async fn delete(
    State(state): State<ServerState>,
    actor: Actor,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    let target = load(&state, id).await?;

    if let Err(e) = guards::ensure_not_self(&actor, target.id) {
        security_log!("WARN", "self_deletion_blocked", user_id = actor.id);
        return Err(e.into());
    }
    authorize(&UserPolicy, Some(&actor), Ability::Delete(&target))?;

    user::delete(&state.pool, &actor, target.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
