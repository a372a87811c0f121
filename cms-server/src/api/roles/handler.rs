//! Role API Handlers

use axum::extract::{Path, State};
use http::StatusCode;
use validator::Validate;

use crate::api::convert::role_resource;
use crate::api::document::{Resource, collection, created, single};
use crate::api::query::ListQuery;
use crate::auth::permissions::is_known_permission;
use crate::auth::{Actor, MaybeActor};
use crate::core::ServerState;
use crate::db::repository::role;
use crate::policy::{Ability, RolePolicy, authorize};
use crate::security_log;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::jsonapi::{CollectionDocument, JsonApi, ResourceDocument};
use shared::models::{Role, RoleAttributes, RoleCreate, RoleUpdate};

const RESOURCE: &str = "roles";

const SORT: &[(&str, &str)] = &[
    ("name", "name"),
    ("createdAt", "created_at"),
    ("updatedAt", "updated_at"),
];

async fn load(state: &ServerState, id: i64) -> AppResult<Role> {
    role::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::with_message(ErrorCode::RoleNotFound, format!("Role {id} not found")))
}

/// 权限上限：未知权限 422；授予自己没有的权限 403
fn check_grantable(actor: &Actor, permissions: &[String]) -> AppResult<()> {
    if let Some(unknown) = permissions.iter().find(|p| !is_known_permission(p)) {
        return Err(AppError::with_message(
            ErrorCode::UnknownPermission,
            format!("The permission '{unknown}' does not exist."),
        )
        .with_source(shared::error::FieldError::attribute(
            "permissions",
            format!("The permission '{unknown}' does not exist."),
        )));
    }

    ensure_held(actor, permissions)
}

/// 只能授予自己持有的权限
fn ensure_held(actor: &Actor, permissions: &[String]) -> AppResult<()> {
    if let Some(missing) = permissions.iter().find(|p| !actor.has_permission(p)) {
        security_log!(
            "WARN",
            "permission_escalation",
            user_id = actor.id,
            permission = missing.as_str()
        );
        return Err(AppError::permission_denied(format!(
            "You cannot grant the permission '{missing}'."
        )));
    }
    Ok(())
}

/// 给用户分配角色时同样受权限上限约束：角色的每个权限 actor 都必须持有
pub(crate) async fn check_assignable(
    state: &ServerState,
    actor: &Actor,
    role_ids: &[i64],
) -> AppResult<()> {
    for &id in role_ids {
        let role = load(state, id).await?;
        ensure_held(actor, &role.permissions)?;
    }
    Ok(())
}

/// GET /api/v2/roles
pub async fn list(
    State(state): State<ServerState>,
    actor: MaybeActor,
    query: ListQuery,
) -> AppResult<JsonApi<CollectionDocument<RoleAttributes>>> {
    authorize::<Role, _>(&RolePolicy, actor.as_ref(), Ability::ViewAny)?;
    let paged = role::list(&state.pool, &query.params(SORT)?).await?;
    Ok(collection(paged.map(|r| role_resource(&r)), query.page, &query.base))
}

/// GET /api/v2/roles/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    actor: MaybeActor,
    Path(id): Path<i64>,
) -> AppResult<JsonApi<ResourceDocument<RoleAttributes>>> {
    let role = load(&state, id).await?;
    authorize(&RolePolicy, actor.as_ref(), Ability::View(&role))?;
    Ok(single(role_resource(&role)))
}

/// POST /api/v2/roles
pub async fn create(
    State(state): State<ServerState>,
    actor: Actor,
    Resource(body): Resource<RoleCreate>,
) -> AppResult<JsonApi<ResourceDocument<RoleAttributes>>> {
    authorize::<Role, _>(&RolePolicy, Some(&actor), Ability::Create)?;
    body.ensure_type(RESOURCE)?;
    body.attributes.validate()?;

    let attrs = body.attributes;
    check_grantable(&actor, &attrs.permissions)?;

    let role = role::create(
        &state.pool,
        attrs.name.as_deref().unwrap_or_default(),
        &attrs.permissions,
    )
    .await?;
    tracing::info!(role_id = role.id, user_id = actor.id, "Role created");
    Ok(created(role_resource(&role)))
}

/// PATCH /api/v2/roles/{id}
pub async fn update(
    State(state): State<ServerState>,
    actor: Actor,
    Path(id): Path<i64>,
    Resource(body): Resource<RoleUpdate>,
) -> AppResult<JsonApi<ResourceDocument<RoleAttributes>>> {
    let existing = load(&state, id).await?;
    authorize(&RolePolicy, Some(&actor), Ability::Update(&existing))?;
    body.ensure_type(RESOURCE)?;
    body.ensure_id(id)?;
    body.attributes.validate()?;

    let attrs = body.attributes;
    if let Some(permissions) = &attrs.permissions {
        check_grantable(&actor, permissions)?;
    }

    let role = role::update(
        &state.pool,
        id,
        attrs.name.as_deref(),
        attrs.permissions.as_deref(),
    )
    .await?;
    Ok(single(role_resource(&role)))
}

/// DELETE /api/v2/roles/{id} - 仍有用户时返回 409
pub async fn delete(
    State(state): State<ServerState>,
    actor: Actor,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    let existing = load(&state, id).await?;
    authorize(&RolePolicy, Some(&actor), Ability::Delete(&existing))?;
    role::delete(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
