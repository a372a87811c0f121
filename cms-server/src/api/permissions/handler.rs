//! Permission API Handlers

use axum::extract::State;

use crate::api::convert::permission_resource;
use crate::api::document::collection;
use crate::api::query::ListQuery;
use crate::core::ServerState;
use crate::db::repository::permission;
use shared::error::AppResult;
use shared::jsonapi::{CollectionDocument, JsonApi};
use shared::models::PermissionAttributes;

const SORT: &[(&str, &str)] = &[("name", "name")];

/// GET /api/v2/permissions
pub async fn list(
    State(state): State<ServerState>,
    query: ListQuery,
) -> AppResult<JsonApi<CollectionDocument<PermissionAttributes>>> {
    let paged = permission::list(&state.pool, &query.params(SORT)?).await?;
    Ok(collection(
        paged.map(|p| permission_resource(&p)),
        query.page,
        &query.base,
    ))
}
