//! Subscription API Handlers

use axum::extract::{Path, State};
use http::StatusCode;
use validator::Validate;

use crate::api::convert::subscription_resource;
use crate::api::document::{Resource, collection, created, single};
use crate::api::query::ListQuery;
use crate::core::ServerState;
use crate::db::repository::subscription;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::jsonapi::{CollectionDocument, JsonApi, ResourceDocument};
use shared::models::{SubscriptionAttributes, SubscriptionCreate};

const RESOURCE: &str = "subscriptions";

const SORT: &[(&str, &str)] = &[("email", "email"), ("createdAt", "created_at")];

/// GET /api/v2/subscriptions
pub async fn list(
    State(state): State<ServerState>,
    query: ListQuery,
) -> AppResult<JsonApi<CollectionDocument<SubscriptionAttributes>>> {
    let paged = subscription::list(&state.pool, &query.params(SORT)?).await?;
    Ok(collection(
        paged.map(|s| subscription_resource(&s)),
        query.page,
        &query.base,
    ))
}

/// GET /api/v2/subscriptions/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<JsonApi<ResourceDocument<SubscriptionAttributes>>> {
    let found = subscription::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| {
            AppError::with_message(
                ErrorCode::SubscriptionNotFound,
                format!("Subscription {id} not found"),
            )
        })?;
    Ok(single(subscription_resource(&found)))
}

/// POST /api/v2/subscriptions (公开)
pub async fn create(
    State(state): State<ServerState>,
    Resource(body): Resource<SubscriptionCreate>,
) -> AppResult<JsonApi<ResourceDocument<SubscriptionAttributes>>> {
    body.ensure_type(RESOURCE)?;
    body.attributes.validate()?;

    let email = body.attributes.email.unwrap_or_default();
    let created_sub = subscription::create(&state.pool, email.trim()).await?;
    Ok(created(subscription_resource(&created_sub)))
}

/// DELETE /api/v2/subscriptions/{id}
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    subscription::delete(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
