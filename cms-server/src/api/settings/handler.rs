//! Site Settings API Handlers

use axum::extract::State;
use validator::Validate;

use crate::api::convert::settings_resource;
use crate::api::document::{Resource, single};
use crate::auth::Actor;
use crate::core::ServerState;
use crate::db::repository::setting;
use shared::error::AppResult;
use shared::jsonapi::{JsonApi, ResourceDocument};
use shared::models::SiteSettings;

const RESOURCE: &str = "settings";

/// GET /api/v2/settings
pub async fn show(State(state): State<ServerState>) -> AppResult<JsonApi<ResourceDocument<SiteSettings>>> {
    let settings = setting::load(&state.pool).await?;
    Ok(single(settings_resource(settings)))
}

/// PATCH /api/v2/settings - 只更新请求中出现的键，空字符串清空
pub async fn update(
    State(state): State<ServerState>,
    actor: Actor,
    Resource(body): Resource<SiteSettings>,
) -> AppResult<JsonApi<ResourceDocument<SiteSettings>>> {
    body.ensure_type(RESOURCE)?;
    body.attributes.validate()?;

    let settings = setting::upsert(&state.pool, &body.attributes).await?;
    tracing::info!(user_id = actor.id, keys = body.attributes.provided().len(), "Site settings updated");
    Ok(single(settings_resource(settings)))
}
