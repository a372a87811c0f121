//! Contact Message API Handlers

use axum::extract::{Path, State};
use http::StatusCode;
use validator::Validate;

use crate::api::convert::contact_message_resource;
use crate::api::document::{Resource, collection, created, single};
use crate::api::query::ListQuery;
use crate::core::ServerState;
use crate::db::repository::contact_message::{self, NewContactMessage};
use shared::error::{AppError, AppResult, ErrorCode};
use shared::jsonapi::{CollectionDocument, JsonApi, ResourceDocument};
use shared::models::{ContactMessageAttributes, ContactMessageCreate};

const RESOURCE: &str = "contact-messages";

const SORT: &[(&str, &str)] = &[
    ("name", "name"),
    ("email", "email"),
    ("createdAt", "created_at"),
];

/// GET /api/v2/contact-messages
pub async fn list(
    State(state): State<ServerState>,
    query: ListQuery,
) -> AppResult<JsonApi<CollectionDocument<ContactMessageAttributes>>> {
    let paged = contact_message::list(&state.pool, &query.params(SORT)?).await?;
    Ok(collection(
        paged.map(|m| contact_message_resource(&m)),
        query.page,
        &query.base,
    ))
}

/// GET /api/v2/contact-messages/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<JsonApi<ResourceDocument<ContactMessageAttributes>>> {
    let message = contact_message::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| {
            AppError::with_message(
                ErrorCode::ContactMessageNotFound,
                format!("Contact message {id} not found"),
            )
        })?;
    Ok(single(contact_message_resource(&message)))
}

/// POST /api/v2/contact-messages (公开)
pub async fn create(
    State(state): State<ServerState>,
    Resource(body): Resource<ContactMessageCreate>,
) -> AppResult<JsonApi<ResourceDocument<ContactMessageAttributes>>> {
    body.ensure_type(RESOURCE)?;
    body.attributes.validate()?;

    let attrs = body.attributes;
    let data = NewContactMessage {
        name: attrs.name.unwrap_or_default(),
        email: attrs.email.unwrap_or_default(),
        phone: attrs.phone.filter(|p| !p.is_empty()),
        message: attrs.message.unwrap_or_default(),
    };

    let message = contact_message::create(&state.pool, data).await?;
    tracing::info!(message_id = message.id, "Contact message received");
    Ok(created(contact_message_resource(&message)))
}

/// DELETE /api/v2/contact-messages/{id}
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    contact_message::delete(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
