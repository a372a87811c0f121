//! JSON:API request body extractor

use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;
use shared::error::{AppError, ErrorCode};
use shared::jsonapi::{
    CollectionDocument, Document, JsonApi, PageMeta, ResourceDocument, ResourceObject,
};

use crate::db::repository::{Page, Paged};

/// 200 单个资源
pub fn single<A>(resource: ResourceObject<A>) -> JsonApi<ResourceDocument<A>> {
    JsonApi::ok(Document::new(resource))
}

/// 201 新建资源
pub fn created<A>(resource: ResourceObject<A>) -> JsonApi<ResourceDocument<A>> {
    JsonApi::created(Document::new(resource))
}

/// 200 分页集合，附带 `meta.page` 与分页链接
pub fn collection<A>(
    paged: Paged<ResourceObject<A>>,
    page: Page,
    base: &str,
) -> JsonApi<CollectionDocument<A>> {
    let meta = PageMeta::new(page.number, page.size, paged.total);
    JsonApi::ok(CollectionDocument::paged(paged.rows, meta, base))
}

/// `{data: {type, id?, attributes, relationships?}}` 请求体
///
/// 语法错误返回 400，字段类型错误返回 422，超出大小限制返回 413。
/// 类型/ID 校验由 handler 调用 `ensure_type` / `ensure_id` 完成。
#[derive(Debug)]
pub struct Resource<A>(pub ResourceObject<A>);

impl<S, A> FromRequest<S> for Resource<A>
where
    S: Send + Sync,
    A: DeserializeOwned + Default,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state).await.map_err(|e| {
            if e.status() == http::StatusCode::PAYLOAD_TOO_LARGE {
                AppError::new(ErrorCode::PayloadTooLarge)
            } else {
                AppError::invalid_request(e.body_text())
            }
        })?;
        parse(&bytes).map(Self)
    }
}

fn parse<A: DeserializeOwned + Default>(bytes: &[u8]) -> Result<ResourceObject<A>, AppError> {
    let doc: ResourceDocument<A> = serde_json::from_slice(bytes).map_err(|e| {
        if e.classify() == serde_json::error::Category::Data {
            AppError::validation(format!("Invalid resource document: {e}"))
        } else {
            AppError::invalid_request(format!("Malformed JSON:API document: {e}"))
        }
    })?;
    Ok(doc.data)
}
