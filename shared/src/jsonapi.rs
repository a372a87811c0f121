//! JSON:API document types
//!
//! Every request and response body of the `/api/v2` surface is a JSON:API
//! document (`application/vnd.api+json`). Attributes are plain serde structs
//! plugged into [`ResourceObject`]; relationships carry resource identifiers
//! whose ids are strings on the wire and `i64` in the database.

use crate::error::{AppError, AppResult};
use axum::response::{IntoResponse, Response};
use http::{HeaderValue, StatusCode, header};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// JSON:API media type
pub const MEDIA_TYPE: &str = "application/vnd.api+json";

/// Default `page[size]`
pub const DEFAULT_PAGE_SIZE: u32 = 15;
/// Upper bound for `page[size]`
pub const MAX_PAGE_SIZE: u32 = 100;

// ========== Resource objects ==========

/// `{type, id}` pair used inside relationships
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceIdentifier {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
}

impl ResourceIdentifier {
    pub fn new(kind: &str, id: i64) -> Self {
        Self {
            kind: kind.to_string(),
            id: id.to_string(),
        }
    }
}

/// Relationship linkage: to-many (array) or to-one (object or null)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RelationshipData {
    Many(Vec<ResourceIdentifier>),
    One(Option<ResourceIdentifier>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    pub data: RelationshipData,
}

impl Relationship {
    pub fn to_one(kind: &str, id: Option<i64>) -> Self {
        Self {
            data: RelationshipData::One(id.map(|id| ResourceIdentifier::new(kind, id))),
        }
    }

    pub fn to_many(kind: &str, ids: &[i64]) -> Self {
        Self {
            data: RelationshipData::Many(
                ids.iter().map(|id| ResourceIdentifier::new(kind, *id)).collect(),
            ),
        }
    }

    /// Parse a to-one linkage of the given type; `Ok(None)` means "cleared"
    pub fn one_id(&self, name: &str, kind: &str) -> AppResult<Option<i64>> {
        match &self.data {
            RelationshipData::One(None) => Ok(None),
            RelationshipData::One(Some(ident)) => parse_identifier(name, kind, ident).map(Some),
            RelationshipData::Many(_) => Err(relationship_error(
                name,
                format!("The {name} field must be a to-one relationship."),
            )),
        }
    }

    /// Parse a to-many linkage of the given type
    pub fn many_ids(&self, name: &str, kind: &str) -> AppResult<Vec<i64>> {
        match &self.data {
            RelationshipData::Many(idents) => idents
                .iter()
                .map(|ident| parse_identifier(name, kind, ident))
                .collect(),
            RelationshipData::One(_) => Err(relationship_error(
                name,
                format!("The {name} field must be a to-many relationship."),
            )),
        }
    }
}

fn parse_identifier(name: &str, kind: &str, ident: &ResourceIdentifier) -> AppResult<i64> {
    if ident.kind != kind {
        return Err(AppError::type_mismatch(format!(
            "Relationship {name} expects resources of type {kind}, got {}",
            ident.kind
        )));
    }
    ident
        .id
        .parse()
        .map_err(|_| relationship_error(name, format!("The {name} field contains an invalid id.")))
}

fn relationship_error(name: &str, detail: String) -> AppError {
    AppError::with_message(crate::error::ErrorCode::ValidationFailed, detail.clone()).with_source(
        crate::error::FieldError {
            pointer: format!("/data/relationships/{name}"),
            detail,
        },
    )
}

pub type Relationships = BTreeMap<String, Relationship>;

/// A single resource object
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(deserialize = "A: Deserialize<'de> + Default"))]
pub struct ResourceObject<A> {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub attributes: A,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub relationships: Relationships,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Links>,
}

impl<A> ResourceObject<A> {
    /// Build an outgoing resource object with its `self` link
    pub fn new(kind: &str, id: i64, attributes: A) -> Self {
        Self {
            kind: kind.to_string(),
            id: Some(id.to_string()),
            attributes,
            relationships: Relationships::new(),
            links: Some(Links::self_link(format!("/api/v2/{kind}/{id}"))),
        }
    }

    pub fn with_relationship(mut self, name: &str, relationship: Relationship) -> Self {
        self.relationships.insert(name.to_string(), relationship);
        self
    }

    pub fn relationship(&self, name: &str) -> Option<&Relationship> {
        self.relationships.get(name)
    }

    /// Reject a body whose `type` does not match the endpoint (409)
    pub fn ensure_type(&self, kind: &str) -> AppResult<()> {
        if self.kind != kind {
            return Err(AppError::type_mismatch(format!(
                "Resource type {} is not supported by this endpoint, expected {kind}",
                self.kind
            )));
        }
        Ok(())
    }

    /// Reject a body whose `id` does not match the URL (409)
    pub fn ensure_id(&self, id: i64) -> AppResult<()> {
        match &self.id {
            Some(body_id) if body_id == &id.to_string() => Ok(()),
            Some(body_id) => Err(AppError::type_mismatch(format!(
                "Resource id {body_id} does not match the endpoint id {id}"
            ))),
            None => Err(AppError::invalid_request(
                "The resource id is required when updating",
            )),
        }
    }
}

// ========== Documents ==========

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Links {
    #[serde(rename = "self", default, skip_serializing_if = "Option::is_none")]
    pub self_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}

impl Links {
    pub fn self_link(href: impl Into<String>) -> Self {
        Self {
            self_link: Some(href.into()),
            ..Self::default()
        }
    }

    /// Pagination links; `base` is the collection path including any
    /// non-paging query string (`/api/v2/items?sort=-createdAt`)
    pub fn paginated(base: &str, page: &PageMeta) -> Self {
        let sep = if base.contains('?') { '&' } else { '?' };
        let href = |n: u32| {
            format!(
                "{base}{sep}page%5Bnumber%5D={n}&page%5Bsize%5D={}",
                page.per_page
            )
        };
        Self {
            self_link: None,
            first: Some(href(1)),
            last: Some(href(page.last_page)),
            prev: (page.current_page > 1).then(|| href(page.current_page - 1)),
            next: (page.current_page < page.last_page).then(|| href(page.current_page + 1)),
        }
    }
}

/// Top-level document `{data, meta?, links?}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document<T> {
    pub data: T,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Links>,
}

impl<T> Document<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            meta: None,
            links: None,
        }
    }
}

/// Request body for create/update endpoints
pub type ResourceDocument<A> = Document<ResourceObject<A>>;

/// Paged collection document
pub type CollectionDocument<A> = Document<Vec<ResourceObject<A>>>;

impl<A> CollectionDocument<A> {
    pub fn paged(data: Vec<ResourceObject<A>>, page: PageMeta, base: &str) -> Self {
        let links = Links::paginated(base, &page);
        Self {
            data,
            meta: Some(serde_json::json!({ "page": page })),
            links: Some(links),
        }
    }
}

// ========== Pagination ==========

/// `meta.page` of a paged collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub current_page: u32,
    pub from: Option<u64>,
    pub last_page: u32,
    pub per_page: u32,
    pub to: Option<u64>,
    pub total: u64,
}

impl PageMeta {
    pub fn new(current_page: u32, per_page: u32, total: u64) -> Self {
        let per_page = per_page.max(1);
        let last_page = (total.div_ceil(per_page as u64)).max(1) as u32;
        let offset = (current_page.saturating_sub(1) as u64) * per_page as u64;
        let (from, to) = if offset < total {
            (Some(offset + 1), Some((offset + per_page as u64).min(total)))
        } else {
            (None, None)
        };
        Self {
            current_page,
            from,
            last_page,
            per_page,
            to,
            total,
        }
    }
}

// ========== Errors ==========

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorSource {
    pub pointer: String,
}

/// A JSON:API error object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorObject {
    pub status: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<ErrorSource>,
}

/// `{errors: [...]}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDocument {
    pub errors: Vec<ErrorObject>,
}

// ========== Axum response ==========

/// Serialize a body as `application/vnd.api+json` with the given status
#[derive(Debug)]
pub struct JsonApi<T>(pub StatusCode, pub T);

impl<T> JsonApi<T> {
    pub fn ok(body: T) -> Self {
        Self(StatusCode::OK, body)
    }

    pub fn created(body: T) -> Self {
        Self(StatusCode::CREATED, body)
    }
}

impl<T: Serialize> IntoResponse for JsonApi<T> {
    fn into_response(self) -> Response {
        match serde_json::to_vec(&self.1) {
            Ok(bytes) => (
                self.0,
                [(header::CONTENT_TYPE, HeaderValue::from_static(MEDIA_TYPE))],
                bytes,
            )
                .into_response(),
            Err(e) => AppError::internal(format!("Failed to serialize document: {e}")).into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Default, Serialize, Deserialize)]
    struct TagAttrs {
        name: Option<String>,
    }

    #[test]
    fn test_page_meta_middle_page() {
        let page = PageMeta::new(2, 15, 40);
        assert_eq!(page.last_page, 3);
        assert_eq!(page.from, Some(16));
        assert_eq!(page.to, Some(30));
    }

    #[test]
    fn test_page_meta_empty_collection() {
        let page = PageMeta::new(1, 15, 0);
        assert_eq!(page.last_page, 1);
        assert_eq!(page.from, None);
        assert_eq!(page.to, None);
    }

    #[test]
    fn test_paginated_links() {
        let page = PageMeta::new(1, 10, 25);
        let links = Links::paginated("/api/v2/tags?sort=name", &page);
        assert_eq!(
            links.next.as_deref(),
            Some("/api/v2/tags?sort=name&page%5Bnumber%5D=2&page%5Bsize%5D=10")
        );
        assert!(links.prev.is_none());
        assert_eq!(
            links.last.as_deref(),
            Some("/api/v2/tags?sort=name&page%5Bnumber%5D=3&page%5Bsize%5D=10")
        );
    }

    #[test]
    fn test_parse_request_document_with_relationships() {
        let body = json!({
            "data": {
                "type": "items",
                "attributes": { "name": "Espresso" },
                "relationships": {
                    "category": { "data": { "type": "categories", "id": "3" } },
                    "tags": { "data": [ { "type": "tags", "id": "1" }, { "type": "tags", "id": "2" } ] },
                    "author": { "data": null }
                }
            }
        });
        let doc: ResourceDocument<TagAttrs> = serde_json::from_value(body).unwrap();
        assert!(doc.data.ensure_type("items").is_ok());

        let category = doc.data.relationship("category").unwrap();
        assert_eq!(category.one_id("category", "categories").unwrap(), Some(3));

        let tags = doc.data.relationship("tags").unwrap();
        assert_eq!(tags.many_ids("tags", "tags").unwrap(), vec![1, 2]);

        let author = doc.data.relationship("author").unwrap();
        assert_eq!(author.one_id("author", "users").unwrap(), None);
    }

    #[test]
    fn test_type_and_id_mismatch_are_conflicts() {
        let doc: ResourceDocument<TagAttrs> = serde_json::from_value(json!({
            "data": { "type": "tags", "id": "5", "attributes": {} }
        }))
        .unwrap();

        let err = doc.data.ensure_type("items").unwrap_err();
        assert_eq!(err.http_status(), StatusCode::CONFLICT);

        let err = doc.data.ensure_id(6).unwrap_err();
        assert_eq!(err.http_status(), StatusCode::CONFLICT);
        assert!(doc.data.ensure_id(5).is_ok());
    }

    #[test]
    fn test_missing_attributes_default() {
        let doc: ResourceDocument<TagAttrs> =
            serde_json::from_value(json!({ "data": { "type": "tags", "id": "1" } })).unwrap();
        assert!(doc.data.attributes.name.is_none());
    }

    #[test]
    fn test_outgoing_resource_shape() {
        let resource = ResourceObject::new(
            "tags",
            7,
            TagAttrs {
                name: Some("new".into()),
            },
        )
        .with_relationship("items", Relationship::to_many("items", &[1]));

        let value = serde_json::to_value(&resource).unwrap();
        assert_eq!(value["type"], "tags");
        assert_eq!(value["id"], "7");
        assert_eq!(value["links"]["self"], "/api/v2/tags/7");
        assert_eq!(value["relationships"]["items"]["data"][0]["id"], "1");
    }
}
