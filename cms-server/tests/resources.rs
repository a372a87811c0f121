//! 资源 CRUD 集成测试：文档格式、校验、分页、排序、删除守卫

mod common;

use common::TestApp;
use http::{Method, StatusCode};
use serde_json::json;
use shared::models::ItemStatus;

fn category(name: &str) -> serde_json::Value {
    json!({ "data": { "type": "categories", "attributes": { "name": name } } })
}

#[tokio::test]
async fn test_category_crud() {
    let app = TestApp::new().await;
    let (_, token) = app.user_with_roles("Admin", &["admin"]).await;

    let res = app
        .send(Method::POST, "/api/v2/categories", Some(&token), Some(category("Coffee")))
        .await;
    assert_eq!(res.status, StatusCode::CREATED);
    let id = res.body["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(res.body["data"]["links"]["self"], format!("/api/v2/categories/{id}"));

    let res = app
        .send(
            Method::PATCH,
            &format!("/api/v2/categories/{id}"),
            Some(&token),
            Some(json!({
                "data": { "type": "categories", "id": id, "attributes": { "description": "Hot drinks" } }
            })),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["data"]["attributes"]["name"], "Coffee");
    assert_eq!(res.body["data"]["attributes"]["description"], "Hot drinks");

    let res = app
        .send(Method::DELETE, &format!("/api/v2/categories/{id}"), Some(&token), None)
        .await;
    assert_eq!(res.status, StatusCode::NO_CONTENT);

    let res = app.get(&format!("/api/v2/categories/{id}"), Some(&token)).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_anonymous_cannot_list_categories() {
    let app = TestApp::new().await;
    let res = app.get("/api/v2/categories", None).await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_validation_errors_point_at_attributes() {
    let app = TestApp::new().await;
    let (_, token) = app.user_with_roles("Admin", &["admin"]).await;

    let res = app
        .send(
            Method::POST,
            "/api/v2/items",
            Some(&token),
            Some(json!({
                "data": { "type": "items", "attributes": { "status": "hidden", "dateAt": "yesterday" } }
            })),
        )
        .await;
    assert_eq!(res.status, StatusCode::UNPROCESSABLE_ENTITY);

    let pointers: Vec<&str> = res.body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|e| e["source"]["pointer"].as_str())
        .collect();
    assert!(pointers.contains(&"/data/attributes/name"));
    assert!(pointers.contains(&"/data/attributes/status"));
    assert!(pointers.contains(&"/data/attributes/dateAt"));
}

#[tokio::test]
async fn test_duplicate_name_is_unprocessable() {
    let app = TestApp::new().await;
    let (_, token) = app.user_with_roles("Admin", &["admin"]).await;

    let tag = json!({ "data": { "type": "tags", "attributes": { "name": "Vegan", "color": "#0a0" } } });
    let res = app.send(Method::POST, "/api/v2/tags", Some(&token), Some(tag.clone())).await;
    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.body["data"]["attributes"]["color"], "#0a0");

    let res = app.send(Method::POST, "/api/v2/tags", Some(&token), Some(tag)).await;
    assert_eq!(res.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(res.body["errors"][0]["source"]["pointer"], "/data/attributes/name");
}

#[tokio::test]
async fn test_type_and_id_mismatch_are_conflicts() {
    let app = TestApp::new().await;
    let (_, token) = app.user_with_roles("Admin", &["admin"]).await;

    let res = app
        .send(
            Method::POST,
            "/api/v2/categories",
            Some(&token),
            Some(json!({ "data": { "type": "tags", "attributes": { "name": "Oops" } } })),
        )
        .await;
    assert_eq!(res.status, StatusCode::CONFLICT);

    let res = app
        .send(Method::POST, "/api/v2/categories", Some(&token), Some(category("Tea")))
        .await;
    let id = res.body["data"]["id"].as_str().unwrap().to_string();

    let res = app
        .send(
            Method::PATCH,
            &format!("/api/v2/categories/{id}"),
            Some(&token),
            Some(json!({ "data": { "type": "categories", "id": "999", "attributes": {} } })),
        )
        .await;
    assert_eq!(res.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let app = TestApp::new().await;
    let (_, token) = app.user_with_roles("Admin", &["admin"]).await;

    let request = http::Request::builder()
        .method(Method::POST)
        .uri("/api/v2/tags")
        .header(http::header::AUTHORIZATION, format!("Bearer {token}"))
        .header(http::header::CONTENT_TYPE, "application/vnd.api+json")
        .body(axum::body::Body::from("{not json"))
        .unwrap();
    let res = common::read_response(app.raw(request).await).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_category_with_items_cannot_be_deleted() {
    let app = TestApp::new().await;
    let (admin, token) = app.user_with_roles("Admin", &["admin"]).await;

    let res = app
        .send(Method::POST, "/api/v2/categories", Some(&token), Some(category("Bakery")))
        .await;
    let category_id = res.body["data"]["id"].as_str().unwrap().to_string();

    let res = app
        .send(
            Method::POST,
            "/api/v2/items",
            Some(&token),
            Some(json!({
                "data": {
                    "type": "items",
                    "attributes": { "name": "Croissant", "status": "published" },
                    "relationships": {
                        "category": { "data": { "type": "categories", "id": category_id } }
                    }
                }
            })),
        )
        .await;
    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(
        res.body["data"]["relationships"]["author"]["data"]["id"],
        admin.id.to_string()
    );
    assert_eq!(
        res.body["data"]["relationships"]["category"]["data"]["id"],
        category_id
    );

    let res = app
        .send(Method::DELETE, &format!("/api/v2/categories/{category_id}"), Some(&token), None)
        .await;
    assert_eq!(res.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_item_with_unknown_tag_is_rejected() {
    let app = TestApp::new().await;
    let (_, token) = app.user_with_roles("Admin", &["admin"]).await;

    let res = app
        .send(
            Method::POST,
            "/api/v2/items",
            Some(&token),
            Some(json!({
                "data": {
                    "type": "items",
                    "attributes": { "name": "Bagel", "status": "draft" },
                    "relationships": { "tags": { "data": [ { "type": "tags", "id": "42" } ] } }
                }
            })),
        )
        .await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_pagination_meta_and_links() {
    let app = TestApp::new().await;
    let (owner, _) = app.user_with_roles("Owner", &["creator"]).await;
    for i in 0..5 {
        app.item(&owner, &format!("Item {i}"), ItemStatus::Published).await;
    }

    let res = app
        .get("/api/v2/items?sort=name&page%5Bnumber%5D=2&page%5Bsize%5D=2", None)
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.ids().len(), 2);
    assert_eq!(res.body["data"][0]["attributes"]["name"], "Item 2");

    let page = &res.body["meta"]["page"];
    assert_eq!(page["currentPage"], 2);
    assert_eq!(page["lastPage"], 3);
    assert_eq!(page["total"], 5);
    assert_eq!(page["from"], 3);
    assert_eq!(page["to"], 4);

    assert_eq!(
        res.body["links"]["next"],
        "/api/v2/items?sort=name&page%5Bnumber%5D=3&page%5Bsize%5D=2"
    );
}

#[tokio::test]
async fn test_pagination_links_keep_collection_path() {
    let app = TestApp::new().await;
    let (_, token) = app.user_with_roles("Admin", &["admin"]).await;
    for name in ["Alpha", "Beta", "Gamma"] {
        let tag = json!({ "data": { "type": "tags", "attributes": { "name": name } } });
        let res = app.send(Method::POST, "/api/v2/tags", Some(&token), Some(tag)).await;
        assert_eq!(res.status, StatusCode::CREATED);
    }

    let res = app.get("/api/v2/tags?page%5Bsize%5D=2", Some(&token)).await;
    assert_eq!(res.status, StatusCode::OK);
    let links = &res.body["links"];
    assert_eq!(links["first"], "/api/v2/tags?page%5Bnumber%5D=1&page%5Bsize%5D=2");
    assert_eq!(links["next"], "/api/v2/tags?page%5Bnumber%5D=2&page%5Bsize%5D=2");
    assert_eq!(links["last"], "/api/v2/tags?page%5Bnumber%5D=2&page%5Bsize%5D=2");
    assert!(links.get("prev").is_none());

    for email in ["a@example.com", "b@example.com"] {
        let body = json!({ "data": { "type": "subscriptions", "attributes": { "email": email } } });
        let res = app.send(Method::POST, "/api/v2/subscriptions", None, Some(body)).await;
        assert_eq!(res.status, StatusCode::CREATED);
    }

    let res = app
        .get("/api/v2/subscriptions?sort=email&page%5Bnumber%5D=2&page%5Bsize%5D=1", Some(&token))
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(
        res.body["links"]["prev"],
        "/api/v2/subscriptions?sort=email&page%5Bnumber%5D=1&page%5Bsize%5D=1"
    );
}

#[tokio::test]
async fn test_invalid_paging_and_sorting_are_bad_requests() {
    let app = TestApp::new().await;

    let res = app.get("/api/v2/items?sort=password", None).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let res = app.get("/api/v2/items?page%5Bnumber%5D=0", None).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_users_never_expose_password() {
    let app = TestApp::new().await;
    let (admin, token) = app.user_with_roles("Admin", &["admin"]).await;

    let res = app.get(&format!("/api/v2/users/{}", admin.id), Some(&token)).await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.body["data"]["attributes"].get("password").is_none());
    assert_eq!(res.body["data"]["attributes"]["email"], "admin@example.com");
    assert_eq!(res.body["data"]["relationships"]["roles"]["data"][0]["type"], "roles");
}

#[tokio::test]
async fn test_filter_users_by_name() {
    let app = TestApp::new().await;
    let (_, token) = app.user_with_roles("Admin", &["admin"]).await;
    app.user_with_roles("Alice", &["member"]).await;
    app.user_with_roles("Bob", &["member"]).await;

    let res = app.get("/api/v2/users?filter%5Bname%5D=ali", Some(&token)).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.ids().len(), 1);
    assert_eq!(res.body["data"][0]["attributes"]["name"], "Alice");
}
