//! 授权流程集成测试：策略、所有者放行、自删除守卫、角色删除守卫、列表可见性

mod common;

use common::TestApp;
use http::{Method, StatusCode};
use serde_json::json;
use shared::models::ItemStatus;

#[tokio::test]
async fn test_anonymous_cannot_view_draft_item() {
    let app = TestApp::new().await;
    let (owner, _) = app.user_with_roles("Owner", &["creator"]).await;
    let draft = app.item(&owner, "Secret recipe", ItemStatus::Draft).await;

    let res = app.get(&format!("/api/v2/items/{}", draft.id), None).await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    assert_eq!(res.content_type.as_deref(), Some("application/vnd.api+json"));
}

#[tokio::test]
async fn test_anonymous_can_view_published_item() {
    let app = TestApp::new().await;
    let (owner, _) = app.user_with_roles("Owner", &["creator"]).await;
    let published = app.item(&owner, "Espresso", ItemStatus::Published).await;

    let res = app.get(&format!("/api/v2/items/{}", published.id), None).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["data"]["type"], "items");
    assert_eq!(res.body["data"]["id"], published.id.to_string());
    assert_eq!(res.body["data"]["attributes"]["name"], "Espresso");
    assert_eq!(res.body["data"]["attributes"]["status"], "published");
    assert_eq!(
        res.body["data"]["relationships"]["author"]["data"]["id"],
        owner.id.to_string()
    );
}

#[tokio::test]
async fn test_missing_item_is_not_found_for_everyone() {
    let app = TestApp::new().await;
    let res = app.get("/api/v2/items/999", None).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_member_cannot_delete_foreign_item() {
    let app = TestApp::new().await;
    let (owner, _) = app.user_with_roles("Owner", &["creator"]).await;
    let (_, member_token) = app.user_with_roles("Member", &["member"]).await;
    let item = app.item(&owner, "Latte", ItemStatus::Published).await;

    let res = app
        .send(Method::DELETE, &format!("/api/v2/items/{}", item.id), Some(&member_token), None)
        .await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);

    // 仍然存在
    let res = app.get(&format!("/api/v2/items/{}", item.id), None).await;
    assert_eq!(res.status, StatusCode::OK);
}

#[tokio::test]
async fn test_creator_can_edit_item_owned_by_someone_else() {
    let app = TestApp::new().await;
    let (member, _) = app.user_with_roles("Member", &["member"]).await;
    let (_, creator_token) = app.user_with_roles("Creator", &["creator"]).await;
    let item = app.item(&member, "Cappuccino", ItemStatus::Draft).await;

    let res = app
        .send(
            Method::PATCH,
            &format!("/api/v2/items/{}", item.id),
            Some(&creator_token),
            Some(json!({
                "data": {
                    "type": "items",
                    "id": item.id.to_string(),
                    "attributes": { "name": "Cappuccino Grande", "status": "published" }
                }
            })),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["data"]["attributes"]["name"], "Cappuccino Grande");
    assert_eq!(res.body["data"]["attributes"]["status"], "published");
}

#[tokio::test]
async fn test_owner_can_update_own_item_without_edit_permission() {
    let app = TestApp::new().await;
    let (member, member_token) = app.user_with_roles("Member", &["member"]).await;
    let item = app.item(&member, "Mocha", ItemStatus::Draft).await;

    let res = app
        .send(
            Method::PATCH,
            &format!("/api/v2/items/{}", item.id),
            Some(&member_token),
            Some(json!({
                "data": {
                    "type": "items",
                    "id": item.id.to_string(),
                    "attributes": { "excerpt": "Chocolate and coffee" }
                }
            })),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["data"]["attributes"]["excerpt"], "Chocolate and coffee");
}

#[tokio::test]
async fn test_admin_cannot_delete_themselves() {
    let app = TestApp::new().await;
    let (admin, admin_token) = app.user_with_roles("Admin", &["admin"]).await;
    assert_eq!(admin.id, 1);

    let res = app
        .send(Method::DELETE, "/api/v2/users/1", Some(&admin_token), None)
        .await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    assert_eq!(res.error_detail(), "You cannot delete yourself.");

    let res = app.get("/api/v2/users/1", Some(&admin_token)).await;
    assert_eq!(res.status, StatusCode::OK);
}

#[tokio::test]
async fn test_admin_can_delete_other_user() {
    let app = TestApp::new().await;
    let (_, admin_token) = app.user_with_roles("Admin", &["admin"]).await;
    let (other, _) = app.user_with_roles("Other", &["member"]).await;

    let res = app
        .send(Method::DELETE, &format!("/api/v2/users/{}", other.id), Some(&admin_token), None)
        .await;
    assert_eq!(res.status, StatusCode::NO_CONTENT);

    let res = app.get(&format!("/api/v2/users/{}", other.id), Some(&admin_token)).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_deleting_user_removes_their_items() {
    let app = TestApp::new().await;
    let (_, admin_token) = app.user_with_roles("Admin", &["admin"]).await;
    let (author, _) = app.user_with_roles("Author", &["creator"]).await;
    let (other, _) = app.user_with_roles("Other", &["creator"]).await;
    let owned = app.item(&author, "Croissant", ItemStatus::Published).await;
    let kept = app.item(&other, "Baguette", ItemStatus::Published).await;

    let res = app
        .send(Method::DELETE, &format!("/api/v2/users/{}", author.id), Some(&admin_token), None)
        .await;
    assert_eq!(res.status, StatusCode::NO_CONTENT);

    let res = app.get(&format!("/api/v2/items/{}", owned.id), Some(&admin_token)).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    let res = app.get(&format!("/api/v2/items/{}", kept.id), Some(&admin_token)).await;
    assert_eq!(res.status, StatusCode::OK);
}

#[tokio::test]
async fn test_role_with_users_cannot_be_deleted_until_unassigned() {
    let app = TestApp::new().await;
    let (_, admin_token) = app.user_with_roles("Admin", &["admin"]).await;
    let (first, _) = app.user_with_roles("First", &["creator"]).await;
    let (second, _) = app.user_with_roles("Second", &["creator"]).await;

    let creator_id = first.role_ids[0];
    let member = cms_server::db::repository::role::find_by_name(&app.state.pool, "member")
        .await
        .unwrap()
        .unwrap();

    let res = app
        .send(Method::DELETE, &format!("/api/v2/roles/{creator_id}"), Some(&admin_token), None)
        .await;
    assert_eq!(res.status, StatusCode::CONFLICT);

    for user in [&first, &second] {
        let res = app
            .send(
                Method::PATCH,
                &format!("/api/v2/users/{}", user.id),
                Some(&admin_token),
                Some(json!({
                    "data": {
                        "type": "users",
                        "id": user.id.to_string(),
                        "relationships": {
                            "roles": { "data": [ { "type": "roles", "id": member.id.to_string() } ] }
                        }
                    }
                })),
            )
            .await;
        assert_eq!(res.status, StatusCode::OK);
    }

    let res = app
        .send(Method::DELETE, &format!("/api/v2/roles/{creator_id}"), Some(&admin_token), None)
        .await;
    assert_eq!(res.status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_anonymous_listing_only_shows_published_items() {
    let app = TestApp::new().await;
    let (owner, owner_token) = app.user_with_roles("Owner", &["creator"]).await;
    let published = app.item(&owner, "Published", ItemStatus::Published).await;
    let draft = app.item(&owner, "Draft", ItemStatus::Draft).await;
    let archived = app.item(&owner, "Archived", ItemStatus::Archive).await;

    let res = app.get("/api/v2/items", None).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.ids(), vec![published.id.to_string()]);
    assert_eq!(res.body["meta"]["page"]["total"], 1);

    // 客户端过滤不能绕过可见性
    let res = app.get("/api/v2/items?filter%5Bstatus%5D=draft", None).await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.ids().is_empty());

    // 有 view items 权限时看到全部
    let res = app.get("/api/v2/items?sort=name", Some(&owner_token)).await;
    assert_eq!(
        res.ids(),
        vec![
            archived.id.to_string(),
            draft.id.to_string(),
            published.id.to_string()
        ]
    );
}

#[tokio::test]
async fn test_write_without_token_is_unauthenticated() {
    let app = TestApp::new().await;
    let res = app
        .send(
            Method::POST,
            "/api/v2/items",
            None,
            Some(json!({ "data": { "type": "items", "attributes": { "name": "x", "status": "draft" } } })),
        )
        .await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_permissions_are_read_fresh_on_every_request() {
    let app = TestApp::new().await;
    let (_, admin_token) = app.user_with_roles("Admin", &["admin"]).await;
    let (editor, editor_token) = app
        .user_with_permissions("Editor", &["view categories", "create categories"])
        .await;

    let create = |name: &str| {
        json!({ "data": { "type": "categories", "attributes": { "name": name } } })
    };

    let res = app
        .send(Method::POST, "/api/v2/categories", Some(&editor_token), Some(create("Drinks")))
        .await;
    assert_eq!(res.status, StatusCode::CREATED);

    // 撤销权限后，同一个令牌立即失去能力
    let role_id = editor.role_ids[0];
    let res = app
        .send(
            Method::PATCH,
            &format!("/api/v2/roles/{role_id}"),
            Some(&admin_token),
            Some(json!({
                "data": {
                    "type": "roles",
                    "id": role_id.to_string(),
                    "attributes": { "permissions": ["view categories"] }
                }
            })),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);

    let res = app
        .send(Method::POST, "/api/v2/categories", Some(&editor_token), Some(create("Food")))
        .await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_cannot_grant_permissions_one_does_not_hold() {
    let app = TestApp::new().await;
    let (_, token) = app
        .user_with_permissions("RoleManager", &["create roles", "view items"])
        .await;

    let res = app
        .send(
            Method::POST,
            "/api/v2/roles",
            Some(&token),
            Some(json!({
                "data": {
                    "type": "roles",
                    "attributes": { "name": "escalated", "permissions": ["delete users"] }
                }
            })),
        )
        .await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);

    let res = app
        .send(
            Method::POST,
            "/api/v2/roles",
            Some(&token),
            Some(json!({
                "data": {
                    "type": "roles",
                    "attributes": { "name": "readers", "permissions": ["view items"] }
                }
            })),
        )
        .await;
    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.body["data"]["attributes"]["permissions"], json!(["view items"]));
}

#[tokio::test]
async fn test_cannot_assign_roles_granting_unheld_permissions() {
    let app = TestApp::new().await;
    let (manager, token) = app
        .user_with_permissions("UserManager", &["view users", "create users", "edit users"])
        .await;
    let admin_role = cms_server::db::repository::role::find_by_name(&app.state.pool, "admin")
        .await
        .unwrap()
        .unwrap();
    let roles = |id: i64| json!({ "data": [ { "type": "roles", "id": id.to_string() } ] });

    let res = app
        .send(
            Method::PATCH,
            &format!("/api/v2/users/{}", manager.id),
            Some(&token),
            Some(json!({
                "data": {
                    "type": "users",
                    "id": manager.id.to_string(),
                    "relationships": { "roles": roles(admin_role.id) }
                }
            })),
        )
        .await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);

    let me = app.get("/api/v2/me", Some(&token)).await;
    assert_eq!(me.status, StatusCode::OK);
    let permissions = me.body["meta"]["permissions"].as_array().unwrap();
    assert!(!permissions.contains(&json!("delete users")));

    let res = app
        .send(
            Method::POST,
            "/api/v2/users",
            Some(&token),
            Some(json!({
                "data": {
                    "type": "users",
                    "attributes": {
                        "name": "Sidekick",
                        "email": "sidekick@example.com",
                        "password": "password123",
                        "passwordConfirmation": "password123"
                    },
                    "relationships": { "roles": roles(admin_role.id) }
                }
            })),
        )
        .await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);

    // 角色权限不超过自身时允许分配
    let res = app
        .send(
            Method::POST,
            "/api/v2/users",
            Some(&token),
            Some(json!({
                "data": {
                    "type": "users",
                    "attributes": {
                        "name": "Sidekick",
                        "email": "sidekick@example.com",
                        "password": "password123",
                        "passwordConfirmation": "password123"
                    },
                    "relationships": { "roles": roles(manager.role_ids[0]) }
                }
            })),
        )
        .await;
    assert_eq!(res.status, StatusCode::CREATED);
}
