//! 集成测试公共设施
//!
//! 每个测试一个独立的内存数据库 + 临时工作目录，通过 `oneshot`
//! 直接驱动完整的路由 (含中间件)。

#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use cms_server::auth::password::hash_for_storage;
use cms_server::db::repository::item::{self, NewItem};
use cms_server::db::repository::{role, user};
use cms_server::db::repository::user::NewUser;
use cms_server::{Config, ServerState, api};
use http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::Value;
use shared::jsonapi::MEDIA_TYPE;
use shared::models::{Item, ItemStatus, User};
use tempfile::TempDir;
use tower::ServiceExt;

pub const PASSWORD: &str = "password123";

pub struct TestApp {
    pub app: Router,
    pub state: ServerState,
    _work_dir: TempDir,
}

/// 一次请求的结果
pub struct TestResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub body: Value,
}

impl TestResponse {
    /// 第一个错误对象的 detail
    pub fn error_detail(&self) -> &str {
        self.body["errors"][0]["detail"].as_str().unwrap_or_default()
    }

    /// 集合中的资源 id
    pub fn ids(&self) -> Vec<String> {
        self.body["data"]
            .as_array()
            .map(|rows| {
                rows.iter()
                    .filter_map(|r| r["id"].as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl TestApp {
    pub async fn new() -> Self {
        let work_dir = TempDir::new().expect("temp work dir");
        let config = Config::for_tests(work_dir.path().to_string_lossy().to_string());
        let state = ServerState::initialize(&config)
            .await
            .expect("initialize test state");
        Self {
            app: api::build_app(state.clone()),
            state,
            _work_dir: work_dir,
        }
    }

    /// 创建用户并分配种子角色，返回 (用户, 令牌)
    pub async fn user_with_roles(&self, name: &str, roles: &[&str]) -> (User, String) {
        let mut role_ids = Vec::new();
        for name in roles {
            let found = role::find_by_name(&self.state.pool, name)
                .await
                .unwrap()
                .unwrap_or_else(|| panic!("role {name} not seeded"));
            role_ids.push(found.id);
        }

        let created = user::create(
            &self.state.pool,
            NewUser {
                name: name.to_string(),
                email: format!("{}@example.com", name.to_lowercase()),
                password_hash: hash_for_storage(PASSWORD).unwrap(),
                role_ids,
            },
        )
        .await
        .unwrap();

        let token = self.token_for(&created);
        (created, token)
    }

    /// 创建一个只含给定权限的角色，再创建拥有该角色的用户
    pub async fn user_with_permissions(&self, name: &str, permissions: &[&str]) -> (User, String) {
        let role_name = format!("{}-role", name.to_lowercase());
        let permissions: Vec<String> = permissions.iter().map(|p| p.to_string()).collect();
        role::create(&self.state.pool, &role_name, &permissions)
            .await
            .unwrap();
        self.user_with_roles(name, &[role_name.as_str()]).await
    }

    pub fn token_for(&self, user: &User) -> String {
        self.state
            .jwt_service
            .generate_token(user.id)
            .unwrap()
    }

    pub async fn item(&self, owner: &User, name: &str, status: ItemStatus) -> Item {
        item::create(
            &self.state.pool,
            owner.id,
            NewItem {
                name: name.to_string(),
                excerpt: None,
                description: None,
                status,
                is_on_homepage: false,
                date_at: None,
                category_id: None,
                tag_ids: vec![],
            },
        )
        .await
        .unwrap()
    }

    /// JSON:API 请求
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        self.request(method, uri, token, MEDIA_TYPE, body).await
    }

    /// 普通 JSON 请求 (登录/注册)
    pub async fn send_json(&self, uri: &str, body: Value) -> TestResponse {
        self.request(Method::POST, uri, None, "application/json", Some(body))
            .await
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.send(Method::GET, uri, token, None).await
    }

    async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        content_type: &str,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::ACCEPT, MEDIA_TYPE);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(value) => {
                builder = builder.header(header::CONTENT_TYPE, content_type);
                Body::from(serde_json::to_vec(&value).unwrap())
            }
            None => Body::empty(),
        };

        let response = self
            .app
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        read_response(response).await
    }

    /// 原始请求 (multipart 上传等)
    pub async fn raw(&self, request: Request<Body>) -> http::Response<Body> {
        self.app.clone().oneshot(request).await.unwrap()
    }
}

pub async fn read_response(response: http::Response<Body>) -> TestResponse {
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    TestResponse {
        status,
        content_type,
        body,
    }
}
