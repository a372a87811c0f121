//! Authentication Routes
//!
//! | 路径 | 方法 | 认证 |
//! |------|------|------|
//! | /api/v2/login | POST | 无 |
//! | /api/v2/register | POST | 无 |
//! | /api/v2/logout | POST | 需要 |
//! | /api/v2/me | GET / PATCH | 需要 |
//!
//! 登录/注册使用普通 JSON，/me 使用 JSON:API 文档。

mod handler;

use axum::{Router, routing::get, routing::post};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/v2/login", post(handler::login))
        .route("/api/v2/register", post(handler::register))
        // 需要认证的路由由 Actor 提取器返回 401
        .route("/api/v2/logout", post(handler::logout))
        .route("/api/v2/me", get(handler::me).patch(handler::update_me))
}
