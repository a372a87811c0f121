//! API 路由模块
//!
//! # 结构
//!
//! - [`auth`] - 登录、注册、登出、/me
//! - [`items`] / [`categories`] / [`tags`] - 内容资源 (策略授权)
//! - [`users`] / [`roles`] / [`permissions`] - 身份资源
//! - [`contact_messages`] / [`subscriptions`] / [`settings`] - 站点接口 (权限中间件)
//! - [`upload`] - 图片上传与静态文件
//! - [`health`] - 健康检查
//!
//! 公共部分：[`document`] (JSON:API 请求体)、[`query`] (分页/排序/过滤)、
//! [`convert`] (行 → 资源对象)。

pub mod convert;
pub mod document;
pub mod query;

pub mod auth;
pub mod health;
pub mod upload;

// Content
pub mod categories;
pub mod items;
pub mod tags;

// Identity
pub mod permissions;
pub mod roles;
pub mod users;

// Site
pub mod contact_messages;
pub mod settings;
pub mod subscriptions;

use axum::extract::DefaultBodyLimit;
use axum::{Router, middleware};
use http::{HeaderName, HeaderValue};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::auth::resolve_actor;
use crate::core::ServerState;

/// multipart 包装的额外余量
const MULTIPART_OVERHEAD: usize = 64 * 1024;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Custom request ID generator
#[derive(Clone)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// HTTP 请求日志中间件
async fn log_request(
    request: http::Request<axum::body::Body>,
    next: middleware::Next,
) -> http::Response<axum::body::Body> {
    let method = request.method().clone();
    let uri = request.uri().clone();

    let response = next.run(request).await;

    let status = response.status();

    tracing::info!(target: "http_access", "{} {} {}", method, uri, status);

    response
}

/// Build a router with all routes registered (no middleware, no state)
pub fn build_router() -> Router<ServerState> {
    Router::new()
        .merge(auth::router())
        .merge(items::router())
        .merge(categories::router())
        .merge(tags::router())
        .merge(users::router())
        .merge(roles::router())
        .merge(permissions::router())
        .merge(contact_messages::router())
        .merge(subscriptions::router())
        .merge(settings::router())
        .merge(upload::router())
        .merge(health::router())
}

/// Build the fully configured application
///
/// Used by both the HTTP server and the integration tests.
pub fn build_app(state: ServerState) -> Router {
    let body_limit = state.config.max_upload_size + MULTIPART_OVERHEAD;

    build_router()
        // Actor 解析 - 在所有路由之前执行，把 Actor 放进请求扩展
        .layer(middleware::from_fn_with_state(state.clone(), resolve_actor))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
        // ========== Tower HTTP Middleware ==========
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(middleware::from_fn(log_request))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
            REQUEST_ID_HEADER,
        )))
        .layer(SetRequestIdLayer::new(
            HeaderName::from_static(REQUEST_ID_HEADER),
            XRequestId,
        ))
}
