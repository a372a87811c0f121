//! Subscription API 模块
//!
//! 订阅公开提交 (重复邮箱 422)；查看和删除需要站点权限。

mod handler;

use axum::{
    Router, middleware,
    routing::{delete, get, post},
};

use crate::auth::permissions::{DELETE_SUBSCRIPTIONS, VIEW_SUBSCRIPTIONS};
use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/v2/subscriptions", routes())
}

fn routes() -> Router<ServerState> {
    let public_routes = Router::new().route("/", post(handler::create));

    let read_routes = Router::new()
        .route("/", get(handler::list))
        .route("/{id}", get(handler::get_by_id))
        .layer(middleware::from_fn(require_permission(VIEW_SUBSCRIPTIONS)));

    let manage_routes = Router::new()
        .route("/{id}", delete(handler::delete))
        .layer(middleware::from_fn(require_permission(DELETE_SUBSCRIPTIONS)));

    public_routes.merge(read_routes).merge(manage_routes)
}
