//! Contact Message API 模块
//!
//! 联系表单公开提交；查看和删除需要站点权限。

mod handler;

use axum::{
    Router, middleware,
    routing::{delete, get, post},
};

use crate::auth::permissions::{DELETE_CONTACT_MESSAGES, VIEW_CONTACT_MESSAGES};
use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/v2/contact-messages", routes())
}

fn routes() -> Router<ServerState> {
    let public_routes = Router::new().route("/", post(handler::create));

    let read_routes = Router::new()
        .route("/", get(handler::list))
        .route("/{id}", get(handler::get_by_id))
        .layer(middleware::from_fn(require_permission(VIEW_CONTACT_MESSAGES)));

    let manage_routes = Router::new()
        .route("/{id}", delete(handler::delete))
        .layer(middleware::from_fn(require_permission(DELETE_CONTACT_MESSAGES)));

    public_routes.merge(read_routes).merge(manage_routes)
}
