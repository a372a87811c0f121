//! Site Settings API 模块
//!
//! 单例资源：GET 公开，PATCH 需要 `edit settings`。

mod handler;

use axum::{
    Router, middleware,
    routing::{get, patch},
};

use crate::auth::permissions::EDIT_SETTINGS;
use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    let read_routes = Router::new().route("/api/v2/settings", get(handler::show));

    let manage_routes = Router::new()
        .route("/api/v2/settings", patch(handler::update))
        .layer(middleware::from_fn(require_permission(EDIT_SETTINGS)));

    read_routes.merge(manage_routes)
}
