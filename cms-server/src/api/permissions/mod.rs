//! Permission API 模块 (只读)

mod handler;

use axum::{Router, middleware, routing::get};

use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/v2/permissions", get(handler::list))
        .layer(middleware::from_fn(require_permission("view roles")))
}
