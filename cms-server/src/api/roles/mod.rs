//! Role API 模块
//!
//! 创建/修改角色时只能授予自己持有的权限；删除仍有用户的角色返回 409。

mod handler;

pub(crate) use handler::check_assignable;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/v2/roles", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route(
            "/{id}",
            get(handler::get_by_id)
                .patch(handler::update)
                .delete(handler::delete),
        )
}
