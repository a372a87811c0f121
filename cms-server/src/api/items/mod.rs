//! Item API 模块
//!
//! | 方法 | 路径 | 授权 |
//! |------|------|------|
//! | GET | /api/v2/items | 公开，按可见范围过滤 |
//! | GET | /api/v2/items/{id} | ItemPolicy::view |
//! | POST | /api/v2/items | ItemPolicy::create |
//! | PATCH | /api/v2/items/{id} | ItemPolicy::update (作者或 "edit items") |
//! | DELETE | /api/v2/items/{id} | ItemPolicy::delete (作者或 "delete items") |

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/v2/items", routes())
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
