//! Upload Routes
//!
//! | 路径 | 方法 | 认证 |
//! |------|------|------|
//! | /api/v2/uploads/{resource}/{id}/{field} | POST | 目标资源的 update 策略 |
//! | /storage/{folder}/{file} | GET | 无 |

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/v2/uploads/{resource}/{id}/{field}", post(handler::upload))
        .route("/storage/{folder}/{file}", get(handler::serve))
}
