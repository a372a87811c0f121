//! Actor extractors
//!
//! [`resolve_actor`](super::resolve_actor) 已经把 Actor 放进请求扩展，
//! 这里只负责取出来。

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::AppError;
use crate::auth::Actor;
use crate::security_log;

/// 必须登录：无 Actor 返回 401
impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<Actor>() {
            Some(actor) => Ok(actor.clone()),
            None => {
                security_log!("WARN", "auth_missing", uri = format!("{:?}", parts.uri));
                Err(AppError::unauthorized())
            }
        }
    }
}

/// 可选 Actor (公开读接口)
#[derive(Debug, Clone, Default)]
pub struct MaybeActor(pub Option<Actor>);

impl MaybeActor {
    pub fn as_ref(&self) -> Option<&Actor> {
        self.0.as_ref()
    }
}

impl<S> FromRequestParts<S> for MaybeActor
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(parts.extensions.get::<Actor>().cloned()))
    }
}
