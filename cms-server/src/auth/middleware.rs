//! 认证中间件

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::AppError;
use crate::auth::{Actor, JwtError};
use crate::core::ServerState;
use crate::security_log;

/// 解析请求主体
///
/// - 无 `Authorization` 头：匿名，直接放行
/// - 令牌无效/过期：401
/// - 令牌有效但用户已删除：401
/// - 否则从数据库加载 [`Actor`] 并注入请求扩展
///
/// 是否必须登录由各 handler 的 extractor 决定 ([`Actor`] / `MaybeActor`)。
pub async fn resolve_actor(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    if req.method() == http::Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    let Some(header) = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
    else {
        return Ok(next.run(req).await);
    };

    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::invalid_token("Invalid authorization header"))?;

    let claims = match state.get_jwt_service().validate_token(token) {
        Ok(claims) => claims,
        Err(e) => {
            security_log!(
                "WARN",
                "auth_failed",
                error = format!("{}", e),
                uri = format!("{:?}", req.uri())
            );
            return Err(match e {
                JwtError::Expired => AppError::token_expired(),
                _ => AppError::invalid_token("Invalid token"),
            });
        }
    };

    let user_id = claims
        .user_id()
        .map_err(|e| AppError::invalid_token(format!("Malformed JWT claims: {}", e)))?;

    let Some(actor) = Actor::load(state.get_pool(), user_id).await? else {
        security_log!("WARN", "auth_unknown_user", user_id = user_id);
        return Err(AppError::invalid_token("User no longer exists"));
    };

    req.extensions_mut().insert(actor);
    Ok(next.run(req).await)
}

/// 权限检查中间件 - 要求一个具体权限名
///
/// 必须挂在 [`resolve_actor`] 之后。
///
/// ```ignore
/// Router::new()
///     .route("/api/v2/subscriptions", get(handler::list))
///     .layer(middleware::from_fn(require_permission("view subscriptions")));
/// ```
pub fn require_permission(
    permission: &'static str,
) -> impl Fn(
    Request,
    Next,
) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Response, AppError>> + Send>>
+ Clone {
    move |req: Request, next: Next| {
        Box::pin(async move {
            let actor = req
                .extensions()
                .get::<Actor>()
                .ok_or(AppError::unauthorized())?;

            if !actor.has_permission(permission) {
                security_log!(
                    "WARN",
                    "permission_denied",
                    user_id = actor.id,
                    required_permission = permission
                );
                return Err(AppError::new(shared::ErrorCode::PermissionDenied));
            }

            Ok(next.run(req).await)
        })
    }
}
