//! Authentication Handlers
//!
//! Handles login, registration, logout and the current user's profile

use std::time::Duration;

use axum::extract::rejection::JsonRejection;
use axum::{Json, extract::State};
use http::StatusCode;
use validator::Validate;

use crate::api::convert::user_resource;
use crate::api::document::Resource;
use crate::auth::password::{hash_for_storage, verify_password};
use crate::auth::permissions::REGISTRATION_ROLE;
use crate::auth::Actor;
use crate::core::ServerState;
use crate::db::repository::{role, user};
use crate::db::repository::user::{NewUser, UserChanges};
use crate::security_log;
use shared::client::{LoginRequest, RegisterRequest, TokenResponse};
use shared::error::{AppError, AppResult};
use shared::jsonapi::{Document, JsonApi, ResourceDocument};
use shared::models::{User, UserAttributes, UserUpdate};

/// Fixed delay for authentication to prevent timing attacks
const AUTH_FIXED_DELAY_MS: u64 = 500;

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> AppResult<T> {
    payload
        .map(|Json(value)| value)
        .map_err(|e| AppError::invalid_request(e.body_text()))
}

fn issue_token(state: &ServerState, user: &User) -> AppResult<TokenResponse> {
    let jwt = state.get_jwt_service();
    let token = jwt
        .generate_token(user.id)
        .map_err(|e| AppError::internal(format!("Failed to generate token: {e}")))?;
    Ok(TokenResponse::bearer(token, jwt.expires_in_seconds()))
}

/// POST /api/v2/login
///
/// 用户不存在和密码错误返回同一个错误，防止枚举邮箱
pub async fn login(
    State(state): State<ServerState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> AppResult<Json<TokenResponse>> {
    let req = body(payload)?;
    req.validate()?;

    let found = user::find_by_email(&state.pool, req.email.trim()).await?;

    // Fixed delay before checking the result
    tokio::time::sleep(Duration::from_millis(AUTH_FIXED_DELAY_MS)).await;

    let user = match found {
        Some(u) if verify_password(&req.password, &u.password) => u,
        Some(u) => {
            security_log!("WARN", "login_failed", user_id = u.id, reason = "invalid_password");
            return Err(AppError::invalid_credentials());
        }
        None => {
            security_log!("WARN", "login_failed", reason = "unknown_email");
            return Err(AppError::invalid_credentials());
        }
    };

    let token = issue_token(&state, &user)?;
    tracing::info!(user_id = user.id, "User logged in successfully");
    Ok(Json(token))
}

/// POST /api/v2/register - 新用户获得 member 角色
pub async fn register(
    State(state): State<ServerState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<TokenResponse>)> {
    let req = body(payload)?;
    req.validate()?;

    let member = role::find_by_name(&state.pool, REGISTRATION_ROLE)
        .await?
        .ok_or_else(|| AppError::internal(format!("Role {REGISTRATION_ROLE} is not seeded")))?;

    let user = user::create(
        &state.pool,
        NewUser {
            name: req.name.trim().to_string(),
            email: req.email.trim().to_string(),
            password_hash: hash_for_storage(&req.password)?,
            role_ids: vec![member.id],
        },
    )
    .await?;

    let token = issue_token(&state, &user)?;
    tracing::info!(user_id = user.id, "User registered");
    Ok((StatusCode::CREATED, Json(token)))
}

/// POST /api/v2/logout
///
/// 令牌无状态，客户端丢弃即可；这里只记录日志
pub async fn logout(actor: Actor) -> StatusCode {
    tracing::info!(user_id = actor.id, "User logged out");
    StatusCode::NO_CONTENT
}

fn me_document(user: &User, actor: &Actor) -> JsonApi<ResourceDocument<UserAttributes>> {
    let mut doc = Document::new(user_resource(user));
    doc.meta = Some(serde_json::json!({
        "roles": actor.roles,
        "permissions": actor.permissions.sorted(),
    }));
    JsonApi::ok(doc)
}

/// GET /api/v2/me - 当前用户 + meta 中的角色和权限
pub async fn me(
    State(state): State<ServerState>,
    actor: Actor,
) -> AppResult<JsonApi<ResourceDocument<UserAttributes>>> {
    let user = user::find_by_id(&state.pool, actor.id)
        .await?
        .ok_or_else(AppError::unauthorized)?;
    Ok(me_document(&user, &actor))
}

/// PATCH /api/v2/me - 修改自己的姓名、邮箱或密码 (不能修改角色)
pub async fn update_me(
    State(state): State<ServerState>,
    actor: Actor,
    Resource(body): Resource<UserUpdate>,
) -> AppResult<JsonApi<ResourceDocument<UserAttributes>>> {
    body.ensure_type("users")?;
    if body.id.is_some() {
        body.ensure_id(actor.id)?;
    }
    body.attributes.validate()?;

    let attrs = body.attributes;
    let changes = UserChanges {
        name: attrs.name,
        email: attrs.email,
        password_hash: attrs.password.as_deref().map(hash_for_storage).transpose()?,
        role_ids: None,
    };

    let user = user::update(&state.pool, actor.id, changes).await?;
    tracing::info!(user_id = actor.id, "Profile updated");
    Ok(me_document(&user, &actor))
}
