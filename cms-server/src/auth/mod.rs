//! 认证授权模块
//!
//! - [`JwtService`] - JWT 令牌服务
//! - [`Actor`] - 当前请求主体 (每请求从数据库加载)
//! - [`resolve_actor`] - 解析可选 Actor 的中间件
//! - [`require_permission`] - 权限检查中间件
//! - [`password`] - argon2 密码哈希

pub mod actor;
pub mod extractor;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod permissions;

pub use actor::Actor;
pub use extractor::MaybeActor;
pub use jwt::{Claims, JwtConfig, JwtError, JwtService};
pub use middleware::{require_permission, resolve_actor};
pub use permissions::{PermissionSet, Verb};
