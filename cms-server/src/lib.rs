//! CMS Server - 内容管理系统后端
//!
//! # 架构概述
//!
//! 一个 JSON:API 风格的 HTTP 服务：内容资源 (items, categories, tags)、
//! 身份资源 (users, roles, permissions) 以及站点接口 (联系留言、订阅、
//! 站点设置、图片上传)。
//!
//! 每个请求的处理流程：
//!
//! ```text
//! resolve_actor (JWT → Actor，权限每次从数据库读取)
//!   → handler: 加载目标 → policy::authorize → 校验 → repository
//! ```
//!
//! # 模块结构
//!
//! ```text
//! cms-server/src/
//! ├── core/          # 配置、状态、启动错误、HTTP 服务器
//! ├── auth/          # JWT、密码、Actor、权限集合、中间件
//! ├── policy/        # 每种资源的授权规则 + 删除守卫
//! ├── api/           # 路由、处理器、JSON:API 文档
//! ├── db/            # SQLite 连接、迁移、种子数据、仓储
//! └── utils/         # 日志
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod policy;
pub mod utils;

// Re-export 公共类型
pub use auth::{Actor, JwtService};
pub use core::{Config, Server, ServerState};
pub use shared::error::{AppError, AppResult, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::init_logger_with_file;

// Security logging macro - 支持 tracing 格式说明符
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

pub fn print_banner() {
    println!(
        r#"
   ________  ________
  / ____/  |/  / ___/
 / /   / /|_/ /\__ \
/ /___/ /  / /___/ /
\____/_/  /_//____/   server v{}
    "#,
        env!("CARGO_PKG_VERSION")
    );
}

/// 加载 `.env` (不存在时忽略)
pub fn setup_environment() {
    match dotenv::dotenv() {
        Ok(path) => eprintln!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => eprintln!("Failed to load .env: {e}"),
    }
}
