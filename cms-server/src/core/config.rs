use crate::auth::jwt::{self, JwtConfig};
use crate::core::ServerError;
use std::path::PathBuf;

/// 初始管理员账号 (仅在用户表为空时创建)
#[derive(Debug, Clone)]
pub struct AdminSeed {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// 服务器配置
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖 (启动时会先加载 `.env`)：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | ./data | 工作目录 (数据库、上传文件、日志) |
/// | HTTP_PORT | 8000 | HTTP 服务端口 |
/// | DATABASE_URL | sqlite://{WORK_DIR}/cms.db | SQLite 连接串 |
/// | ENVIRONMENT | development | 运行环境 |
/// | LOG_LEVEL | info | 日志级别 |
/// | PUBLIC_URL | http://localhost:{HTTP_PORT} | 上传文件 URL 前缀 |
/// | MAX_UPLOAD_SIZE | 5242880 | 上传大小上限 (字节) |
/// | ADMIN_NAME / ADMIN_EMAIL / ADMIN_PASSWORD | Admin / admin@example.com / - | 初始管理员 |
/// | JWT_SECRET | (开发环境随机生成) | JWT 密钥, 至少 32 字符 |
/// | JWT_EXPIRATION_MINUTES | 1440 | 令牌有效期 |
/// | JWT_ISSUER / JWT_AUDIENCE | cms-server / cms-admin | 令牌签发者 / 受众 |
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/srv/cms HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存储数据库、上传文件、日志
    pub work_dir: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// SQLite 连接串
    pub database_url: String,
    /// 运行环境: development | staging | production
    pub environment: String,
    /// 日志级别 (EnvFilter 语法)
    pub log_level: String,
    /// 对外访问地址，用于拼接上传文件 URL
    pub public_url: String,
    /// 上传文件大小上限 (字节)
    pub max_upload_size: usize,
    /// 初始管理员 (ADMIN_PASSWORD 未设置时不创建)
    pub admin: Option<AdminSeed>,
    /// JWT 认证配置
    pub jwt: JwtConfig,
}

fn env_or(key: &str, default: impl Into<String>) -> String {
    std::env::var(key).unwrap_or_else(|_| default.into())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// `JWT_SECRET` 未设置时：开发环境生成临时密钥，生产环境报错
fn jwt_from_env(is_production: bool) -> Result<JwtConfig, ServerError> {
    let secret = match std::env::var("JWT_SECRET") {
        Ok(secret) if secret.len() < jwt::MIN_SECRET_LEN => {
            return Err(ServerError::Config(format!(
                "JWT_SECRET must be at least {} characters long",
                jwt::MIN_SECRET_LEN
            )));
        }
        Ok(secret) => secret,
        Err(_) if is_production => {
            return Err(ServerError::Config(
                "JWT_SECRET must be set in production".to_string(),
            ));
        }
        Err(_) => {
            tracing::warn!("JWT_SECRET not set, using a temporary key");
            jwt::random_secret().map_err(|e| ServerError::Config(e.to_string()))?
        }
    };

    Ok(JwtConfig {
        secret,
        expiration_minutes: env_parse("JWT_EXPIRATION_MINUTES", 1440),
        issuer: env_or("JWT_ISSUER", "cms-server"),
        audience: env_or("JWT_AUDIENCE", "cms-admin"),
    })
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值。JWT 密钥不合法时返回错误。
    pub fn from_env() -> Result<Self, ServerError> {
        let work_dir = env_or("WORK_DIR", "./data");
        let http_port = env_parse("HTTP_PORT", 8000);
        let environment = env_or("ENVIRONMENT", "development");
        let is_production = environment == "production";

        let admin = std::env::var("ADMIN_PASSWORD").ok().map(|password| AdminSeed {
            name: env_or("ADMIN_NAME", "Admin"),
            email: env_or("ADMIN_EMAIL", "admin@example.com"),
            password,
        });

        Ok(Self {
            database_url: env_or("DATABASE_URL", format!("sqlite://{work_dir}/cms.db")),
            public_url: env_or("PUBLIC_URL", format!("http://localhost:{http_port}"))
                .trim_end_matches('/')
                .to_string(),
            log_level: env_or("LOG_LEVEL", "info"),
            max_upload_size: env_parse("MAX_UPLOAD_SIZE", 5 * 1024 * 1024),
            jwt: jwt_from_env(is_production)?,
            work_dir,
            http_port,
            environment,
            admin,
        })
    }

    /// 测试配置：内存数据库 + 固定密钥
    pub fn for_tests(work_dir: impl Into<String>) -> Self {
        Self {
            work_dir: work_dir.into(),
            http_port: 0,
            database_url: "sqlite::memory:".to_string(),
            environment: "test".to_string(),
            log_level: "warn".to_string(),
            public_url: "http://localhost".to_string(),
            max_upload_size: 1024 * 1024,
            admin: None,
            jwt: JwtConfig {
                secret: "test-secret-key-that-is-at-least-32-characters".to_string(),
                expiration_minutes: 60,
                issuer: "cms-server".to_string(),
                audience: "cms-admin".to_string(),
            },
        }
    }

    /// 上传文件根目录
    pub fn storage_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("storage")
    }

    /// 日志目录
    pub fn log_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("logs")
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 是否开发环境
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_tests_uses_memory_database() {
        let config = Config::for_tests("/tmp/cms");
        assert_eq!(config.database_url, "sqlite::memory:");
        assert!(!config.is_production());
        assert!(config.jwt.secret.len() >= 32);
    }

    #[test]
    fn test_storage_and_log_dirs_live_under_work_dir() {
        let config = Config::for_tests("/srv/cms");
        assert_eq!(config.storage_dir(), PathBuf::from("/srv/cms/storage"));
        assert_eq!(config.log_dir(), PathBuf::from("/srv/cms/logs"));
    }
}
