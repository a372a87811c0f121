use anyhow::Context;
use cms_server::{Config, Server, ServerState, init_logger_with_file, print_banner, setup_environment};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. 设置环境 (dotenv)
    setup_environment();

    // 2. 加载配置
    let config = Config::from_env().context("Failed to load configuration")?;

    // 3. 日志 (guard 持有到进程结束)
    let log_dir = config.log_dir();
    let _log_guard = init_logger_with_file(&config.log_level, Some(&log_dir));

    print_banner();
    tracing::info!(work_dir = %config.work_dir, "CMS server starting...");

    // 4. 初始化服务器状态 (数据库、迁移、种子数据)
    let state = ServerState::initialize(&config)
        .await
        .context("Failed to initialize server state")?;

    // 5. 启动 HTTP 服务器
    let server = Server::with_state(config, state);
    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
