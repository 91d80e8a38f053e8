use payout_server::{Config, Server, ServerState, print_banner};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. 环境变量 (.env 可选)
    dotenv::dotenv().ok();

    print_banner();

    // 2. 加载配置
    let config = Config::from_env();

    // 3. 初始化日志（生产环境 JSON + 文件，开发环境 pretty）
    let log_dir = format!("{}/logs", config.work_dir);
    payout_server::init_logger_with_file(
        &config.log_level,
        config.is_production(),
        Some(&log_dir),
    )?;

    tracing::info!("Referra payout server starting...");

    // 4. 初始化服务器状态（DB + Stripe 网关注入）
    let state = ServerState::initialize(&config).await;

    // 5. 启动 HTTP 服务器（自带每日批付调度）
    let server = Server::with_state(state);
    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
