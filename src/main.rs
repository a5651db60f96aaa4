use anyhow::Result;
use quiz_chain_solver::{config::Config, logger, server};

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    logger::init();

    // 加载配置
    let config = Config::load();

    // 启动 webhook 服务
    server::run(config).await?;

    Ok(())
}
