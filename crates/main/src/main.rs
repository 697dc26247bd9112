mod bootstrap;

use anyhow::Result;
use config_crate::AppConfig;
use tracing::info;
use utils::LoggerManager;

use crate::bootstrap::{setup_panic_hook, Application};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 日志目录来自配置，配置需先加载
    let config = AppConfig::load()?;

    // 初始化日志系统
    let _logger = LoggerManager::init(config.log.dir.as_deref());

    // 设置 panic hook
    setup_panic_hook();

    info!("========================================");
    info!("  跨链往返套利监控启动");
    info!("========================================");

    // 启动应用
    let app = Application::start(config)?;

    // 运行直到 Ctrl+C
    app.wait_for_shutdown_signal().await;

    // 关闭应用
    app.shutdown().await?;

    Ok(())
}
