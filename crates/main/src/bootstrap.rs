//! 应用启动引导模块
//!
//! 封装扫描器初始化、后台运行和关闭逻辑

use anyhow::{Context, Result};
use config_crate::AppConfig;
use services::LifiRouteClient;
use std::sync::Arc;
use strategies::{PairEvaluator, RoundTripScanner};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// 应用程序实例
///
/// 持有扫描任务句柄和取消令牌，负责优雅关闭
pub struct Application {
    cancel: CancellationToken,
    scanner_handle: JoinHandle<()>,
}

impl Application {
    /// 初始化并启动扫描器
    pub fn start(config: AppConfig) -> Result<Self> {
        Self::log_config(&config);

        if config.pairs.is_empty() {
            warn!("⚠️ 未配置任何交易对，扫描器将空转");
        }

        // 所有交易对共享一个 HTTP 连接池
        info!("初始化路由 API 客户端...");
        let client = LifiRouteClient::new(config.routing.clone(), config.pairs.len())
            .context("Failed to build routing API client")?;

        let evaluator = Arc::new(PairEvaluator::new(Arc::new(client), &config.scanner));
        let scanner = RoundTripScanner::new(evaluator, config.pairs.clone(), &config.scanner);

        let cancel = CancellationToken::new();
        let scanner_handle = {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                scanner.run(cancel).await;
            })
        };

        info!("✅ 扫描器已启动");
        Ok(Self {
            cancel,
            scanner_handle,
        })
    }

    /// 等待 Ctrl+C
    pub async fn wait_for_shutdown_signal(&self) {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("收到 Ctrl+C，准备退出..."),
            Err(e) => error!("监听 Ctrl+C 失败: {}", e),
        }
    }

    /// 停止扫描器并等待后台任务结束
    pub async fn shutdown(self) -> Result<()> {
        info!("正在停止服务...");

        self.cancel.cancel();
        if let Err(e) = self.scanner_handle.await {
            error!("扫描任务异常退出: {}", e);
        }

        info!("系统已停止");
        Ok(())
    }

    // ========== 私有辅助方法 ==========

    fn log_config(config: &AppConfig) {
        let scanner = &config.scanner;

        info!("配置加载成功");
        info!("========================================");
        info!("出发链: {} (chain_id={})", config.home_chain.name(), config.home_chain.chain_id());
        info!("投入: {} {} (精度 {})", scanner.base_amount, scanner.base_symbol, scanner.base_decimals);
        for pair in &config.pairs {
            info!(
                "  [{}] {} -> {} -> {}",
                pair.name, pair.home_chain, pair.intermediate_chain, pair.return_chain
            );
        }
        info!("========================================");
        info!(
            "利润阈值: {} / 高手续费桥 {:?}: {}",
            scanner.profit_threshold, scanner.high_fee_bridges, scanner.high_fee_profit_threshold
        );
        info!("排除的桥: {:?}", scanner.excluded_bridges);
        info!(
            "轮询间隔: {:?} (最小间隔 {:?})，请求超时: {:?}",
            scanner.poll_interval, scanner.min_poll_delay, config.routing.request_timeout
        );
        info!("路由 API: {}", config.routing.url);
    }
}

/// 设置 panic hook，把 panic 信息写入日志
pub fn setup_panic_hook() {
    std::panic::set_hook(Box::new(|panic_info| {
        error!("========================================");
        error!("!!! 系统发生 PANIC !!!");
        error!("========================================");
        if let Some(location) = panic_info.location() {
            error!(
                "发生位置: {}:{}:{}",
                location.file(),
                location.line(),
                location.column()
            );
        }
        if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            error!("Panic 消息: {}", s);
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            error!("Panic 消息: {}", s);
        }
        error!("========================================");
    }));
}
