use std::fs;
use tracing_subscriber::filter::{EnvFilter, FilterFn, LevelFilter};
use tracing_subscriber::fmt::time::OffsetTime;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, Layer};
use tracing_appender::{non_blocking, rolling};
use time::macros::offset;

/// 套利机会日志的 target
pub const OPPORTUNITY_TARGET: &str = "arbitrage_opportunity";

/// 日志管理器 - 基于target分类的日志系统
pub struct LoggerManager {
    guards: Vec<non_blocking::WorkerGuard>,
}

impl LoggerManager {
    /// 初始化日志系统
    ///
    /// 日志分类：
    /// - 控制台: 级别由 RUST_LOG 控制，默认 info
    /// - app.log: 通用应用日志 (仅在指定日志目录时写入)
    /// - opportunity.log: 超过利润阈值的往返报价 (仅在指定日志目录时写入)
    ///
    /// 未指定日志目录时不写任何文件。
    pub fn init(log_dir: Option<&str>) -> Self {
        let mut guards = Vec::new();

        let timer = OffsetTime::new(
            offset!(UTC),
            time::format_description::well_known::Rfc3339,
        );

        // 1. 控制台输出
        let console_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("info"));
        let console_layer = fmt::layer()
            .compact()
            .with_target(true)
            .with_timer(timer.clone())
            .with_filter(console_filter);

        let (app_layer, opportunity_layer) = match log_dir {
            Some(dir) => {
                fs::create_dir_all(dir).ok();

                // 2. 通用应用日志 (app.log)
                let (app_writer, app_guard) = non_blocking(rolling::daily(dir, "app.log"));
                guards.push(app_guard);

                let app_layer = fmt::layer()
                    .compact()
                    .with_writer(app_writer)
                    .with_ansi(false)
                    .with_target(true)
                    .with_timer(timer.clone())
                    .with_filter(LevelFilter::INFO)
                    .with_filter(FilterFn::new(|metadata| metadata.target() != OPPORTUNITY_TARGET));

                // 3. 套利机会日志 (opportunity.log)
                let (opportunity_writer, opportunity_guard) =
                    non_blocking(rolling::daily(dir, "opportunity.log"));
                guards.push(opportunity_guard);

                let opportunity_layer = fmt::layer()
                    .compact()
                    .with_writer(opportunity_writer)
                    .with_ansi(false)
                    .with_target(true)
                    .with_timer(timer)
                    .with_filter(FilterFn::new(|metadata| metadata.target() == OPPORTUNITY_TARGET));

                (Some(app_layer), Some(opportunity_layer))
            }
            None => (None, None),
        };

        tracing_subscriber::registry()
            .with(console_layer)
            .with(app_layer)
            .with(opportunity_layer)
            .init();

        Self { guards }
    }

    /// 是否写入了日志文件
    pub fn writes_files(&self) -> bool {
        !self.guards.is_empty()
    }
}
