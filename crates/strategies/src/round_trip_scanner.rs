//! 往返套利轮询调度
//!
//! 每轮并发评估所有交易对，等待全部完成后按配置顺序输出，
//! 然后休眠 `max(最小间隔, 轮询间隔 - 本轮耗时)`。轮次之间不重叠。

use config_crate::ScannerConfig;
use futures_util::future::join_all;
use models::PairConfig;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use utils::OPPORTUNITY_TARGET;

use crate::pair_evaluator::{EvaluationError, PairEvaluator, PairReport};
use crate::report::{format_signed, render_batch, AMOUNT_DP, PERCENT_DP};

const SEPARATOR: &str = "==================================================";

/// 往返套利扫描器
pub struct RoundTripScanner {
    evaluator: Arc<PairEvaluator>,
    pairs: Vec<PairConfig>,
    poll_interval: Duration,
    min_delay: Duration,
}

impl RoundTripScanner {
    pub fn new(evaluator: Arc<PairEvaluator>, pairs: Vec<PairConfig>, config: &ScannerConfig) -> Self {
        Self {
            evaluator,
            pairs,
            poll_interval: config.poll_interval,
            min_delay: config.min_poll_delay,
        }
    }

    pub fn pairs(&self) -> &[PairConfig] {
        &self.pairs
    }

    /// 轮询直到取消
    pub async fn run(&self, cancel: CancellationToken) {
        info!(
            "[Scanner] 开始轮询 {} 个交易对，间隔 {:?}",
            self.pairs.len(),
            self.poll_interval
        );

        while !cancel.is_cancelled() {
            let started = Instant::now();
            let reports = self.scan_once(&cancel).await;

            // 取消后不再输出半途中断的批次
            if cancel.is_cancelled() {
                break;
            }
            self.emit(&reports);

            let delay = self.next_delay(started.elapsed());
            debug!("[Scanner] 本轮耗时 {:?}，{:?} 后开始下一轮", started.elapsed(), delay);

            tokio::select! {
                biased;

                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(delay) => {}
            }
        }

        info!("[Scanner] 轮询已停止");
    }

    /// 执行一轮: 每个交易对一个任务，结果保持配置顺序
    ///
    /// 单个交易对失败 (包括任务 panic) 不影响其他交易对。
    pub async fn scan_once(&self, cancel: &CancellationToken) -> Vec<PairReport> {
        let handles: Vec<_> = self
            .pairs
            .iter()
            .cloned()
            .map(|pair| {
                let evaluator = Arc::clone(&self.evaluator);
                let token = cancel.child_token();
                tokio::spawn(async move { evaluator.evaluate_cancellable(&pair, token).await })
            })
            .collect();

        join_all(handles)
            .await
            .into_iter()
            .zip(self.pairs.iter())
            .map(|(joined, pair)| match joined {
                Ok(report) => report,
                Err(e) => PairReport::failed(pair.name.clone(), EvaluationError::Aborted(e.to_string())),
            })
            .collect()
    }

    /// 下一轮前的休眠时间
    pub fn next_delay(&self, elapsed: Duration) -> Duration {
        self.poll_interval.saturating_sub(elapsed).max(self.min_delay)
    }

    /// 打印本轮结果，并记录失败与机会日志
    fn emit(&self, reports: &[PairReport]) {
        println!("{}", SEPARATOR);
        println!("{}", render_batch(reports));
        println!("{}", SEPARATOR);

        for report in reports {
            match &report.outcome {
                Ok(result) if result.crosses_threshold => {
                    info!(
                        target: OPPORTUNITY_TARGET,
                        "[Opportunity] {} | {} {} -> {} ({}) -> {} {} ({}) | 利润 {} {} ({}%) > 阈值 {}",
                        result.pair_name,
                        result.base_amount,
                        result.base_symbol,
                        result.intermediate_amount,
                        result.outbound_bridge,
                        result.return_amount,
                        result.base_symbol,
                        result.return_bridge,
                        format_signed(result.profit, AMOUNT_DP),
                        result.base_symbol,
                        format_signed(result.profit_percent, PERCENT_DP),
                        result.threshold,
                    );
                }
                Ok(_) => {}
                Err(e) => {
                    warn!("[Scanner] {} 评估失败 ({}): {}", report.pair_name, e.kind(), e);
                }
            }
        }
    }
}
