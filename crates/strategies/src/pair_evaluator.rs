//! 往返交易对评估
//!
//! 对一个交易对串行发起两次报价 (去程 -> 回程)，计算利润。
//! 评估之间不共享可变状态，可以并发调用。

use chrono::{DateTime, Utc};
use config_crate::ScannerConfig;
use models::{EvaluationResult, LegQuote, PairConfig, QuoteRequest};
use rust_decimal::Decimal;
use services::{ensure_routes, RouteError, RouteProvider, RouteSelector};
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use utils::{now_utc, to_smallest_unit};

use crate::profit_calculator::{ProfitCalculator, ProfitCalculatorConfig};

/// 单个交易对的评估失败原因
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvaluationError {
    #[error(transparent)]
    Route(#[from] RouteError),

    #[error("Evaluation task aborted: {0}")]
    Aborted(String),
}

impl EvaluationError {
    pub fn kind(&self) -> &'static str {
        match self {
            EvaluationError::Route(e) => e.kind(),
            EvaluationError::Aborted(_) => "aborted",
        }
    }
}

/// 一个交易对在本轮的报告: 成功结果或带错误描述的失败
#[derive(Debug, Clone)]
pub struct PairReport {
    pub pair_name: String,
    pub checked_at: DateTime<Utc>,
    pub outcome: Result<EvaluationResult, EvaluationError>,
}

impl PairReport {
    pub fn failed(pair_name: impl Into<String>, error: EvaluationError) -> Self {
        Self {
            pair_name: pair_name.into(),
            checked_at: now_utc(),
            outcome: Err(error),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// 交易对评估器
pub struct PairEvaluator {
    provider: Arc<dyn RouteProvider>,
    selector: RouteSelector,
    calculator: ProfitCalculator,
    base_decimals: u32,
    base_symbol: String,
}

impl PairEvaluator {
    pub fn new(provider: Arc<dyn RouteProvider>, config: &ScannerConfig) -> Self {
        Self {
            provider,
            selector: RouteSelector::new(&config.excluded_bridges),
            calculator: ProfitCalculator::new(ProfitCalculatorConfig::from(config)),
            base_decimals: config.base_decimals,
            base_symbol: config.base_symbol.clone(),
        }
    }

    /// 评估交易对，失败时返回带错误的报告而不是向上传播
    pub async fn evaluate(&self, pair: &PairConfig) -> PairReport {
        let checked_at = now_utc();
        let outcome = self
            .quote_round_trip(pair, checked_at)
            .await
            .map_err(EvaluationError::from);

        PairReport {
            pair_name: pair.name.clone(),
            checked_at,
            outcome,
        }
    }

    /// 可取消的评估，取消时报告 `RouteError::Cancelled`
    pub async fn evaluate_cancellable(&self, pair: &PairConfig, cancel: CancellationToken) -> PairReport {
        tokio::select! {
            biased;

            _ = cancel.cancelled() => PairReport::failed(pair.name.clone(), RouteError::Cancelled.into()),
            report = self.evaluate(pair) => report,
        }
    }

    /// 去程 + 回程报价并计算利润
    ///
    /// 去程失败时不会发起回程请求。
    pub async fn quote_round_trip(
        &self,
        pair: &PairConfig,
        checked_at: DateTime<Utc>,
    ) -> Result<EvaluationResult, RouteError> {
        let base_amount = self.calculator.base_amount();

        // 1. 投入金额换算为最小单位
        let base_raw = to_smallest_unit(base_amount, self.base_decimals)?;

        // 2. 去程: home -> intermediate
        let outbound = self.quote_leg(&pair.outbound_request(base_raw.to_string())).await?;
        debug!(
            "[{}] 去程: {} {} -> {} {} ({})",
            pair.name, base_amount, self.base_symbol, outbound.amount, pair.intermediate_symbol, outbound.bridge
        );

        // 3. 回程: 以中间代币自身精度换算后报价
        let mid_raw = to_smallest_unit(outbound.amount, outbound.decimals)?;
        let back = self.quote_leg(&pair.return_request(mid_raw.to_string())).await?;
        debug!(
            "[{}] 回程: {} {} -> {} {} ({})",
            pair.name, outbound.amount, pair.intermediate_symbol, back.amount, self.base_symbol, back.bridge
        );

        // 4. 利润
        let analysis = self
            .calculator
            .analyze(back.amount, &[outbound.bridge.as_str(), back.bridge.as_str()])?;

        Ok(EvaluationResult {
            pair_name: pair.name.clone(),
            checked_at,
            base_amount,
            base_symbol: self.base_symbol.clone(),
            intermediate_amount: outbound.amount,
            intermediate_symbol: pair.intermediate_symbol.clone(),
            outbound_bridge: outbound.bridge,
            return_amount: back.amount,
            return_bridge: back.bridge,
            profit: analysis.profit,
            profit_percent: analysis.profit_percent,
            threshold: analysis.threshold,
            crosses_threshold: analysis.crosses_threshold,
        })
    }

    async fn quote_leg(&self, request: &QuoteRequest) -> Result<LegQuote, RouteError> {
        let response = self.provider.get_routes(request).await?;
        let response = ensure_routes(response, request)?;
        let selected = self.selector.select_best_route(&response)?;
        let amount: Decimal = selected.amount()?;

        Ok(LegQuote {
            amount,
            decimals: selected.decimals,
            bridge: selected.bridge,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{route, routes, scanner_config, test_pair, MockProvider};
    use rust_decimal_macros::dec;

    const BASE: u64 = 8453;
    const SOLANA: u64 = 1151111081099710;

    fn evaluator(provider: Arc<MockProvider>) -> PairEvaluator {
        PairEvaluator::new(provider, &scanner_config())
    }

    #[tokio::test]
    async fn test_profitable_round_trip() {
        let provider = Arc::new(
            MockProvider::new()
                .with_leg(BASE, SOLANA, Ok(route("relay", "31000000", 9)))
                .with_leg(
                    SOLANA,
                    BASE,
                    Ok(routes(&[
                        ("mayanMCTP", "9000000000000000000", 18),
                        ("across", "2003100000000000000", 18),
                    ])),
                ),
        );
        let pair = test_pair("Base↔Solana", SOLANA, "SOL");

        let report = evaluator(provider.clone()).evaluate(&pair).await;
        let result = report.outcome.unwrap();

        assert_eq!(result.pair_name, "Base↔Solana");
        assert_eq!(result.base_amount, dec!(2.0));
        assert_eq!(result.intermediate_amount, dec!(0.031));
        assert_eq!(result.intermediate_symbol, "SOL");
        assert_eq!(result.outbound_bridge, "relay");
        assert_eq!(result.return_amount, dec!(2.0031));
        assert_eq!(result.return_bridge, "across");
        assert_eq!(result.profit, dec!(0.0031));
        assert_eq!(result.profit_percent, dec!(0.155));
        assert!(result.crosses_threshold);
        assert!(result.is_gain());

        // 回程金额使用中间代币精度 (9) 换算
        let calls = provider.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].from_amount, "2000000000000000000");
        assert_eq!(calls[1].from_amount, "31000000");
        assert_eq!(calls[1].from_chain, SOLANA);
        assert_eq!(calls[1].to_chain, BASE);
    }

    #[tokio::test]
    async fn test_losing_round_trip() {
        let provider = Arc::new(
            MockProvider::new()
                .with_leg(BASE, SOLANA, Ok(route("relay", "31000000", 9)))
                .with_leg(SOLANA, BASE, Ok(route("relay", "1998000000000000000", 18))),
        );
        let pair = test_pair("Base↔Solana", SOLANA, "SOL");

        let result = evaluator(provider).evaluate(&pair).await.outcome.unwrap();

        assert_eq!(result.profit, dec!(-0.002));
        assert_eq!(result.profit_percent, dec!(-0.1));
        assert!(!result.crosses_threshold);
        assert!(!result.is_gain());
    }

    #[tokio::test]
    async fn test_high_fee_bridge_threshold() {
        let provider = Arc::new(
            MockProvider::new()
                .with_leg(BASE, SOLANA, Ok(route("mayan", "31000000", 9)))
                .with_leg(SOLANA, BASE, Ok(route("relay", "2003100000000000000", 18))),
        );
        let pair = test_pair("Base↔Solana", SOLANA, "SOL");

        let result = evaluator(provider).evaluate(&pair).await.outcome.unwrap();

        assert_eq!(result.threshold, dec!(0.005));
        assert!(!result.crosses_threshold);
    }

    #[tokio::test]
    async fn test_outbound_failure_skips_return_leg() {
        let provider = Arc::new(MockProvider::new().with_leg(
            BASE,
            SOLANA,
            Err(RouteError::Transport("connection reset".to_string())),
        ));
        let pair = test_pair("Base↔Solana", SOLANA, "SOL");

        let report = evaluator(provider.clone()).evaluate(&pair).await;

        assert_eq!(report.pair_name, "Base↔Solana");
        let err = report.outcome.unwrap_err();
        assert_eq!(err.kind(), "transport");
        assert_eq!(provider.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_response_is_no_route() {
        let provider = Arc::new(
            MockProvider::new()
                .with_leg(BASE, 10, Ok(route("relay", "2000000000000000000", 18)))
                .with_leg(10, BASE, Ok(models::QuoteResponse::default())),
        );
        let pair = test_pair("Base↔Optimism", 10, "ETH");

        let err = evaluator(provider).evaluate(&pair).await.outcome.unwrap_err();
        assert_eq!(
            err,
            EvaluationError::Route(RouteError::NoRoute { from_chain: 10, to_chain: BASE })
        );
    }

    #[tokio::test]
    async fn test_malformed_amount_is_conversion_error() {
        let provider = Arc::new(
            MockProvider::new().with_leg(BASE, SOLANA, Ok(route("relay", "31e6x", 9))),
        );
        let pair = test_pair("Base↔Solana", SOLANA, "SOL");

        let err = evaluator(provider).evaluate(&pair).await.outcome.unwrap_err();
        assert_eq!(err.kind(), "conversion");
    }

    #[tokio::test]
    async fn test_profit_overflow_is_conversion_error() {
        let provider = Arc::new(
            MockProvider::new()
                .with_leg(BASE, SOLANA, Ok(route("relay", "1000000000", 9)))
                .with_leg(SOLANA, BASE, Ok(route("relay", "1000000000000000000", 18))),
        );
        let config = ScannerConfig {
            base_amount: Decimal::new(1, 28),
            ..scanner_config()
        };
        let pair = test_pair("Base↔Solana", SOLANA, "SOL");

        let err = PairEvaluator::new(provider, &config)
            .evaluate(&pair)
            .await
            .outcome
            .unwrap_err();
        assert_eq!(err.kind(), "conversion");
    }

    #[tokio::test]
    async fn test_cancelled_evaluation() {
        let provider = Arc::new(MockProvider::new().hanging());
        let pair = test_pair("Base↔Solana", SOLANA, "SOL");
        let cancel = CancellationToken::new();
        cancel.cancel();

        let report = evaluator(provider).evaluate_cancellable(&pair, cancel).await;
        assert_eq!(
            report.outcome.unwrap_err(),
            EvaluationError::Route(RouteError::Cancelled)
        );
    }
}
