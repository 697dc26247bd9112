//! 测试辅助: 可编排的路由报价源

use async_trait::async_trait;
use config_crate::{ScannerConfig, EVM_NATIVE, SOL_NATIVE};
use models::{PairConfig, QuoteRequest, QuoteResponse};
use rust_decimal_macros::dec;
use services::{RouteError, RouteProvider};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

pub(crate) const SOLANA_CHAIN_ID: u64 = 1151111081099710;

/// 按 (from_chain, to_chain) 返回预设结果的报价源
pub(crate) struct MockProvider {
    legs: HashMap<(u64, u64), Result<QuoteResponse, RouteError>>,
    calls: Mutex<Vec<QuoteRequest>>,
    hanging: bool,
}

impl MockProvider {
    pub(crate) fn new() -> Self {
        Self {
            legs: HashMap::new(),
            calls: Mutex::new(Vec::new()),
            hanging: false,
        }
    }

    pub(crate) fn with_leg(
        mut self,
        from_chain: u64,
        to_chain: u64,
        result: Result<QuoteResponse, RouteError>,
    ) -> Self {
        self.legs.insert((from_chain, to_chain), result);
        self
    }

    /// 所有请求永不返回
    pub(crate) fn hanging(mut self) -> Self {
        self.hanging = true;
        self
    }

    pub(crate) fn calls(&self) -> Vec<QuoteRequest> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl RouteProvider for MockProvider {
    async fn get_routes(&self, request: &QuoteRequest) -> Result<QuoteResponse, RouteError> {
        self.calls.lock().unwrap().push(request.clone());

        if self.hanging {
            std::future::pending::<()>().await;
        }

        // 让出调度，模拟网络挂起点
        tokio::task::yield_now().await;

        self.legs
            .get(&(request.from_chain, request.to_chain))
            .cloned()
            .unwrap_or(Err(RouteError::NoRoute {
                from_chain: request.from_chain,
                to_chain: request.to_chain,
            }))
    }
}

pub(crate) fn route(tool: &str, to_amount: &str, decimals: i64) -> QuoteResponse {
    routes(&[(tool, to_amount, decimals)])
}

pub(crate) fn routes(candidates: &[(&str, &str, i64)]) -> QuoteResponse {
    let routes: Vec<serde_json::Value> = candidates
        .iter()
        .map(|(tool, to_amount, decimals)| {
            serde_json::json!({
                "steps": [{"tool": tool}],
                "toAmount": to_amount,
                "toToken": {"decimals": decimals},
            })
        })
        .collect();
    serde_json::from_value(serde_json::json!({ "routes": routes })).unwrap()
}

pub(crate) fn scanner_config() -> ScannerConfig {
    ScannerConfig {
        base_amount: dec!(2.0),
        base_decimals: 18,
        base_symbol: "ETH".to_string(),
        profit_threshold: dec!(0.003),
        high_fee_profit_threshold: dec!(0.005),
        high_fee_bridges: vec!["mayan".to_string()],
        excluded_bridges: vec!["mayanmctp".to_string()],
        poll_interval: Duration::from_millis(50),
        min_poll_delay: Duration::from_millis(5),
    }
}

pub(crate) fn test_pair(name: &str, intermediate_chain: u64, symbol: &str) -> PairConfig {
    let intermediate_token = if intermediate_chain == SOLANA_CHAIN_ID {
        SOL_NATIVE
    } else {
        EVM_NATIVE
    };
    PairConfig::round_trip(
        name,
        8453,
        intermediate_chain,
        EVM_NATIVE,
        intermediate_token,
        "0x1111111111111111111111111111111111111111",
        "So11111111111111111111111111111111111111112",
        symbol,
    )
}
