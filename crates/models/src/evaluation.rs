use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 单腿报价结果 (已换算为十进制金额)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegQuote {
    pub amount: Decimal,
    pub decimals: u32,
    pub bridge: String,
}

/// 一次往返评估的结果，每个轮询周期重新生成，不持久化
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub pair_name: String,
    pub checked_at: DateTime<Utc>,
    /// 投入金额 (出发代币单位)
    pub base_amount: Decimal,
    pub base_symbol: String,
    /// 去程输出
    pub intermediate_amount: Decimal,
    pub intermediate_symbol: String,
    pub outbound_bridge: String,
    /// 回程输出 (与投入金额同单位)
    pub return_amount: Decimal,
    pub return_bridge: String,
    /// 利润 = 回程输出 - 投入
    pub profit: Decimal,
    /// 利润百分比
    pub profit_percent: Decimal,
    /// 本次评估使用的利润阈值
    pub threshold: Decimal,
    /// 利润是否超过阈值
    pub crosses_threshold: bool,
}

impl EvaluationResult {
    /// 是否盈利 (利润 > 0)
    pub fn is_gain(&self) -> bool {
        self.profit > Decimal::ZERO
    }
}
