use serde::{Deserialize, Serialize};

use crate::QuoteRequest;

/// 往返套利交易对配置
///
/// 出发链 -> 中间链 -> 出发链。构建后不可变，每个轮询周期复用。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairConfig {
    /// 显示名称，如 "Base↔Solana"
    pub name: String,
    pub home_chain: u64,
    pub intermediate_chain: u64,
    /// 回程目标链，始终等于 home_chain
    pub return_chain: u64,
    pub from_token: String,
    pub intermediate_token: String,
    pub return_token: String,
    /// 出发链钱包 (发送方 / 回程接收方)
    pub sender: String,
    /// 中间链钱包
    pub intermediate_recipient: String,
    /// 中间代币符号 (仅用于显示)
    pub intermediate_symbol: String,
}

impl PairConfig {
    /// 创建往返交易对，回程的链和代币与出发时相同
    #[allow(clippy::too_many_arguments)]
    pub fn round_trip(
        name: impl Into<String>,
        home_chain: u64,
        intermediate_chain: u64,
        home_token: impl Into<String>,
        intermediate_token: impl Into<String>,
        sender: impl Into<String>,
        intermediate_recipient: impl Into<String>,
        intermediate_symbol: impl Into<String>,
    ) -> Self {
        let home_token = home_token.into();
        Self {
            name: name.into(),
            home_chain,
            intermediate_chain,
            return_chain: home_chain,
            from_token: home_token.clone(),
            intermediate_token: intermediate_token.into(),
            return_token: home_token,
            sender: sender.into(),
            intermediate_recipient: intermediate_recipient.into(),
            intermediate_symbol: intermediate_symbol.into(),
        }
    }

    /// 回程是否回到出发链
    pub fn is_round_trip(&self) -> bool {
        self.return_chain == self.home_chain
    }

    /// 去程报价请求: home -> intermediate
    pub fn outbound_request(&self, from_amount: impl Into<String>) -> QuoteRequest {
        QuoteRequest {
            from_address: self.sender.clone(),
            to_address: self.intermediate_recipient.clone(),
            from_chain: self.home_chain,
            to_chain: self.intermediate_chain,
            from_token: self.from_token.clone(),
            to_token: self.intermediate_token.clone(),
            from_amount: from_amount.into(),
        }
    }

    /// 回程报价请求: intermediate -> home
    pub fn return_request(&self, from_amount: impl Into<String>) -> QuoteRequest {
        QuoteRequest {
            from_address: self.intermediate_recipient.clone(),
            to_address: self.sender.clone(),
            from_chain: self.intermediate_chain,
            to_chain: self.return_chain,
            from_token: self.intermediate_token.clone(),
            to_token: self.return_token.clone(),
            from_amount: from_amount.into(),
        }
    }
}
