//! 路由选择器
//!
//! 信任 API 返回的 "最便宜优先" 顺序，不重新排序:
//! 第一个未被排除且带有输出金额的候选路由胜出。

use models::{QuoteResponse, RouteCandidate};
use rust_decimal::Decimal;
use tracing::debug;
use utils::{checked_decimals, from_smallest_unit, ConversionError};

use crate::RouteError;

/// 报价不可靠的桥，默认排除
pub const DEFAULT_EXCLUDED_BRIDGE: &str = "mayanmctp";

/// 选中的路由
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedRoute {
    /// 输出金额 (最小单位)
    pub to_amount_raw: String,
    /// 输出代币精度
    pub decimals: u32,
    /// 第一步的桥/工具名称
    pub bridge: String,
}

impl SelectedRoute {
    /// 换算为十进制输出金额
    pub fn amount(&self) -> Result<Decimal, ConversionError> {
        from_smallest_unit(&self.to_amount_raw, self.decimals)
    }
}

/// 路由选择器
#[derive(Debug, Clone)]
pub struct RouteSelector {
    /// 小写的排除标记，对工具名做子串匹配
    excluded_markers: Vec<String>,
}

impl RouteSelector {
    pub fn new<I, S>(excluded_markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            excluded_markers: excluded_markers
                .into_iter()
                .map(|m| m.as_ref().trim().to_lowercase())
                .filter(|m| !m.is_empty())
                .collect(),
        }
    }

    /// 工具名是否命中排除标记 (不区分大小写)
    pub fn is_excluded(&self, tool: &str) -> bool {
        let tool = tool.to_lowercase();
        self.excluded_markers.iter().any(|marker| tool.contains(marker.as_str()))
    }

    /// 选出最佳路由
    ///
    /// 跳过: 无步骤、命中排除标记、既无 toAmount 也无 toAmountMin、缺少输出精度的候选。
    /// 精度字段存在但非法 (负数或无法解析) 时直接报错。
    pub fn select_best_route(&self, response: &QuoteResponse) -> Result<SelectedRoute, RouteError> {
        for (index, candidate) in response.routes.iter().enumerate() {
            match self.try_candidate(candidate)? {
                Some(selected) => {
                    debug!("[Routes] 选中候选 #{}: bridge={}", index, selected.bridge);
                    return Ok(selected);
                }
                None => continue,
            }
        }

        Err(RouteError::NoValidRoute {
            candidates: response.routes.len(),
        })
    }

    fn try_candidate(&self, candidate: &RouteCandidate) -> Result<Option<SelectedRoute>, RouteError> {
        let Some(tool) = candidate.first_tool() else {
            return Ok(None);
        };
        if self.is_excluded(tool) {
            debug!("[Routes] 跳过被排除的桥: {}", tool);
            return Ok(None);
        }

        let Some(raw) = candidate.output_amount_raw() else {
            return Ok(None);
        };
        let Some(decimals_field) = candidate.output_decimals() else {
            return Ok(None);
        };

        let decimals = decimals_field.as_i64().ok_or_else(|| ConversionError::Malformed {
            raw: decimals_field.to_string(),
            reason: "token decimals is not an integer".to_string(),
        })?;
        let decimals = checked_decimals(decimals)?;

        Ok(Some(SelectedRoute {
            to_amount_raw: raw.trim().to_string(),
            decimals,
            bridge: tool.to_string(),
        }))
    }
}

impl Default for RouteSelector {
    fn default() -> Self {
        Self::new([DEFAULT_EXCLUDED_BRIDGE])
    }
}
